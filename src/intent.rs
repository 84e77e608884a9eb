//! Intents: declared commands that mutate a submission before it is resolved.
//!
//! On the wire an intent list is a JSON array of `{"type": ..., "payload": ...}`
//! objects. Intents are applied strictly in list order.

use crate::error::SubmissionError;
use crate::serialization::DefaultValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Intent {
    /// Marks the field at the path as validated.
    Validate(String),
    Reset(ResetPayload),
    Replace(ReplacePayload),
    Insert(InsertPayload),
    Remove(RemovePayload),
    Reorder(ReorderPayload),
}

impl Intent {
    /// The wire name of this intent.
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Validate(_) => "validate",
            Intent::Reset(_) => "reset",
            Intent::Replace(_) => "replace",
            Intent::Insert(_) => "insert",
            Intent::Remove(_) => "remove",
            Intent::Reorder(_) => "reorder",
        }
    }

    /// The path this intent targets; `None` means the whole form.
    pub fn path(&self) -> Option<&str> {
        match self {
            Intent::Validate(path) => Some(path.as_str()),
            Intent::Reset(payload) => payload.path.as_deref(),
            Intent::Replace(payload) => payload.path.as_deref(),
            Intent::Insert(payload) => Some(payload.path.as_str()),
            Intent::Remove(payload) => Some(payload.path.as_str()),
            Intent::Reorder(payload) => Some(payload.path.as_str()),
        }
    }
}

/// `value` and `validated` default to `true` ("reset it") when omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertPayload {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    /// Defaults to the end of the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePayload {
    pub path: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPayload {
    pub path: String,
    pub from: usize,
    pub to: usize,
}

pub fn validate(path: impl Into<String>) -> Intent {
    Intent::Validate(path.into())
}

pub fn reset(payload: ResetPayload) -> Intent {
    Intent::Reset(payload)
}

pub fn replace(payload: ReplacePayload) -> Intent {
    Intent::Replace(payload)
}

pub fn insert(payload: InsertPayload) -> Intent {
    Intent::Insert(payload)
}

pub fn remove(payload: RemovePayload) -> Intent {
    Intent::Remove(payload)
}

pub fn reorder(payload: ReorderPayload) -> Intent {
    Intent::Reorder(payload)
}

/// Parses the wire form of an intent list.
///
/// # Errors
/// Returns [`SubmissionError::UnknownIntent`] unless `raw` is a non-empty JSON
/// array whose elements all carry a string `type` and a `payload` matching
/// one of the known intents.
pub fn parse_intents(raw: &str) -> Result<Vec<Intent>, SubmissionError> {
    let unknown = |reason: String| SubmissionError::UnknownIntent { reason };

    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Err(unknown("expected a JSON array".to_string())),
        Err(err) => return Err(unknown(err.to_string())),
    };
    if items.is_empty() {
        return Err(unknown("the intent list is empty".to_string()));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            let well_formed =
                item.get("type").is_some_and(Value::is_string) && item.get("payload").is_some();
            if !well_formed {
                return Err(unknown(format!(
                    "intent #{position} must have a string `type` and a `payload`"
                )));
            }
            serde_json::from_value::<Intent>(item).map_err(|err| unknown(format!("intent #{position}: {err}")))
        })
        .collect()
}

/// Encodes an intent list into its wire form.
pub fn serialize_intents(intents: &[Intent]) -> Result<String, SubmissionError> {
    Ok(serde_json::to_string(intents)?)
}
