use crate::error::SubmissionError;
use crate::intent::{parse_intents, serialize_intents, Intent};
use crate::path::set_value;
use crate::reducer::apply_intent;
use crate::state::SubmissionState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Reserved field carrying the JSON-encoded intent list.
pub const INTENT_FIELD: &str = "__intent__";
/// Reserved field carrying the JSON-encoded validation state.
pub const STATE_FIELD: &str = "__state__";

/// Names of the reserved fields. Defaults to [`INTENT_FIELD`] and [`STATE_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionConfig {
    pub intent_field: String,
    pub state_field: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            intent_field: INTENT_FIELD.to_string(),
            state_field: STATE_FIELD.to_string(),
        }
    }
}

/// An ordered, string-keyed submission body. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, Value)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs.into_iter().collect()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Replaces every entry named `name` with a single one.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.entries.retain(|(entry, _)| entry != name);
        self.append(name, value)
    }

    /// Stores `intents` under [`INTENT_FIELD`], the way a client re-submits a
    /// form to replay them.
    ///
    /// Bodies meant for a parser with custom reserved names should use
    /// [`FormData::set_intents_with`].
    pub fn set_intents(&mut self, intents: &[Intent]) -> Result<&mut Self, SubmissionError> {
        self.set_intents_with(&SubmissionConfig::default(), intents)
    }

    /// Stores `intents` under the intent field named by `config`.
    pub fn set_intents_with(
        &mut self,
        config: &SubmissionConfig,
        intents: &[Intent],
    ) -> Result<&mut Self, SubmissionError> {
        let encoded = serialize_intents(intents)?;
        Ok(self.set(&config.intent_field, encoded))
    }

    /// Stores `state` under [`STATE_FIELD`] for the next round-trip.
    pub fn set_state(&mut self, state: &SubmissionState) -> Result<&mut Self, SubmissionError> {
        self.set_state_with(&SubmissionConfig::default(), state)
    }

    /// Stores `state` under the state field named by `config`.
    pub fn set_state_with(
        &mut self,
        config: &SubmissionConfig,
        state: &SubmissionState,
    ) -> Result<&mut Self, SubmissionError> {
        let encoded = serde_json::to_string(state)?;
        Ok(self.set(&config.state_field, encoded))
    }

    /// The first value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// The working state of one submission, before it is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionContext {
    /// Intents to replay; `None` for a plain submit.
    pub intents: Option<Vec<Intent>>,
    pub payload: Value,
    /// Raw field names in submission order, without repeats.
    pub fields: Vec<String>,
    pub state: SubmissionState,
}

impl SubmissionContext {
    /// Splits a submission body into payload, field names, intents and state.
    ///
    /// Repeated names are coalesced into a list: the first repeat wraps the
    /// earlier value, later repeats append.
    ///
    /// # Errors
    /// Fails when a reserved field holds a non-string value, when the intent
    /// list is malformed, or when the state is not valid JSON.
    pub fn from_form_data(body: &FormData, config: &SubmissionConfig) -> Result<Self, SubmissionError> {
        let mut payload = Value::Object(Map::new());
        let mut fields = Vec::new();
        let mut seen = BTreeSet::new();
        let mut intents = None;
        let mut state = None;

        for (name, value) in body.entries() {
            let is_intent = name == config.intent_field;
            if is_intent || name == config.state_field {
                let raw = match value {
                    Value::String(raw) => raw.as_str(),
                    Value::Null => continue,
                    _ => {
                        return Err(SubmissionError::ReservedField {
                            field: name.to_string(),
                            intent_field: config.intent_field.clone(),
                            state_field: config.state_field.clone(),
                        })
                    }
                };
                if raw.is_empty() {
                    continue;
                }
                if is_intent {
                    intents = Some(parse_intents(raw)?);
                } else {
                    state = Some(parse_state(raw)?);
                }
                continue;
            }

            if name.is_empty() {
                log::debug!("Skipping a field without a name");
                continue;
            }

            let repeated = !seen.insert(name);
            set_value(&mut payload, name, |current| {
                Some(match current {
                    Some(Value::Array(mut items)) if repeated => {
                        items.push(value.clone());
                        Value::Array(items)
                    }
                    Some(previous) if repeated => Value::Array(vec![previous, value.clone()]),
                    _ => value.clone(),
                })
            });
            if !repeated {
                fields.push(name.to_string());
            }
        }

        log::debug!(
            "Built submission context with {} fields and {} intents",
            fields.len(),
            intents.as_ref().map_or(0, Vec::len)
        );

        Ok(Self {
            intents,
            payload,
            fields,
            state: state.unwrap_or_default(),
        })
    }

    /// Applies every intent, in order, to the payload and validation state.
    pub fn apply_intents(&mut self) -> Result<(), SubmissionError> {
        for intent in self.intents.iter().flatten() {
            apply_intent(&mut self.payload, &mut self.state, intent)?;
        }
        Ok(())
    }
}

fn parse_state(raw: &str) -> Result<SubmissionState, SubmissionError> {
    serde_json::from_str(raw).map_err(|err| SubmissionError::InvalidState {
        reason: err.to_string(),
    })
}

/// Builds a [`SubmissionContext`] using the default reserved field names.
pub fn get_submission_context(body: &FormData) -> Result<SubmissionContext, SubmissionError> {
    SubmissionContext::from_form_data(body, &SubmissionConfig::default())
}
