use crate::codec::{simplify, simplify_errors};
use crate::context::SubmissionContext;
use crate::intent::Intent;
use crate::path::{get_value, remove_value};
use crate::state::SubmissionState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Errors by path. `None` means "checked, no error".
pub type ErrorMap<E> = BTreeMap<String, Option<E>>;

/// What an external resolver reports for a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<V, E> {
    /// The typed business value; only meaningful when no intents are pending.
    pub value: Option<V>,
    pub error: Option<ErrorMap<E>>,
}

impl<V, E> Resolution<V, E> {
    pub fn new(value: Option<V>, error: Option<ErrorMap<E>>) -> Self {
        Self { value, error }
    }

    pub fn value(value: V) -> Self {
        Self::new(Some(value), None)
    }

    pub fn error(error: ErrorMap<E>) -> Self {
        Self::new(None, Some(error))
    }
}

impl<V, E> Default for Resolution<V, E> {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    /// No intents: the value is final.
    Submit,
    /// Intents were applied: the client keeps replaying them.
    Update,
}

/// A parsed, reduced and resolved submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission<V, E> {
    pub intents: Option<Vec<Intent>>,
    pub payload: Value,
    pub fields: Vec<String>,
    pub value: Option<V>,
    pub error: Option<ErrorMap<E>>,
    pub state: SubmissionState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptOptions {
    /// Discard all client state.
    pub reset_form: bool,
    /// Paths scrubbed from the echoed payload.
    pub hide_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectOptions<E> {
    /// Overrides the error at the root path `""`.
    pub form_error: Option<E>,
    /// Overrides errors by path.
    pub field_error: BTreeMap<String, E>,
    pub hide_fields: Vec<String>,
}

impl<E> Default for RejectOptions<E> {
    fn default() -> Self {
        Self {
            form_error: None,
            field_error: BTreeMap::new(),
            hide_fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Error,
    Success,
}

/// The client-facing outcome of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult<E> {
    /// Absent while intents are still outstanding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<Intent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BTreeMap<String, E>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SubmissionState>,
}

impl<E> Default for SubmissionResult<E> {
    fn default() -> Self {
        Self {
            status: None,
            intents: None,
            initial_value: None,
            error: None,
            state: None,
        }
    }
}

impl<E> SubmissionResult<E> {
    pub fn is_success(&self) -> bool {
        self.status == Some(Status::Success)
    }

    pub fn is_error(&self) -> bool {
        self.status == Some(Status::Error)
    }
}

impl<E: Serialize> SubmissionResult<E> {
    /// Serializes the result into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the result into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    #[cfg(feature = "yaml")]
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Deletes each of `fields` from `payload` when a value is present there.
pub fn hide_fields<S: AsRef<str>>(payload: &mut Value, fields: &[S]) {
    for field in fields {
        let field = field.as_ref();
        if get_value(payload, field).is_some() {
            remove_value(payload, field);
        }
    }
}

impl<V, E> Submission<V, E> {
    /// Folds a resolver's output into a reduced context.
    ///
    /// Without intents, every submitted field and every path the resolver
    /// reported on is marked validated, so server-side errors show up without
    /// an explicit `validate` intent.
    pub fn from_context(context: SubmissionContext, resolution: Resolution<V, E>) -> Self {
        let SubmissionContext {
            intents,
            payload,
            fields,
            mut state,
        } = context;
        let Resolution { value, error } = resolution;

        let value = match intents {
            None => {
                for field in &fields {
                    state.validate(field.as_str());
                }
                for path in error.iter().flat_map(BTreeMap::keys) {
                    state.validate(path.as_str());
                }
                value
            }
            Some(_) => None,
        };

        let submission = Self {
            intents,
            payload,
            fields,
            value,
            error,
            state,
        };
        log::debug!("Resolved submission as {:?}", submission.kind());
        submission
    }

    pub fn kind(&self) -> SubmissionKind {
        match self.intents {
            None => SubmissionKind::Submit,
            Some(_) => SubmissionKind::Update,
        }
    }

    /// The final value of a [`SubmissionKind::Submit`] submission.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Builds a success result.
    pub fn accept(self, options: AcceptOptions) -> SubmissionResult<E> {
        if options.reset_form {
            return SubmissionResult {
                status: Some(Status::Success),
                ..SubmissionResult::default()
            };
        }

        let mut payload = self.payload;
        hide_fields(&mut payload, &options.hide_fields);

        SubmissionResult {
            status: Some(Status::Success),
            intents: None,
            initial_value: simplify(payload),
            error: self.error.and_then(simplify_errors),
            state: Some(self.state),
        }
    }

    /// Builds an error result.
    ///
    /// Only errors at validated paths are kept; `options` may override them.
    /// While intents are outstanding the status is left out and the intents
    /// are echoed back for the client to replay.
    pub fn reject(self, options: RejectOptions<E>) -> SubmissionResult<E> {
        let RejectOptions {
            mut form_error,
            mut field_error,
            hide_fields: hidden,
        } = options;

        let mut error = BTreeMap::new();
        for (path, current) in self.error.into_iter().flatten() {
            if !self.state.is_validated(&path) {
                continue;
            }
            let next = if path.is_empty() {
                form_error.take()
            } else {
                field_error.remove(&path)
            };
            if let Some(next) = next.or(current) {
                error.insert(path, next);
            }
        }

        let mut payload = self.payload;
        hide_fields(&mut payload, &hidden);

        SubmissionResult {
            status: self.intents.is_none().then_some(Status::Error),
            intents: self.intents,
            initial_value: simplify(payload),
            error: (!error.is_empty()).then_some(error),
            state: Some(self.state),
        }
    }
}
