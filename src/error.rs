use miette::Diagnostic;
use thiserror::Error;

/// Fatal conditions raised while building or reducing a submission.
///
/// Validation failures are not represented here: they travel as data through
/// the error map of a [`crate::api::Submission`].
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Reserved field `{field}` must be a string. `{intent_field}` and `{state_field}` are reserved for intents and validation state")]
    #[diagnostic(
        code(submission::reserved_field),
        help("Rename the form control, or make sure only the serialized intent list and state are sent under these names.")
    )]
    ReservedField {
        field: String,
        intent_field: String,
        state_field: String,
    },

    #[error("Unknown intent: {reason}")]
    #[diagnostic(
        code(submission::unknown_intent),
        help("The intent field must hold a non-empty JSON array of `{{\"type\": string, \"payload\": ...}}` objects.")
    )]
    UnknownIntent { reason: String },

    #[error("Unknown list intent: `{intent}`")]
    #[diagnostic(
        code(submission::unknown_list_intent),
        help("Only `insert`, `remove` and `reorder` intents can edit a list.")
    )]
    UnknownListIntent { intent: String },

    #[error("Invalid submission state: {reason}")]
    #[diagnostic(
        code(submission::invalid_state),
        help("The state field must hold JSON of the shape `{{\"validated\": {{\"path\": true}}}}`.")
    )]
    InvalidState { reason: String },

    #[error("The value at `{path}` is not a list")]
    #[diagnostic(
        code(submission::not_a_list),
        help("List intents can only be applied to a path holding a list, or to an empty path.")
    )]
    NotAList { path: String },

    #[error("Index {index} is out of bounds for the list at `{path}` (len: {len})")]
    #[diagnostic(code(submission::index_out_of_bounds))]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Replacing the whole payload requires a mapping value")]
    #[diagnostic(
        code(submission::invalid_root_value),
        help("Provide a `path` to replace a single field, or pass an object as `value`.")
    )]
    InvalidRootValue,

    #[error("Serialization failed: {reason}")]
    #[diagnostic(code(submission::serialization))]
    Serialization { reason: String },
}

impl From<serde_json::Error> for SubmissionError {
    fn from(err: serde_json::Error) -> Self {
        SubmissionError::Serialization {
            reason: err.to_string(),
        }
    }
}
