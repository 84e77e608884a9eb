pub mod api;
pub mod codec;
pub mod context;
pub mod error;
pub mod intent;
pub mod path;
pub mod reducer;
pub mod serialization;
pub mod state;
pub mod submission;

pub use api::{parse, parse_async, SubmissionParser};
pub use context::{get_submission_context, FormData, SubmissionConfig, SubmissionContext, INTENT_FIELD, STATE_FIELD};
pub use error::SubmissionError;
pub use intent::Intent;
pub use state::SubmissionState;
pub use submission::{
    hide_fields, AcceptOptions, ErrorMap, RejectOptions, Resolution, Status, Submission,
    SubmissionKind, SubmissionResult,
};
