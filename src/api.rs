use crate::context::{FormData, SubmissionConfig, SubmissionContext};
use crate::error::SubmissionError;
use crate::intent::Intent;
use crate::submission::{Resolution, Submission};
use serde_json::Value;
use std::future::Future;

/// Parses submissions: builds the context, replays intents, and folds in the
/// output of an external resolver.
#[derive(Debug, Clone, Default)]
pub struct SubmissionParser {
    config: SubmissionConfig,
}

impl SubmissionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SubmissionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Builds the submission context and applies every intent, in order.
    ///
    /// # Errors
    /// Returns a `SubmissionError` if the body is malformed or an intent
    /// cannot be applied.
    pub fn context(&self, body: &FormData) -> Result<SubmissionContext, SubmissionError> {
        let mut context = SubmissionContext::from_form_data(body, &self.config)?;
        context.apply_intents()?;
        Ok(context)
    }

    /// Parses `body` and resolves the reduced payload with `resolve`.
    ///
    /// `resolve` receives the payload and the intents (`None` for a plain
    /// submit). Its error type only needs to absorb [`SubmissionError`]; its
    /// own failures are returned unchanged.
    ///
    /// # Errors
    /// Returns the error of the context step or of `resolve`.
    pub fn parse<V, E, X, F>(&self, body: &FormData, resolve: F) -> Result<Submission<V, E>, X>
    where
        F: FnOnce(&Value, Option<&[Intent]>) -> Result<Resolution<V, E>, X>,
        X: From<SubmissionError>,
    {
        let context = self.context(body)?;
        let resolution = resolve(&context.payload, context.intents.as_deref())?;
        Ok(Submission::from_context(context, resolution))
    }

    /// Like [`SubmissionParser::parse`], with an asynchronous resolver.
    ///
    /// The resolver gets its own copy of the payload and intents, so the
    /// future it returns does not borrow from the parser.
    ///
    /// # Errors
    /// Returns the error of the context step or of `resolve`.
    pub async fn parse_async<V, E, X, F, Fut>(
        &self,
        body: &FormData,
        resolve: F,
    ) -> Result<Submission<V, E>, X>
    where
        F: FnOnce(Value, Option<Vec<Intent>>) -> Fut,
        Fut: Future<Output = Result<Resolution<V, E>, X>>,
        X: From<SubmissionError>,
    {
        let context = self.context(body)?;
        let resolution = resolve(context.payload.clone(), context.intents.clone()).await?;
        Ok(Submission::from_context(context, resolution))
    }
}

/// Parses a submission body with the default reserved field names.
///
/// This is the primary entry point. A body without intents produces a
/// submit submission carrying the resolver's value; a body with intents
/// produces an update submission that the client keeps replaying.
///
/// # Errors
/// Returns the error of the context step or of `resolve`.
pub fn parse<V, E, X, F>(body: &FormData, resolve: F) -> Result<Submission<V, E>, X>
where
    F: FnOnce(&Value, Option<&[Intent]>) -> Result<Resolution<V, E>, X>,
    X: From<SubmissionError>,
{
    SubmissionParser::new().parse(body, resolve)
}

/// Parses a submission body with an asynchronous resolver.
///
/// # Errors
/// Returns the error of the context step or of `resolve`.
pub async fn parse_async<V, E, X, F, Fut>(body: &FormData, resolve: F) -> Result<Submission<V, E>, X>
where
    F: FnOnce(Value, Option<Vec<Intent>>) -> Fut,
    Fut: Future<Output = Result<Resolution<V, E>, X>>,
    X: From<SubmissionError>,
{
    SubmissionParser::new().parse_async(body, resolve).await
}
