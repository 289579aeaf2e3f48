//! The uniform outcome type returned by submit and confirm.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bureau_core::PendingChangeId;

/// Operator-facing message for failures we cannot say anything better about
/// (network failure, non-2xx without a parseable body).
pub const GENERIC_FAILURE_MESSAGE: &str = "Une erreur est survenue. Veuillez réessayer.";

/// Field-keyed validation errors (field name → messages, first one wins for
/// inline display).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First error of a given field, for inline display next to the input.
    pub fn first_of(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|msgs| msgs.first()).map(String::as_str)
    }

    /// Each field's first error, in field order.
    pub fn first_errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(field, msgs)| {
            msgs.first().map(|msg| (field.as_str(), msg.as_str()))
        })
    }
}

/// Outcome of a submit or confirm call.
///
/// One sum type for the three response shapes of the API: immediate success,
/// pending-OTP state, and failure. Transport errors are folded into `Failed`
/// before reaching the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeOutcome {
    /// The operation took effect; `message` is ready for display.
    Completed { message: String },
    /// The API stored a pending change and sent an OTP; confirmation required.
    Pending { pending_change_id: PendingChangeId },
    /// The operation failed; `field_errors` is empty for non-validation failures.
    Failed {
        message: String,
        #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
        field_errors: FieldErrors,
    },
}

impl ChangeOutcome {
    pub fn completed(message: impl Into<String>) -> Self {
        Self::Completed { message: message.into() }
    }

    pub fn pending(id: PendingChangeId) -> Self {
        Self::Pending { pending_change_id: id }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed { message: message.into(), field_errors: FieldErrors::new() }
    }

    pub fn generic_failure() -> Self {
        Self::failed(GENERIC_FAILURE_MESSAGE)
    }

    pub fn validation_failure(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Failed { message: message.into(), field_errors }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
