//! Shared error vocabulary.
//!
//! Every subsystem in the workspace defines its own `thiserror`-derived error enum, but
//! all of them implement [`ErrorCode`] so a caller can read off a stable, machine-readable
//! code without matching on the concrete type. UI layers render `code()` for telemetry
//! and `to_string()` (from `Display`, via `thiserror`) for the human-readable message.

/// Assigns a stable, machine-readable string code to an error variant.
///
/// Codes are the ones named throughout the specification (`NO_ENDPOINTS`,
/// `CROSS_REGISTRY`, `INSUFFICIENT_CAPABILITIES`, ...) and must never change once shipped,
/// since hosts may match on them.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// A warning is a non-fatal observation attached to an otherwise successful result
/// (account-reaping risk, legacy method usage, existential-deposit shortfall, ...).
///
/// Warnings never abort an operation; they are surfaced to the UI alongside a
/// successful [`crate::agent::AgentResult`] or terminal [`crate::status::ExecutionResult`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Warning {
    /// A short machine-readable category, e.g. `"reaping_risk"`, `"legacy_method"`.
    pub kind: String,
    /// The human-readable message, safe to render verbatim in a UI.
    pub message: String,
}

impl Warning {
    /// Builds a new warning of the given kind with the given message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
