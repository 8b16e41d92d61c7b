//! Error types for the snippet interpreter.
//!
//! Two tiers: [`ExecutionError`] for faults inside the line loop and
//! [`InternalError`] for faults in the request handling around it. Each tier
//! is reported to the caller with its own message prefix.

use thiserror::Error;

/// Faults raised while interpreting the line stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// More output lines than the configured limit.
    #[error("output limit of {limit} lines exceeded at line {line}")]
    OutputLimit { limit: usize, line: usize },

    /// More distinct bindings than the configured limit.
    #[error("binding limit of {limit} names exceeded at line {line}")]
    BindingLimit { limit: usize, line: usize },
}

/// Faults in argument handling before the line loop runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalError {
    /// The request payload is not valid JSON.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The request has no string `code` field.
    #[error("request is missing a string `code` field")]
    MissingCode,

    /// The submitted source is larger than the caller allows.
    #[error("source is {size} bytes, limit is {limit}")]
    SourceTooLarge { size: usize, limit: usize },
}

/// Errors that can occur while running a snippet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] InternalError),
}
