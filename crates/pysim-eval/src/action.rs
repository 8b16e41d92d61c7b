//! Request boundary around the interpreter.
//!
//! This is where submitted code arrives from a client. Faults here are
//! reported as internal errors; faults inside the run as execution errors.

use serde::{Deserialize, Serialize};

use crate::error::{Error, InternalError};
use crate::interpreter::{Execution, ExecutionResult, Interpreter, Limits};

/// A request to run a snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Opaque correlation id echoed back in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub code: String,
}

/// An [`ExecutionResult`] tagged with the id of the request it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

/// Run submitted code under `limits`.
pub fn execute_code(code: &str, limits: &Limits) -> ExecutionResult {
    run_code(code, limits).into()
}

/// Run submitted code under `limits`, keeping the final environment.
///
/// Logs the code, output and variables at debug level and failures at warn.
pub fn run_code(code: &str, limits: &Limits) -> crate::Result<Execution> {
    tracing::debug!(code, "executing submitted code");

    let outcome = check_source_size(code, limits)
        .map_err(Error::from)
        .and_then(|()| {
            Interpreter::with_limits(*limits)
                .execute(code)
                .map_err(Error::from)
        });

    match &outcome {
        Ok(execution) => {
            tracing::debug!(output = ?execution.lines, "output");
            tracing::debug!(
                variables = %serde_json::to_string(&execution.environment).unwrap_or_default(),
                "variables"
            );
        }
        Err(err) => tracing::warn!("{}", err),
    }
    outcome
}

/// Reject sources over the configured byte limit.
pub fn check_source_size(code: &str, limits: &Limits) -> Result<(), InternalError> {
    match limits.max_source_bytes {
        Some(limit) if code.len() > limit => Err(InternalError::SourceTooLarge {
            size: code.len(),
            limit,
        }),
        _ => Ok(()),
    }
}

/// Decode a JSON request payload.
pub fn parse_request(payload: &str) -> Result<ExecuteRequest, InternalError> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| InternalError::MalformedRequest(e.to_string()))?;
    let id = value.get("id").cloned();
    match value.get("code") {
        Some(serde_json::Value::String(code)) => Ok(ExecuteRequest {
            id,
            code: code.clone(),
        }),
        _ => Err(InternalError::MissingCode),
    }
}

/// Handle one raw JSON payload end to end.
///
/// Never fails: every fault becomes an unsuccessful response.
pub fn handle_payload(payload: &str, limits: &Limits) -> ExecuteResponse {
    match parse_request(payload) {
        Ok(request) => ExecuteResponse {
            result: execute_code(&request.code, limits),
            id: request.id,
        },
        Err(e) => {
            let err = Error::from(e);
            tracing::warn!("{}", err);
            ExecuteResponse {
                id: None,
                result: ExecutionResult::failure(&err),
            }
        }
    }
}
