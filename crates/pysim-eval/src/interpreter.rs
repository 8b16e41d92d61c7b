//! The line interpreter.

use serde::{Deserialize, Serialize};

use crate::env::Environment;
use crate::error::{Error, ExecutionError};
use crate::rules::{self, LineRule};
use crate::value::Value;

/// Output reported when a run succeeds without printing anything.
pub const NO_OUTPUT_PLACEHOLDER: &str = "Code executed successfully (no output)";

/// Caller-imposed resource limits. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest source accepted at the request boundary.
    pub max_source_bytes: Option<usize>,
    /// Most output lines a run may produce.
    pub max_output_lines: Option<usize>,
    /// Most distinct names a run may bind.
    pub max_bindings: Option<usize>,
}

/// Mutable state of one run: environment, output buffer, current line.
#[derive(Debug)]
pub struct RunState {
    env: Environment,
    output: Vec<String>,
    line: usize,
    limits: Limits,
}

impl RunState {
    pub fn new(limits: Limits) -> Self {
        Self {
            env: Environment::new(),
            output: Vec::new(),
            line: 0,
            limits,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Append an output line.
    pub fn emit(&mut self, text: String) -> Result<(), ExecutionError> {
        if let Some(limit) = self.limits.max_output_lines {
            if self.output.len() >= limit {
                return Err(ExecutionError::OutputLimit {
                    limit,
                    line: self.line,
                });
            }
        }
        self.output.push(text);
        Ok(())
    }

    /// Bind a name, replacing any previous value.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> Result<(), ExecutionError> {
        let name = name.into();
        if let Some(limit) = self.limits.max_bindings {
            if !self.env.contains(&name) && self.env.len() >= limit {
                return Err(ExecutionError::BindingLimit {
                    limit,
                    line: self.line,
                });
            }
        }
        self.env.set(name, value);
        Ok(())
    }
}

/// Raw outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Printed lines, in order.
    pub lines: Vec<String>,
    /// Bindings left at the end of the run.
    pub environment: Environment,
}

impl Execution {
    /// Output joined with newlines, or the placeholder when that is empty.
    pub fn output_text(&self) -> String {
        let joined = self.lines.join("\n");
        if joined.is_empty() {
            NO_OUTPUT_PLACEHOLDER.to_string()
        } else {
            joined
        }
    }
}

/// The record handed back to callers.
///
/// `success` implies `error` is `None`; failure implies empty `output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn ok(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    /// Failure carrying the tier-prefixed message of `err`.
    pub fn failure(err: &Error) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(err.to_string()),
        }
    }
}

impl From<crate::Result<Execution>> for ExecutionResult {
    fn from(result: crate::Result<Execution>) -> Self {
        match result {
            Ok(execution) => ExecutionResult::ok(execution.output_text()),
            Err(e) => ExecutionResult::failure(&e),
        }
    }
}

/// Runs snippets. Holds only the rule list and limits, so one instance can
/// serve any number of independent runs.
pub struct Interpreter {
    rules: Vec<Box<dyn LineRule>>,
    limits: Limits,
}

impl Interpreter {
    /// Create an interpreter with no limits.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            rules: rules::default_rules(),
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Run `source` and report the outcome as an [`ExecutionResult`].
    pub fn run(&self, source: &str) -> ExecutionResult {
        self.execute(source).map_err(Error::from).into()
    }

    /// Run `source`, returning the printed lines and final environment.
    pub fn execute(&self, source: &str) -> Result<Execution, ExecutionError> {
        tracing::debug!(bytes = source.len(), "executing snippet");

        let mut state = RunState::new(self.limits);
        for (index, raw) in source.trim().split('\n').enumerate() {
            let line = raw.trim();
            state.line = index + 1;
            if rules::is_skipped(line) {
                continue;
            }
            for rule in &self.rules {
                if rule.apply(line, &mut state)? {
                    tracing::trace!(line = state.line, rule = rule.name(), "rule fired");
                }
            }
        }

        tracing::debug!(
            lines = state.output.len(),
            bindings = state.env.len(),
            "execution completed"
        );
        Ok(Execution {
            lines: state.output,
            environment: state.env,
        })
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
