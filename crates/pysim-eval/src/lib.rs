//! Line-oriented interpreter that simulates a small subset of Python.
//!
//! Each source line is matched against a fixed, ordered set of rules
//! (print, assignment, `def`, and a `greet(...)` call) that read and write a
//! flat environment and append to an output buffer. There is no grammar and
//! no control flow; a run is one pass over the lines.
//!
//! ```
//! let result = pysim_eval::Interpreter::new().run("name = 'Bob'\nprint(name)");
//! assert!(result.success);
//! assert_eq!(result.output, "Bob");
//! ```

pub mod action;
mod arith;
mod env;
mod error;
mod interpreter;
mod literal;
pub mod rules;
mod value;

pub use arith::{evaluate as evaluate_arithmetic, ArithError};
pub use env::Environment;
pub use error::{Error, ExecutionError, InternalError};
pub use interpreter::{
    Execution, ExecutionResult, Interpreter, Limits, RunState, NO_OUTPUT_PLACEHOLDER,
};
pub use value::Value;

/// Result type for interpreter operations.
pub type Result<T> = std::result::Result<T, Error>;
