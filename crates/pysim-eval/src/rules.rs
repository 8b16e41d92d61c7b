//! Line rules.
//!
//! Every non-skipped line is offered to each rule in [`default_rules`] order.
//! Rules are independent: none of them stops the others from looking at the
//! same line, so a line such as `print("a=b")` is both printed and treated as
//! an assignment.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::arith;
use crate::error::ExecutionError;
use crate::interpreter::RunState;
use crate::literal;
use crate::value::Value;

/// Comment marker; lines starting with it are skipped.
pub const COMMENT_MARKER: char = '#';

static PRINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"print\((.*?)\)").unwrap());

static DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"def\s+([A-Za-z0-9_]+)\((.*?)\):").unwrap());

static CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z0-9_]+)\s*=\s*([A-Za-z0-9_]+)\((.*?)\)").unwrap()
});

/// A predicate and action applied to one trimmed source line.
pub trait LineRule: Send + Sync {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Apply the rule. Returns `Ok(true)` when it fired.
    fn apply(&self, line: &str, state: &mut RunState) -> Result<bool, ExecutionError>;
}

/// True for blank lines and comments.
pub fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with(COMMENT_MARKER)
}

/// The rule list, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn LineRule>> {
    vec![
        Box::new(PrintRule),
        Box::new(AssignmentRule),
        Box::new(DefinitionRule),
        Box::new(CallAssignmentRule),
    ]
}

/// `print(<content>)`.
pub struct PrintRule;

impl PrintRule {
    /// Text emitted for the content between the parentheses.
    pub fn resolve(content: &str, state: &RunState) -> String {
        if let Some(text) = literal::unquote(content) {
            return text.to_string();
        }
        if let Some(value) = state.env().get(content) {
            return value.to_string_value();
        }
        match arith::evaluate(content) {
            Ok(n) => Value::Number(n).to_string_value(),
            Err(e) => {
                tracing::trace!(content, error = %e, "print fallback to raw text");
                content.to_string()
            }
        }
    }
}

impl LineRule for PrintRule {
    fn name(&self) -> &'static str {
        "print"
    }

    fn apply(&self, line: &str, state: &mut RunState) -> Result<bool, ExecutionError> {
        if !line.starts_with("print(") {
            return Ok(false);
        }
        let Some(caps) = PRINT_RE.captures(line) else {
            return Ok(false);
        };
        let content = caps.get(1).map_or("", |m| m.as_str()).trim();
        let text = Self::resolve(content, state);
        state.emit(text)?;
        Ok(true)
    }
}

/// `<name> = <expression>`.
pub struct AssignmentRule;

impl AssignmentRule {
    /// Value stored for a right-hand side.
    pub fn classify(expr: &str, state: &RunState) -> Value {
        if let Some(text) = literal::unquote(expr) {
            Value::from(text)
        } else if let Some(n) = literal::parse_number(expr) {
            Value::Number(n)
        } else if let Some(body) = literal::fstring_body(expr) {
            Value::Str(state.env().interpolate(body))
        } else {
            Value::from(expr)
        }
    }
}

impl LineRule for AssignmentRule {
    fn name(&self) -> &'static str {
        "assignment"
    }

    fn apply(&self, line: &str, state: &mut RunState) -> Result<bool, ExecutionError> {
        if line.contains("==") {
            return Ok(false);
        }
        let Some((name, expr)) = line.split_once('=') else {
            return Ok(false);
        };
        let value = Self::classify(expr.trim(), state);
        state.bind(name.trim(), value)?;
        Ok(true)
    }
}

/// `def <identifier>(<params>):`. Binds the function marker only.
pub struct DefinitionRule;

impl LineRule for DefinitionRule {
    fn name(&self) -> &'static str {
        "definition"
    }

    fn apply(&self, line: &str, state: &mut RunState) -> Result<bool, ExecutionError> {
        if !line.starts_with("def ") {
            return Ok(false);
        }
        let Some(caps) = DEF_RE.captures(line) else {
            return Ok(false);
        };
        state.bind(&caps[1], Value::Function)?;
        Ok(true)
    }
}

/// `<result> = <func>(<args>)` for the recognized built-ins.
pub struct CallAssignmentRule;

impl CallAssignmentRule {
    /// Quote characters removed, split on commas, trimmed.
    ///
    /// Always yields at least one (possibly empty) field.
    pub fn split_args(raw: &str) -> Vec<String> {
        raw.replace(['"', '\''], "")
            .split(',')
            .map(|a| a.trim().to_string())
            .collect()
    }
}

impl LineRule for CallAssignmentRule {
    fn name(&self) -> &'static str {
        "call"
    }

    fn apply(&self, line: &str, state: &mut RunState) -> Result<bool, ExecutionError> {
        if !(line.contains('(') && line.contains(')'))
            || line.starts_with("def")
            || line.starts_with("print")
        {
            return Ok(false);
        }
        let Some(caps) = CALL_RE.captures(line) else {
            return Ok(false);
        };
        let args = Self::split_args(&caps[3]);
        match call_builtin(&caps[2], &args) {
            Some(value) => {
                state.bind(&caps[1], value)?;
                Ok(true)
            }
            None => {
                tracing::trace!(function = &caps[2], "call to unrecognized function ignored");
                Ok(false)
            }
        }
    }
}

/// Result of calling a simulated built-in, or `None` when the name is unknown.
pub fn call_builtin(name: &str, args: &[String]) -> Option<Value> {
    match (name, args.first()) {
        ("greet", Some(who)) => Some(Value::Str(format!("Hello, {}!", who))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Limits;

    fn state() -> RunState {
        RunState::new(Limits::default())
    }

    #[test]
    fn test_is_skipped() {
        assert!(is_skipped(""));
        assert!(is_skipped("# note"));
        assert!(!is_skipped("x = 1"));
    }

    #[test]
    fn test_print_resolution_order() {
        let mut st = state();
        st.bind("x", Value::Number(5.0)).unwrap();
        assert_eq!(PrintRule::resolve("'x'", &st), "x");
        assert_eq!(PrintRule::resolve("x", &st), "5");
        assert_eq!(PrintRule::resolve("2 ** 3", &st), "8");
        assert_eq!(PrintRule::resolve("2+", &st), "2+");
        assert_eq!(PrintRule::resolve("y", &st), "y");
    }

    #[test]
    fn test_print_is_non_greedy() {
        let mut st = state();
        assert!(PrintRule.apply("print((1 + 2) * 3)", &mut st).unwrap());
        assert_eq!(st.output(), &["(1 + 2".to_string()]);
    }

    #[test]
    fn test_print_without_closing_paren_emits_nothing() {
        let mut st = state();
        assert!(!PrintRule.apply("print(\"oops\"", &mut st).unwrap());
        assert!(st.output().is_empty());
    }

    #[test]
    fn test_assignment_classification() {
        let mut st = state();
        AssignmentRule.apply("a = 'text'", &mut st).unwrap();
        AssignmentRule.apply("b = 42", &mut st).unwrap();
        AssignmentRule.apply("c = f\"{a}-{b}-{zz}\"", &mut st).unwrap();
        AssignmentRule.apply("d = a + b", &mut st).unwrap();

        assert_eq!(st.env().get("a"), Some(&Value::from("text")));
        assert_eq!(st.env().get("b"), Some(&Value::Number(42.0)));
        assert_eq!(st.env().get("c"), Some(&Value::from("text-42-{zz}")));
        assert_eq!(st.env().get("d"), Some(&Value::from("a + b")));
    }

    #[test]
    fn test_assignment_rejoins_extra_equals() {
        let mut st = state();
        AssignmentRule.apply("s = a=b", &mut st).unwrap();
        assert_eq!(st.env().get("s"), Some(&Value::from("a=b")));
    }

    #[test]
    fn test_assignment_ignores_comparisons() {
        let mut st = state();
        assert!(!AssignmentRule.apply("x == 1", &mut st).unwrap());
        assert!(st.env().is_empty());
    }

    #[test]
    fn test_definition_binds_marker() {
        let mut st = state();
        assert!(DefinitionRule.apply("def area(w, h):", &mut st).unwrap());
        assert!(!DefinitionRule.apply("def broken", &mut st).unwrap());
        assert_eq!(st.env().get("area"), Some(&Value::Function));
        assert_eq!(st.env().len(), 1);
    }

    #[test]
    fn test_call_rule_greet() {
        let mut st = state();
        assert!(CallAssignmentRule.apply("msg = greet('Ada', \"x\")", &mut st).unwrap());
        assert_eq!(st.env().get("msg"), Some(&Value::from("Hello, Ada!")));
    }

    #[test]
    fn test_call_rule_unknown_function_binds_nothing() {
        let mut st = state();
        assert!(!CallAssignmentRule.apply("r = mystery(1)", &mut st).unwrap());
        assert!(!CallAssignmentRule.apply("print(greet('x'))", &mut st).unwrap());
        assert!(st.env().is_empty());
    }

    #[test]
    fn test_split_args() {
        assert_eq!(CallAssignmentRule::split_args(" 'a' , \"b\" "), vec!["a", "b"]);
        assert_eq!(CallAssignmentRule::split_args(""), vec![""]);
    }
}
