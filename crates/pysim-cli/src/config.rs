//! Limits read from the environment.

use std::env;

use anyhow::{Context, Result};
use pysim_eval::Limits;

pub const MAX_SOURCE_BYTES_VAR: &str = "PYSIM_MAX_SOURCE_BYTES";
pub const MAX_OUTPUT_LINES_VAR: &str = "PYSIM_MAX_OUTPUT_LINES";
pub const MAX_BINDINGS_VAR: &str = "PYSIM_MAX_BINDINGS";

/// Build limits from `PYSIM_*` variables. Unset or empty variables leave the
/// limit off.
pub fn limits_from_env() -> Result<Limits> {
    limits_from(|key| env::var(key).ok())
}

/// Build limits from an arbitrary variable lookup.
pub fn limits_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Limits> {
    Ok(Limits {
        max_source_bytes: read_usize(&lookup, MAX_SOURCE_BYTES_VAR)?,
        max_output_lines: read_usize(&lookup, MAX_OUTPUT_LINES_VAR)?,
        max_bindings: read_usize(&lookup, MAX_BINDINGS_VAR)?,
    })
}

fn read_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<usize>> {
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<usize>()
            .map(Some)
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, v)),
        _ => Ok(None),
    }
}

/// Overlay command line values on top of `base`.
pub fn apply_overrides(
    base: Limits,
    max_source_bytes: Option<usize>,
    max_output_lines: Option<usize>,
    max_bindings: Option<usize>,
) -> Limits {
    Limits {
        max_source_bytes: max_source_bytes.or(base.max_source_bytes),
        max_output_lines: max_output_lines.or(base.max_output_lines),
        max_bindings: max_bindings.or(base.max_bindings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_unset_means_unbounded() {
        assert_eq!(limits_from(lookup(&[])).unwrap(), Limits::default());
        assert_eq!(
            limits_from(lookup(&[(MAX_OUTPUT_LINES_VAR, " ")])).unwrap(),
            Limits::default()
        );
    }

    #[test]
    fn test_reads_values() {
        let limits = limits_from(lookup(&[
            (MAX_SOURCE_BYTES_VAR, "4096"),
            (MAX_OUTPUT_LINES_VAR, " 10 "),
        ]))
        .unwrap();
        assert_eq!(limits.max_source_bytes, Some(4096));
        assert_eq!(limits.max_output_lines, Some(10));
        assert_eq!(limits.max_bindings, None);
    }

    #[test]
    fn test_rejects_garbage() {
        let err = limits_from(lookup(&[(MAX_BINDINGS_VAR, "lots")])).unwrap_err();
        assert!(err.to_string().contains(MAX_BINDINGS_VAR));
    }

    #[test]
    fn test_flags_override_env() {
        let base = Limits {
            max_source_bytes: Some(1),
            max_output_lines: Some(2),
            max_bindings: None,
        };
        let merged = apply_overrides(base, None, Some(5), Some(3));
        assert_eq!(merged.max_source_bytes, Some(1));
        assert_eq!(merged.max_output_lines, Some(5));
        assert_eq!(merged.max_bindings, Some(3));
    }
}
