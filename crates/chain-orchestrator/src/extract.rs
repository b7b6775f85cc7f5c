//! Recovering an `ExecutionPlan` from raw LLM output.

use chain_types::plan::ExecutionPlan;

/// Errors extracting or decoding a plan from LLM text.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// A balanced JSON object was found but did not deserialize into the plan shape.
    #[error("malformed execution plan: {0}")]
    Malformed(String),
}

impl chain_types::ErrorCode for PlanError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "MALFORMED_PLAN",
        }
    }
}

/// Scans `raw` for the first top-level JSON object, tolerant of surrounding prose or
/// Markdown fences. Correctly skips braces that appear inside quoted strings and
/// respects backslash escaping, in the manner of `IntentResolver::extract_json`.
/// Returns `None` if no balanced object is found; absence is not an error, the
/// original text is the caller's concern.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    let mut end = None;

    for (i, c) in raw[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if c == '\\' {
            escape = true;
            continue;
        }
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if !in_string {
            if c == '{' {
                depth += 1;
            } else if c == '}' {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + i + c.len_utf8());
                    break;
                }
            }
        }
    }

    end.map(|e| &raw[start..e])
}

/// Extracts and parses an `ExecutionPlan` from raw LLM text. Returns `Ok(None)` when
/// no balanced JSON object is present (the text is not an error, just not a plan);
/// returns `Err` only when an object was found but failed to deserialize.
pub fn extract_plan(raw: &str) -> Result<Option<ExecutionPlan>, PlanError> {
    let Some(json) = extract_json_object(raw) else {
        return Ok(None);
    };
    serde_json::from_str(json).map(Some).map_err(|e| PlanError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_bare_object() {
        let raw = r#"{"a": 1, "b": {"c": 2}}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn extracts_an_object_surrounded_by_prose_and_fences() {
        let raw = "Sure, here's the plan:\n```json\n{\"id\": \"p1\"}\n```\nLet me know if that works.";
        assert_eq!(extract_json_object(raw), Some(r#"{"id": "p1"}"#));
    }

    #[test]
    fn ignores_braces_inside_quoted_strings() {
        let raw = r#"{"description": "use the \"{odd}\" brace", "ok": true}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn returns_none_when_no_object_is_present() {
        assert_eq!(extract_json_object("just some plain text, no plan here"), None);
    }

    #[test]
    fn malformed_object_yields_an_error_not_a_panic() {
        let raw = r#"{"id": "p1", "steps": "not an array"}"#;
        let err = extract_plan(raw).expect_err("should fail to deserialize");
        assert!(matches!(err, PlanError::Malformed(_)));
    }
}
