//! Text rendering of validation errors.

use oas_validation::{ValidationError, ValidationErrorKind};
use std::fmt::Write as _;

/// Render an error in the tidyverse style: title with code, problem
/// statement, bulleted location details, nested branch errors and a hint.
pub fn render(error: &ValidationError) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Error: OpenAPI Validation Failed ({})", error.error_code());
    let _ = writeln!(out);
    let _ = writeln!(out, "Problem: {}", error.message());
    let _ = writeln!(out);

    if error.instance_path.is_empty() {
        let _ = writeln!(out, "  ✖ At instance root");
    } else {
        let _ = writeln!(out, "  ✖ At instance path: `{}`", error.instance_path);
    }
    if !error.schema_path.is_empty() {
        let _ = writeln!(out, "  ℹ Schema constraint: {}", error.schema_path);
    }
    render_branches(&mut out, &error.context, 1);
    let _ = writeln!(out);

    if let Some(hint) = suggest_fix(&error.kind) {
        let _ = writeln!(out, "  ? {}", hint);
        let _ = writeln!(out);
    }
    out
}

fn render_branches(out: &mut String, branches: &[ValidationError], depth: usize) {
    let indent = "  ".repeat(depth + 1);
    for branch in branches {
        let _ = writeln!(
            out,
            "{}• {} (at {})",
            indent,
            branch.message(),
            branch.schema_path
        );
        render_branches(out, &branch.context, depth + 1);
    }
}

/// A hint (ending with ?) for the common failure kinds
fn suggest_fix(kind: &ValidationErrorKind) -> Option<String> {
    match kind {
        ValidationErrorKind::RequiredPropertyMissing { property } => {
            Some(format!("Add the `{}` property to the instance?", property))
        }
        ValidationErrorKind::NullNotAllowed => {
            Some("Mark the schema `nullable: true` or provide a value?".to_string())
        }
        ValidationErrorKind::ReadOnlyViolation { .. } => {
            Some("Remove read-only properties from request bodies?".to_string())
        }
        ValidationErrorKind::WriteOnlyViolation { .. } => {
            Some("Remove write-only properties from response bodies?".to_string())
        }
        ValidationErrorKind::AdditionalPropertyNotAllowed { unexpected } => Some(format!(
            "Remove {} or declare it under `properties`?",
            unexpected
                .iter()
                .map(|p| format!("`{}`", p))
                .collect::<Vec<_>>()
                .join(", ")
        )),
        ValidationErrorKind::DiscriminatorPropertyMissing { property, .. } => {
            Some(format!("Set `{}` to select a concrete schema?", property))
        }
        ValidationErrorKind::DiscriminatorUnresolvable { .. } => {
            Some(
                "Add a `mapping` entry for this value or a component of the same name?"
                    .to_string(),
            )
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oas_validation::OasValidator;
    use serde_json::json;

    #[test]
    fn test_render_required() {
        let validator = OasValidator::oas30(json!({
            "type": "object",
            "required": ["name"]
        }))
        .unwrap();
        let error = validator.validate(&json!({})).unwrap_err();
        insta::assert_snapshot!(render(&error), @r#"
        Error: OpenAPI Validation Failed (O-1-10)

        Problem: "name" is a required property

          ✖ At instance root
          ℹ Schema constraint: required

          ? Add the `name` property to the instance?
        "#);
    }

    #[test]
    fn test_render_nested_branches() {
        let validator = OasValidator::oas31(json!({
            "properties": {
                "id": {"anyOf": [{"type": "string"}, {"type": "integer"}]}
            }
        }))
        .unwrap();
        let error = validator.validate(&json!({"id": 1.5})).unwrap_err();
        let rendered = render(&error);
        assert!(rendered.contains("Problem: 1.5 is not valid under any of the given schemas"));
        assert!(rendered.contains("✖ At instance path: `id`"));
        for (branch, expected) in ["string", "integer"].iter().enumerate() {
            let line = format!(
                "• 1.5 is not of type \"{}\" (at properties > id > anyOf > {} > type)",
                expected, branch
            );
            assert!(rendered.contains(&line), "missing branch line: {}", line);
        }
        assert!(!rendered.contains("? "));
    }
}
