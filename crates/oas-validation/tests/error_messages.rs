//! Rendered error text, pinned with inline snapshots.

use oas_validation::{OasValidator, ValidationContext, ValidatorOptions};
use serde_json::{Value, json};

fn render(validator: &OasValidator, instance: Value) -> String {
    validator.validate(&instance).unwrap_err().to_string()
}

fn pet_store() -> Value {
    json!({
        "openapi": "3.0.3",
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["id", "name"],
                    "properties": {
                        "id": {"type": "integer", "format": "int64", "readOnly": true},
                        "name": {"type": "string", "minLength": 1},
                        "tag": {"type": "string", "nullable": true},
                        "born": {"type": "string", "format": "date"},
                        "photos": {
                            "type": "array",
                            "maxItems": 2,
                            "items": {"type": "string", "format": "uuid"}
                        }
                    },
                    "additionalProperties": false
                }
            }
        }
    })
}

fn pet_validator(context: ValidationContext) -> OasValidator {
    let options = ValidatorOptions::oas30()
        .with_context(context)
        .with_entry("#/components/schemas/Pet");
    OasValidator::new(pet_store(), options).unwrap()
}

#[test]
fn test_rendered_messages() {
    let v = pet_validator(ValidationContext::Unspecified);

    insta::assert_snapshot!(
        render(&v, json!({"name": "Rex"})),
        @r#"Validation error at (root): "id" is a required property"#
    );
    insta::assert_snapshot!(
        render(&v, json!({"id": 1, "name": ""})),
        @r#"Validation error at name: "" is too short"#
    );
    insta::assert_snapshot!(
        render(&v, json!({"id": 1, "name": "Rex", "born": "yesterday"})),
        @r#"Validation error at born: "yesterday" is not a 'date'"#
    );
    insta::assert_snapshot!(
        render(&v, json!({"id": 1, "name": "Rex", "photos": ["nope"]})),
        @r#"Validation error at photos.[0]: "nope" is not a 'uuid'"#
    );
    let extra = v
        .validate(&json!({"id": 1, "name": "Rex", "owner": "me"}))
        .unwrap_err();
    assert!(extra.instance_path.is_empty());
    insta::assert_snapshot!(
        extra.message(),
        @r#"Additional properties are not allowed ("owner" was unexpected)"#
    );
    insta::assert_snapshot!(
        render(&v, json!({"id": null, "name": "Rex"})),
        @"Validation error at id: None for not nullable"
    );
}

#[test]
fn test_rendered_context_violation() {
    let v = pet_validator(ValidationContext::Write);
    insta::assert_snapshot!(
        render(&v, json!({"id": 1, "name": "Rex"})),
        @"Validation error at id: Tried to write read-only property with 1"
    );
}

#[test]
fn test_error_json() {
    let v = pet_validator(ValidationContext::Unspecified);
    let err = v.validate(&json!({"id": "x", "name": "Rex"})).unwrap_err();
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(
        value,
        json!({
            "kind": {
                "type": "TypeMismatch",
                "data": {"instance": "x", "expected": ["integer"]}
            },
            "instance_path": ["id"],
            "schema_path": ["properties", "id", "type"]
        })
    );
}

#[test]
fn test_combinator_error_carries_branch_errors() {
    let v = OasValidator::oas31(json!({
        "oneOf": [{"type": "string"}, {"type": "integer", "minimum": 10}]
    }))
    .unwrap();
    let err = v.validate(&json!(3)).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"Validation error at (root): 3 is not valid under any of the given schemas"
    );
    let branches: Vec<String> = err.context.iter().map(|e| e.message()).collect();
    insta::assert_snapshot!(
        branches.join("\n"),
        @r#"
    3 is not of type "string"
    3 is less than the minimum of 10
    "#
    );
}
