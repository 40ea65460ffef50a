use oas_validation::{
    DateTimeStrategy, FormatConfig, OasValidator, ValidationErrorKind, ValidatorOptions,
};
use serde_json::{Value, json};

const PRIMITIVE_TYPES: [&str; 5] = ["boolean", "array", "integer", "number", "string"];

const DATE_TIMES: [&str; 2] = ["1989-01-02T00:00:00Z", "2018-01-02T23:59:59Z"];

fn validator(schema: Value) -> OasValidator {
    OasValidator::oas30(schema).unwrap()
}

fn with_formats(schema: Value, formats: FormatConfig) -> OasValidator {
    OasValidator::new(schema, ValidatorOptions::oas30().with_formats(formats)).unwrap()
}

#[test]
fn test_typed_schema_rejects_null() {
    for ty in PRIMITIVE_TYPES {
        let err = validator(json!({"type": ty})).validate(&Value::Null).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NullNotAllowed, "type {}", ty);
    }
}

#[test]
fn test_untyped_schema_accepts_null() {
    for nullable in [true, false] {
        assert!(validator(json!({"nullable": nullable})).is_valid(&Value::Null));
    }
}

#[test]
fn test_nullable_typed_schema_accepts_null() {
    for ty in PRIMITIVE_TYPES {
        assert!(
            validator(json!({"type": ty, "nullable": true})).is_valid(&Value::Null),
            "type {}",
            ty
        );
    }
}

#[test]
fn test_nullable_enum_without_null() {
    let v = validator(json!({"type": "integer", "nullable": true, "enum": [1, 2, 3]}));
    let err = v.validate(&Value::Null).unwrap_err();
    assert_eq!(err.message(), "null is not one of [1,2,3]");
}

#[test]
fn test_nullable_enum_with_null() {
    let v = validator(json!({"type": "integer", "nullable": true, "enum": [1, 2, 3, null]}));
    assert!(v.is_valid(&Value::Null));
    assert!(v.is_valid(&json!(2)));
    assert!(!v.is_valid(&json!(4)));
}

#[test]
fn test_enum_null_does_not_bypass_closed_gate() {
    let v = validator(json!({"type": "string", "enum": ["John", null]}));
    let err = v.validate(&Value::Null).unwrap_err();
    assert_eq!(err.message(), "None for not nullable");
}

#[test]
fn test_date_time_without_any_strategy() {
    let v = with_formats(
        json!({"type": "string", "format": "date-time"}),
        FormatConfig::without_date_time(),
    );
    for value in DATE_TIMES {
        assert!(v.is_valid(&json!(value)));
    }
    assert!(v.is_valid(&json!("2018")));
}

#[test]
fn test_date_time_with_each_strategy() {
    for strategy in DateTimeStrategy::PRIORITY {
        let v = with_formats(
            json!({"type": "string", "format": "date-time"}),
            FormatConfig::only(strategy),
        );
        for value in DATE_TIMES {
            assert!(v.is_valid(&json!(value)), "{:?} rejected {}", strategy, value);
        }
    }
}

#[test]
fn test_date_time_invalid_iso8601() {
    let v = with_formats(
        json!({"type": "string", "format": "date-time"}),
        FormatConfig::only(DateTimeStrategy::Iso8601),
    );
    for value in ["1989-01-00Z", "2018"] {
        let err = v.validate(&json!(value)).unwrap_err();
        assert_eq!(err.message(), format!("\"{}\" is not a 'date-time'", value));
    }
}

#[test]
fn test_string_uuid() {
    let v = validator(json!({"type": "string", "format": "uuid"}));
    assert!(v.is_valid(&json!("f50ec0b7-f960-400d-91f0-c42a6d44e3d0")));
    assert!(v.is_valid(&json!("F50EC0B7-F960-400D-91F0-C42A6D44E3D0")));
    assert!(!v.is_valid(&json!("f50ec0b7")));
}

#[test]
fn test_byte_format() {
    let v = validator(json!({"type": "string", "format": "byte"}));
    assert!(v.is_valid(&json!("aGVsbG8gd29ybGQ=")));
    assert!(!v.is_valid(&json!("hello world")));
}

#[test]
fn test_required() {
    let v = validator(json!({
        "type": "object",
        "properties": {"some_prop": {"type": "string"}},
        "required": ["some_prop"]
    }));
    let err = v.validate(&json!({"another_prop": "bla"})).unwrap_err();
    assert_eq!(err.message(), "\"some_prop\" is a required property");
    assert!(v.is_valid(&json!({"some_prop": "hello"})));
}

#[test]
fn test_nullable_ref_follows_target() {
    for nullable in [true, false] {
        let v = validator(json!({
            "$ref": "#/$defs/Pet",
            "$defs": {
                "NullableText": {"type": "string", "nullable": nullable},
                "Pet": {
                    "properties": {
                        "testfield": {"$ref": "#/$defs/NullableText"}
                    }
                }
            }
        }));

        assert!(v.is_valid(&json!({"testfield": "John"})));
        let result = v.validate(&json!({"testfield": null}));
        if nullable {
            assert!(result.is_ok());
        } else {
            let err = result.unwrap_err();
            assert_eq!(err.message(), "None for not nullable");
            assert_eq!(err.instance_path.to_string(), "testfield");
        }
    }
}

#[test]
fn test_nullable_schema_combinators() {
    let cases = [
        ("oneOf", "null is not valid under any of the given schemas"),
        ("anyOf", "null is not valid under any of the given schemas"),
        ("allOf", "None for not nullable"),
    ];
    for (combinator, not_nullable_message) in cases {
        for nullable in [true, false] {
            // With oneOf both branches accepting null would be ambiguous
            let text_nullable = if combinator == "oneOf" { false } else { nullable };
            let v = validator(json!({
                "$ref": "#/$defs/Pet",
                "$defs": {
                    "NullableText": {"type": "string", "nullable": text_nullable},
                    "NullableEnum": {
                        "type": "string",
                        "nullable": nullable,
                        "enum": ["John", "Alice", null]
                    },
                    "Pet": {
                        "properties": {
                            "testfield": {
                                combinator: [
                                    {"$ref": "#/$defs/NullableText"},
                                    {"$ref": "#/$defs/NullableEnum"}
                                ]
                            }
                        }
                    }
                }
            }));

            let result = v.validate(&json!({"testfield": null}));
            if nullable {
                assert!(result.is_ok(), "{} nullable", combinator);
            } else {
                let err = result.unwrap_err();
                assert_eq!(err.message(), not_nullable_message, "{}", combinator);
            }
        }
    }
}

#[test]
fn test_conformant_instance_and_single_bad_field() {
    let v = validator(json!({
        "type": "object",
        "required": ["id"],
        "properties": {
            "id": {"type": "integer", "format": "int64"},
            "tags": {"type": "array", "items": {"type": "string"}},
            "note": {"type": "string", "nullable": true}
        }
    }));
    assert!(v.is_valid(&json!({"id": 1, "tags": ["a"], "note": null})));

    let err = v.validate(&json!({"id": "bad_string"})).unwrap_err();
    assert_eq!(err.message(), "\"bad_string\" is not of type \"integer\"");
    assert_eq!(err.instance_path.to_pointer(), "/id");
}
