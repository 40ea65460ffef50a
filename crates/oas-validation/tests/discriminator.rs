use oas_validation::{Combinator, OasValidator, ValidationErrorKind};
use serde_json::{Value, json};

/// `Route` combines two concrete schemas with the given combinator
fn route_schema(combinator: Combinator, discriminator: Option<Value>) -> Value {
    let mut route = json!({
        combinator.keyword(): [
            {"$ref": "#/components/schemas/MountainHiking"},
            {"$ref": "#/components/schemas/AlpineClimbing"}
        ]
    });
    if let Some(discriminator) = discriminator {
        route["discriminator"] = discriminator;
    }

    json!({
        "$ref": "#/components/schemas/Route",
        "components": {
            "schemas": {
                "MountainHiking": {
                    "type": "object",
                    "properties": {
                        "discipline": {
                            "type": "string",
                            "enum": ["mountain_hiking", "MountainHiking"]
                        },
                        "length": {"type": "integer"}
                    },
                    "required": ["discipline", "length"]
                },
                "AlpineClimbing": {
                    "type": "object",
                    "properties": {
                        "discipline": {"type": "string", "enum": ["alpine_climbing"]},
                        "height": {"type": "integer"}
                    },
                    "required": ["discipline", "height"]
                },
                "Route": route
            }
        }
    })
}

fn discipline_discriminator() -> Value {
    json!({
        "propertyName": "discipline",
        "mapping": {
            "mountain_hiking": "#/components/schemas/MountainHiking",
            "alpine_climbing": "#/components/schemas/AlpineClimbing"
        }
    })
}

#[test]
fn test_without_discriminator_branches_are_tried() {
    for combinator in [Combinator::OneOf, Combinator::AnyOf] {
        let v = OasValidator::oas30(route_schema(combinator, None)).unwrap();
        let err = v
            .validate(&json!({"something": "matching_none_of_the_schemas"}))
            .unwrap_err();
        assert!(
            err.message().ends_with("is not valid under any of the given schemas"),
            "{:?}: {}",
            combinator,
            err
        );
        assert_eq!(err.context.len(), 2);
    }
}

#[test]
fn test_discriminator_with_each_combinator() {
    for combinator in Combinator::ALL {
        let v = OasValidator::oas30(route_schema(combinator, Some(discipline_discriminator())))
            .unwrap();

        let err = v.validate(&json!({"something": "missing"})).unwrap_err();
        assert_eq!(
            err.message(),
            "{\"something\":\"missing\"} does not contain discriminating property 'discipline'",
            "{:?}",
            combinator
        );

        // Errors from the selected schema surface unchanged
        let err = v
            .validate(&json!({"discipline": "mountain_hiking", "length": "bad_string"}))
            .unwrap_err();
        assert_eq!(err.message(), "\"bad_string\" is not of type \"integer\"");
        assert_eq!(err.instance_path.to_string(), "length");

        // Explicit mapping
        assert!(v.is_valid(&json!({"discipline": "mountain_hiking", "length": 10})));
        // Implicit reference to the component of the same name
        assert!(v.is_valid(&json!({"discipline": "MountainHiking", "length": 10})));
        assert!(v.is_valid(&json!({"discipline": "alpine_climbing", "height": 8000})));

        let err = v.validate(&json!({"discipline": "other"})).unwrap_err();
        assert_eq!(
            err.message(),
            "reference '#/components/schemas/other' could not be resolved"
        );
        assert_eq!(
            err.kind,
            ValidationErrorKind::DiscriminatorUnresolvable {
                reference: "#/components/schemas/other".to_string()
            }
        );
    }
}

#[test]
fn test_discriminator_skips_brute_force() {
    // Both branches would match; the discriminator picks one so oneOf is not
    // ambiguous
    let v = OasValidator::oas31(json!({
        "oneOf": [
            {"$ref": "#/components/schemas/Cat"},
            {"$ref": "#/components/schemas/Dog"}
        ],
        "discriminator": {"propertyName": "petType"},
        "components": {
            "schemas": {
                "Cat": {"type": "object", "properties": {"petType": {"type": "string"}}},
                "Dog": {"type": "object", "properties": {"petType": {"type": "string"}}}
            }
        }
    }))
    .unwrap();
    assert!(v.is_valid(&json!({"petType": "Cat"})));
}

#[test]
fn test_non_object_instance_skips_discriminator() {
    let v = OasValidator::oas31(json!({
        "anyOf": [{"type": "string"}, {"$ref": "#/components/schemas/Cat"}],
        "discriminator": {"propertyName": "petType"},
        "components": {"schemas": {"Cat": {"type": "object"}}}
    }))
    .unwrap();
    assert!(v.is_valid(&json!("just a string")));
    assert!(!v.is_valid(&json!(5)));
}

#[test]
fn test_bare_discriminator_with_inheritance_cycle() {
    let schema = json!({
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["petType"],
                    "properties": {"petType": {"type": "string"}},
                    "discriminator": {"propertyName": "petType"}
                },
                "Cat": {
                    "allOf": [
                        {"$ref": "#/components/schemas/Pet"},
                        {
                            "type": "object",
                            "properties": {"huntingSkill": {"type": "string"}},
                            "required": ["huntingSkill"]
                        }
                    ]
                }
            }
        }
    });
    let options = oas_validation::ValidatorOptions::oas30().with_entry("#/components/schemas/Pet");
    let v = OasValidator::new(schema, options).unwrap();

    assert!(v.is_valid(&json!({"petType": "Cat", "huntingSkill": "lazy"})));
    let err = v.validate(&json!({"petType": "Cat"})).unwrap_err();
    assert_eq!(err.message(), "\"huntingSkill\" is a required property");
    let err = v.validate(&json!({"petType": "Dog"})).unwrap_err();
    assert_eq!(
        err.message(),
        "reference '#/components/schemas/Dog' could not be resolved"
    );
}
