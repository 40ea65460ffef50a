// Structural JSON Schema keywords

use serde_json::{Map, Value};

use crate::access::{Visibility, property_visible};
use crate::error::{PathSegment, ValidationErrorKind, ValidationResult};
use crate::nullable::{SchemaType, declared_type_names, skips_type_check};
use crate::validator::Evaluation;

fn usize_keyword(schema: &Map<String, Value>, keyword: &str) -> Option<usize> {
    schema
        .get(keyword)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

/// Equality with numbers compared by value, so `1` equals `1.0`
pub(crate) fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            if let (Some(l), Some(r)) = (l.as_i64(), r.as_i64()) {
                l == r
            } else if let (Some(l), Some(r)) = (l.as_u64(), r.as_u64()) {
                l == r
            } else {
                l.as_f64() == r.as_f64()
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| json_equal(l, r))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, l)| r.get(key).is_some_and(|r| json_equal(l, r)))
        }
        _ => left == right,
    }
}

pub(crate) fn check_type(
    ev: &mut Evaluation<'_>,
    schema: &Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    let Some(ty) = schema.get("type") else {
        return Ok(());
    };
    if skips_type_check(schema, instance, ev.dialect()) {
        return Ok(());
    }

    let names = declared_type_names(ty);
    let mut matched = false;
    for name in &names {
        match name.parse::<SchemaType>() {
            Ok(schema_type) => matched |= schema_type.matches(instance),
            Err(message) => {
                return Err(ev.with_schema_path("type", |ev| {
                    ev.error(ValidationErrorKind::InvalidSchema { message })
                }));
            }
        }
    }

    if matched {
        Ok(())
    } else {
        Err(ev.with_schema_path("type", |ev| {
            ev.error(ValidationErrorKind::TypeMismatch {
                instance: instance.clone(),
                expected: names.iter().map(|name| name.to_string()).collect(),
            })
        }))
    }
}

pub(crate) fn check_enum_const(
    ev: &mut Evaluation<'_>,
    schema: &Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    if let Some(Value::Array(allowed)) = schema.get("enum")
        && !allowed.iter().any(|candidate| json_equal(candidate, instance))
    {
        return Err(ev.with_schema_path("enum", |ev| {
            ev.error(ValidationErrorKind::EnumMismatch {
                instance: instance.clone(),
                allowed: allowed.clone(),
            })
        }));
    }

    if let Some(expected) = schema.get("const")
        && !json_equal(expected, instance)
    {
        return Err(ev.with_schema_path("const", |ev| {
            ev.error(ValidationErrorKind::ConstMismatch {
                instance: instance.clone(),
                expected: expected.clone(),
            })
        }));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Minimum(f64),
    Maximum(f64),
    ExclusiveMinimum(f64),
    ExclusiveMaximum(f64),
}

impl Bound {
    fn keyword(self) -> &'static str {
        match self {
            Bound::Minimum(_) => "minimum",
            Bound::Maximum(_) => "maximum",
            Bound::ExclusiveMinimum(_) => "exclusiveMinimum",
            Bound::ExclusiveMaximum(_) => "exclusiveMaximum",
        }
    }

    fn admits(self, value: f64) -> bool {
        match self {
            Bound::Minimum(min) => value >= min,
            Bound::Maximum(max) => value <= max,
            Bound::ExclusiveMinimum(min) => value > min,
            Bound::ExclusiveMaximum(max) => value < max,
        }
    }

    fn violation(self, value: f64) -> ValidationErrorKind {
        let (mut minimum, mut maximum, mut exclusive_minimum, mut exclusive_maximum) =
            (None, None, None, None);
        match self {
            Bound::Minimum(v) => minimum = Some(v),
            Bound::Maximum(v) => maximum = Some(v),
            Bound::ExclusiveMinimum(v) => exclusive_minimum = Some(v),
            Bound::ExclusiveMaximum(v) => exclusive_maximum = Some(v),
        }
        ValidationErrorKind::NumberOutOfRange {
            value,
            minimum,
            maximum,
            exclusive_minimum,
            exclusive_maximum,
        }
    }
}

/// Numeric bounds declared by a schema. 3.0 spells exclusivity as a boolean
/// modifier of `minimum` / `maximum`, 3.1 as a numeric bound of its own; both
/// spellings are understood.
fn numeric_bounds(schema: &Map<String, Value>) -> Vec<Bound> {
    let flag = |keyword: &str| schema.get(keyword).and_then(Value::as_bool) == Some(true);
    let number = |keyword: &str| schema.get(keyword).and_then(Value::as_f64);

    let mut bounds = Vec::new();
    if let Some(min) = number("minimum") {
        bounds.push(if flag("exclusiveMinimum") {
            Bound::ExclusiveMinimum(min)
        } else {
            Bound::Minimum(min)
        });
    }
    if let Some(max) = number("maximum") {
        bounds.push(if flag("exclusiveMaximum") {
            Bound::ExclusiveMaximum(max)
        } else {
            Bound::Maximum(max)
        });
    }
    if let Some(min) = number("exclusiveMinimum") {
        bounds.push(Bound::ExclusiveMinimum(min));
    }
    if let Some(max) = number("exclusiveMaximum") {
        bounds.push(Bound::ExclusiveMaximum(max));
    }
    bounds
}

fn is_multiple_of(instance: &Value, multiple_of: &Value) -> bool {
    // `i64::MIN % -1` overflows; that case falls through to the float path
    if let (Some(value), Some(divisor)) = (instance.as_i64(), multiple_of.as_i64())
        && let Some(remainder) = value.checked_rem(divisor)
    {
        return remainder == 0;
    }
    match (instance.as_f64(), multiple_of.as_f64()) {
        (Some(value), Some(divisor)) if divisor != 0.0 => {
            let quotient = value / divisor;
            quotient.is_finite() && (quotient - quotient.round()).abs() < 1e-9
        }
        _ => true,
    }
}

pub(crate) fn check_numeric(
    ev: &mut Evaluation<'_>,
    schema: &Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    let Some(value) = instance.as_f64() else {
        return Ok(());
    };

    for bound in numeric_bounds(schema) {
        if !bound.admits(value) {
            return Err(ev.with_schema_path(bound.keyword(), |ev| ev.error(bound.violation(value))));
        }
    }

    if let Some(multiple_of) = schema.get("multipleOf")
        && !is_multiple_of(instance, multiple_of)
    {
        return Err(ev.with_schema_path("multipleOf", |ev| {
            ev.error(ValidationErrorKind::NumberNotMultipleOf {
                value,
                multiple_of: multiple_of.as_f64().unwrap_or(f64::NAN),
            })
        }));
    }

    Ok(())
}

pub(crate) fn check_string(
    ev: &mut Evaluation<'_>,
    schema: &Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    let Value::String(s) = instance else {
        return Ok(());
    };
    // Length counts characters, not bytes
    let length = s.chars().count();

    if let Some(min) = usize_keyword(schema, "minLength")
        && length < min
    {
        return Err(ev.with_schema_path("minLength", |ev| {
            ev.error(ValidationErrorKind::StringLengthInvalid {
                instance: instance.clone(),
                min_length: Some(min),
                max_length: None,
            })
        }));
    }

    if let Some(max) = usize_keyword(schema, "maxLength")
        && length > max
    {
        return Err(ev.with_schema_path("maxLength", |ev| {
            ev.error(ValidationErrorKind::StringLengthInvalid {
                instance: instance.clone(),
                min_length: None,
                max_length: Some(max),
            })
        }));
    }

    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        let kind = match ev.document().pattern(pattern) {
            Ok(re) if re.is_match(s) => None,
            Ok(_) => Some(ValidationErrorKind::StringPatternMismatch {
                instance: instance.clone(),
                pattern: pattern.to_string(),
            }),
            // A broken regex is a defect of the schema, not of the instance
            Err(e) => Some(ValidationErrorKind::InvalidSchema {
                message: format!("Invalid regex pattern '{}': {}", pattern, e),
            }),
        };
        if let Some(kind) = kind {
            return Err(ev.with_schema_path("pattern", |ev| ev.error(kind)));
        }
    }

    Ok(())
}

/// `format` applies to every instance type; the checker decides which types
/// a format judges.
pub(crate) fn check_format(
    ev: &mut Evaluation<'_>,
    schema: &Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    let Some(format) = schema.get("format").and_then(Value::as_str) else {
        return Ok(());
    };
    if ev.formats().check(instance, format) {
        return Ok(());
    }
    Err(ev.with_schema_path("format", |ev| {
        ev.error(ValidationErrorKind::FormatMismatch {
            instance: instance.clone(),
            format: format.to_string(),
        })
    }))
}

pub(crate) fn check_array<'v>(
    ev: &mut Evaluation<'v>,
    schema: &'v Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    let Value::Array(items) = instance else {
        return Ok(());
    };

    if let Some(min) = usize_keyword(schema, "minItems")
        && items.len() < min
    {
        return Err(ev.with_schema_path("minItems", |ev| {
            ev.error(ValidationErrorKind::ArrayLengthInvalid {
                instance: instance.clone(),
                min_items: Some(min),
                max_items: None,
            })
        }));
    }

    if let Some(max) = usize_keyword(schema, "maxItems")
        && items.len() > max
    {
        return Err(ev.with_schema_path("maxItems", |ev| {
            ev.error(ValidationErrorKind::ArrayLengthInvalid {
                instance: instance.clone(),
                min_items: None,
                max_items: Some(max),
            })
        }));
    }

    if schema.get("uniqueItems").and_then(Value::as_bool) == Some(true) {
        let duplicate = items
            .iter()
            .enumerate()
            .any(|(i, item)| items[..i].iter().any(|earlier| json_equal(earlier, item)));
        if duplicate {
            return Err(ev.with_schema_path("uniqueItems", |ev| {
                ev.error(ValidationErrorKind::ArrayItemsNotUnique {
                    instance: instance.clone(),
                })
            }));
        }
    }

    // Positional schemas: `prefixItems` (3.1) or a draft-4 `items` array (3.0).
    // Whatever follows the positions is governed by `items` or
    // `additionalItems` respectively.
    let (positional, rest) = match (schema.get("prefixItems"), schema.get("items")) {
        (Some(Value::Array(prefix)), rest) => {
            (Some(("prefixItems", prefix)), rest.map(|r| ("items", r)))
        }
        (_, Some(Value::Array(tuple))) => (
            Some(("items", tuple)),
            schema.get("additionalItems").map(|r| ("additionalItems", r)),
        ),
        (_, rest) => (None, rest.map(|r| ("items", r))),
    };

    let mut start = 0;
    if let Some((keyword, positions)) = positional {
        ev.with_schema_path(keyword, |ev| {
            for (index, (position, item)) in positions.iter().zip(items).enumerate() {
                ev.with_schema_path(index.to_string(), |ev| {
                    ev.with_instance_path(PathSegment::Index(index), |ev| {
                        ev.evaluate(position, item)
                    })
                })?;
            }
            Ok(())
        })?;
        start = positions.len();
    }

    if let Some((keyword, rest)) = rest
        && items.len() > start
    {
        if rest == &Value::Bool(false) {
            return Err(ev.with_schema_path(keyword, |ev| {
                ev.error(ValidationErrorKind::ArityMismatch {
                    max_items: start,
                    found: items.len(),
                })
            }));
        }
        ev.with_schema_path(keyword, |ev| {
            for (index, item) in items.iter().enumerate().skip(start) {
                ev.with_instance_path(PathSegment::Index(index), |ev| ev.evaluate(rest, item))?;
            }
            Ok(())
        })?;
    }

    if let Some(contains) = schema.get("contains") {
        let matching = items.iter().filter(|item| ev.matches(contains, item)).count();
        let min_contains = usize_keyword(schema, "minContains").unwrap_or(1);
        let max_contains = usize_keyword(schema, "maxContains");
        if matching < min_contains {
            return Err(ev.with_schema_path("contains", |ev| {
                ev.error(ValidationErrorKind::ContainsMismatch {
                    instance: instance.clone(),
                    min_contains,
                    max_contains: None,
                })
            }));
        }
        if let Some(max) = max_contains
            && matching > max
        {
            return Err(ev.with_schema_path("maxContains", |ev| {
                ev.error(ValidationErrorKind::ContainsMismatch {
                    instance: instance.clone(),
                    min_contains,
                    max_contains: Some(max),
                })
            }));
        }
    }

    Ok(())
}

pub(crate) fn check_object<'v>(
    ev: &mut Evaluation<'v>,
    schema: &'v Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    let Value::Object(object) = instance else {
        return Ok(());
    };
    let properties = schema.get("properties").and_then(Value::as_object);
    let context = ev.context();
    let document = ev.document();
    // Absent properties without a schema are always required
    let visibility = |name: &str| match properties.and_then(|p| p.get(name)) {
        Some(property_schema) => property_visible(property_schema, context, document),
        None => Visibility::VISIBLE,
    };

    if let Some(Value::Array(required)) = schema.get("required") {
        for name in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) && visibility(name).enforce_required {
                return Err(ev.with_schema_path("required", |ev| {
                    ev.error(ValidationErrorKind::RequiredPropertyMissing {
                        property: name.to_string(),
                    })
                }));
            }
        }
    }

    if let Some(min) = usize_keyword(schema, "minProperties")
        && object.len() < min
    {
        return Err(ev.with_schema_path("minProperties", |ev| {
            ev.error(ValidationErrorKind::PropertyCountInvalid {
                instance: instance.clone(),
                min_properties: Some(min),
                max_properties: None,
            })
        }));
    }

    if let Some(max) = usize_keyword(schema, "maxProperties")
        && object.len() > max
    {
        return Err(ev.with_schema_path("maxProperties", |ev| {
            ev.error(ValidationErrorKind::PropertyCountInvalid {
                instance: instance.clone(),
                min_properties: None,
                max_properties: Some(max),
            })
        }));
    }

    if let Some(Value::Object(dependencies)) = schema.get("dependentRequired") {
        for (property, needed) in dependencies {
            if !object.contains_key(property) {
                continue;
            }
            let missing = needed
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .find(|dependency| !object.contains_key(*dependency));
            if let Some(dependency) = missing {
                return Err(ev.with_schema_path("dependentRequired", |ev| {
                    ev.error(ValidationErrorKind::DependentRequiredMissing {
                        property: property.clone(),
                        dependency: dependency.to_string(),
                    })
                }));
            }
        }
    }

    if let Some(names_schema) = schema.get("propertyNames") {
        ev.with_schema_path("propertyNames", |ev| {
            for key in object.keys() {
                let name = Value::String(key.clone());
                ev.with_instance_path(PathSegment::Key(key.clone()), |ev| {
                    ev.evaluate(names_schema, &name)
                })?;
            }
            Ok(())
        })?;
    }

    if let Some(properties) = properties {
        ev.with_schema_path("properties", |ev| {
            for (name, property_schema) in properties {
                let Some(value) = object.get(name) else {
                    continue;
                };
                ev.with_schema_path(name.clone(), |ev| {
                    ev.with_instance_path(PathSegment::Key(name.clone()), |ev| {
                        if !visibility(name).visible {
                            return Err(ev.error(context.violation(value)));
                        }
                        ev.evaluate(property_schema, value)
                    })
                })?;
            }
            Ok(())
        })?;
    }

    let mut patterns = Vec::new();
    if let Some(Value::Object(pattern_properties)) = schema.get("patternProperties") {
        for (source, pattern_schema) in pattern_properties {
            match ev.document().pattern(source) {
                Ok(re) => patterns.push((re, source, pattern_schema)),
                Err(e) => {
                    return Err(ev.with_schema_path("patternProperties", |ev| {
                        ev.error(ValidationErrorKind::InvalidSchema {
                            message: format!("Invalid regex pattern '{}': {}", source, e),
                        })
                    }));
                }
            }
        }
        ev.with_schema_path("patternProperties", |ev| {
            for (re, source, pattern_schema) in &patterns {
                for (key, value) in object.iter().filter(|(key, _)| re.is_match(key)) {
                    ev.with_schema_path(source.as_str(), |ev| {
                        ev.with_instance_path(PathSegment::Key(key.clone()), |ev| {
                            ev.evaluate(*pattern_schema, value)
                        })
                    })?;
                }
            }
            Ok(())
        })?;
    }

    if let Some(additional) = schema.get("additionalProperties") {
        let extras: Vec<(&String, &Value)> = object
            .iter()
            .filter(|(key, _)| !properties.is_some_and(|p| p.contains_key(key.as_str())))
            .filter(|(key, _)| !patterns.iter().any(|(re, _, _)| re.is_match(key)))
            .collect();

        if additional == &Value::Bool(false) {
            if !extras.is_empty() {
                return Err(ev.with_schema_path("additionalProperties", |ev| {
                    ev.error(ValidationErrorKind::AdditionalPropertyNotAllowed {
                        unexpected: extras.iter().map(|(key, _)| key.to_string()).collect(),
                    })
                }));
            }
        } else {
            ev.with_schema_path("additionalProperties", |ev| {
                for (key, value) in &extras {
                    ev.with_instance_path(PathSegment::Key(key.to_string()), |ev| {
                        ev.evaluate(additional, value)
                    })?;
                }
                Ok(())
            })?;
        }
    }

    Ok(())
}
