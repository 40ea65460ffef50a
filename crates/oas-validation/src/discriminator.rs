//! Discriminator-based schema selection.
//!
//! For an object instance, the value of the discriminating property picks one
//! concrete schema: an explicit `mapping` entry first, otherwise the implicit
//! reference `#/components/schemas/<value>`. Resolution failures are
//! validation errors; errors from the selected schema propagate unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::document::SchemaDocument;
use crate::error::{ValidationErrorKind, ValidationResult};
use crate::validator::Evaluation;

/// Prefix of implicit discriminator references
pub const IMPLICIT_SCHEMA_BASE: &str = "#/components/schemas/";

/// The `discriminator` keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    pub property_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, String>>,
}

impl Discriminator {
    /// Reference selected by a discriminator value. Mapping values that are
    /// bare schema names are read as component names.
    pub fn reference_for(&self, value: &str) -> String {
        let target = self
            .mapping
            .as_ref()
            .and_then(|mapping| mapping.get(value))
            .map_or(value, String::as_str);
        if target.starts_with('#') {
            target.to_string()
        } else {
            format!("{}{}", IMPLICIT_SCHEMA_BASE, target)
        }
    }
}

/// The discriminating value as a lookup key. Absent and empty values
/// (`null`, `false`, `0`, `""`, `[]`, `{}`) count as missing.
fn discriminating_value(instance: &Value, property: &str) -> Option<String> {
    match instance.get(property)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Pick the schema for `instance`, returning the reference used and the
/// schema it points at.
pub fn resolve<'d>(
    discriminator: &Discriminator,
    instance: &Value,
    document: &'d SchemaDocument,
) -> Result<(String, &'d Value), ValidationErrorKind> {
    let Some(value) = discriminating_value(instance, &discriminator.property_name) else {
        return Err(ValidationErrorKind::DiscriminatorPropertyMissing {
            instance: instance.clone(),
            property: discriminator.property_name.clone(),
        });
    };
    let reference = discriminator.reference_for(&value);
    match document.resolve(&reference) {
        Some(schema) => Ok((reference, schema)),
        None => Err(ValidationErrorKind::DiscriminatorUnresolvable { reference }),
    }
}

/// Validate an object instance against the schema its discriminator selects
pub(crate) fn apply<'v>(
    ev: &mut Evaluation<'v>,
    raw: &'v Value,
    instance: &Value,
) -> ValidationResult<()> {
    let discriminator = match Discriminator::deserialize(raw) {
        Ok(discriminator) => discriminator,
        Err(e) => {
            return Err(ev.error(ValidationErrorKind::InvalidSchema {
                message: format!("Invalid discriminator: {}", e),
            }));
        }
    };

    match resolve(&discriminator, instance, ev.document()) {
        Ok((reference, schema)) => {
            tracing::debug!(
                property = %discriminator.property_name,
                reference = %reference,
                "discriminator selected schema"
            );
            ev.evaluate_target(schema, instance)
        }
        Err(kind) => Err(ev.error(kind)),
    }
}
