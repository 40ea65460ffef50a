//! Type and null acceptance rules.
//!
//! Null handling is the main place where the two dialects disagree:
//!
//! - OAS 3.1: a node accepts null iff it has no `type`, or its `type`
//!   (string or array) lists `"null"`.
//! - OAS 3.0: a node accepts null iff it has no `type` at all, or it has a
//!   `type` together with `nullable: true`. An `enum` listing `null` does not
//!   open the gate; it only matters once the gate is already open.
//!
//! The rule is always applied to the node being evaluated. A `{"$ref": ...}`
//! node has no `type`, so it defers to the referenced schema, and each
//! combinator branch is gated on its own.

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::dialect::Dialect;

/// JSON Schema primitive type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl SchemaType {
    pub fn name(self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Boolean => "boolean",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::String => "string",
        }
    }

    /// Whether `instance` is of this type. Integral floats count as integers.
    pub fn matches(self, instance: &Value) -> bool {
        match self {
            SchemaType::Null => instance.is_null(),
            SchemaType::Boolean => instance.is_boolean(),
            SchemaType::Object => instance.is_object(),
            SchemaType::Array => instance.is_array(),
            SchemaType::Number => instance.is_number(),
            SchemaType::Integer => is_integer(instance),
            SchemaType::String => instance.is_string(),
        }
    }

    /// The most specific type of a value
    pub fn of(instance: &Value) -> Self {
        match instance {
            Value::Null => SchemaType::Null,
            Value::Bool(_) => SchemaType::Boolean,
            Value::Object(_) => SchemaType::Object,
            Value::Array(_) => SchemaType::Array,
            Value::String(_) => SchemaType::String,
            Value::Number(_) if is_integer(instance) => SchemaType::Integer,
            Value::Number(_) => SchemaType::Number,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(SchemaType::Null),
            "boolean" => Ok(SchemaType::Boolean),
            "object" => Ok(SchemaType::Object),
            "array" => Ok(SchemaType::Array),
            "number" => Ok(SchemaType::Number),
            "integer" => Ok(SchemaType::Integer),
            "string" => Ok(SchemaType::String),
            other => Err(format!("unknown type '{}'", other)),
        }
    }
}

pub(crate) fn is_integer(instance: &Value) -> bool {
    match instance {
        Value::Number(n) => {
            n.is_i64()
                || n.is_u64()
                || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

/// Type names declared by a `type` keyword value (string or array of strings)
pub(crate) fn declared_type_names(ty: &Value) -> Vec<&str> {
    match ty {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn is_nullable(schema: &Map<String, Value>) -> bool {
    schema.get("nullable").and_then(Value::as_bool).unwrap_or(false)
}

/// Decide whether `node` accepts a null instance under `dialect`.
///
/// Boolean schemas are left to the caller: `true` accepts and `false`
/// rejects everything, null included.
pub fn accepts_null(node: &Value, dialect: Dialect) -> bool {
    let Some(schema) = node.as_object() else {
        return true;
    };
    let Some(ty) = schema.get("type") else {
        return true;
    };
    match dialect {
        Dialect::Oas31 => declared_type_names(ty).contains(&"null"),
        Dialect::Oas30 => is_nullable(schema),
    }
}

/// Whether the `type` keyword is skipped for this instance.
///
/// In OAS 3.0 a null that passed the gate through `nullable: true` must not
/// then fail `type: integer`; the remaining keywords (`enum` in particular)
/// still run.
pub(crate) fn skips_type_check(
    schema: &Map<String, Value>,
    instance: &Value,
    dialect: Dialect,
) -> bool {
    dialect == Dialect::Oas30 && instance.is_null() && is_nullable(schema)
}
