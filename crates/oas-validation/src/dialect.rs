//! OpenAPI dialect selection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

/// The OpenAPI keyword variant in force for a validator.
///
/// 3.0 expresses nullability with the `nullable` keyword and follows draft-4
/// `$ref` rules (siblings of `$ref` are ignored). 3.1 uses a `type` array
/// containing `"null"` and evaluates `$ref` alongside its siblings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "3.0", alias = "oas30")]
    Oas30,
    #[default]
    #[serde(rename = "3.1", alias = "oas31")]
    Oas31,
}

impl Dialect {
    /// Short version label ("3.0" or "3.1")
    pub fn version(self) -> &'static str {
        match self {
            Dialect::Oas30 => "3.0",
            Dialect::Oas31 => "3.1",
        }
    }

    /// Map an `openapi` version string such as "3.0.3" to a dialect
    pub fn from_openapi_version(version: &str) -> Option<Self> {
        if version == "3.0" || version.starts_with("3.0.") {
            Some(Dialect::Oas30)
        } else if version == "3.1" || version.starts_with("3.1.") {
            Some(Dialect::Oas31)
        } else {
            None
        }
    }

    /// Detect the dialect from a full OpenAPI document's `openapi` field
    pub fn detect(document: &Value) -> Option<Self> {
        document
            .get("openapi")
            .and_then(Value::as_str)
            .and_then(Self::from_openapi_version)
    }

    /// Whether keywords next to `$ref` are evaluated
    pub(crate) fn evaluates_ref_siblings(self) -> bool {
        matches!(self, Dialect::Oas31)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OAS {}", self.version())
    }
}

impl FromStr for Dialect {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "3.0" | "oas30" | "oas3.0" => Ok(Dialect::Oas30),
            "3.1" | "oas31" | "oas3.1" => Ok(Dialect::Oas31),
            other => Self::from_openapi_version(other)
                .ok_or_else(|| BuildError::UnknownDialect(s.to_string())),
        }
    }
}
