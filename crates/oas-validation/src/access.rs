//! Read/write context filtering for `readOnly` and `writeOnly` properties.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::SchemaDocument;
use crate::error::{BuildError, ValidationErrorKind};

/// Whether instances are validated as requests (write), responses (read),
/// or without either reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationContext {
    /// `readOnly` / `writeOnly` are ignored
    #[default]
    Unspecified,
    /// Response bodies: `writeOnly` properties must be absent
    Read,
    /// Request bodies: `readOnly` properties must be absent
    Write,
}

impl ValidationContext {
    /// Build a context from independent read/write flags.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ConflictingContext`] when both flags are set.
    pub fn from_flags(read: bool, write: bool) -> Result<Self, BuildError> {
        match (read, write) {
            (true, true) => Err(BuildError::ConflictingContext),
            (true, false) => Ok(ValidationContext::Read),
            (false, true) => Ok(ValidationContext::Write),
            (false, false) => Ok(ValidationContext::Unspecified),
        }
    }

    pub fn is_read(self) -> bool {
        self == ValidationContext::Read
    }

    pub fn is_write(self) -> bool {
        self == ValidationContext::Write
    }

    /// Error reported when a hidden property is present anyway
    pub(crate) fn violation(self, value: &Value) -> ValidationErrorKind {
        match self {
            ValidationContext::Read => ValidationErrorKind::WriteOnlyViolation {
                value: value.clone(),
            },
            _ => ValidationErrorKind::ReadOnlyViolation {
                value: value.clone(),
            },
        }
    }
}

/// How a property participates in validation under a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    /// The property may appear in the instance
    pub visible: bool,
    /// The property is kept in the `required` set
    pub enforce_required: bool,
}

impl Visibility {
    pub const VISIBLE: Visibility = Visibility {
        visible: true,
        enforce_required: true,
    };

    pub const HIDDEN: Visibility = Visibility {
        visible: false,
        enforce_required: false,
    };
}

#[derive(Debug, Default, Clone, Copy)]
struct AccessMarkers {
    read_only: bool,
    write_only: bool,
}

/// Markers of a property schema. A `$ref` is followed when the node itself
/// carries neither marker.
fn access_markers(property_schema: &Value, document: &SchemaDocument) -> AccessMarkers {
    let mut node = property_schema;
    let mut visited: Vec<&str> = Vec::new();
    loop {
        let Some(schema) = node.as_object() else {
            return AccessMarkers::default();
        };
        let read_only = schema.get("readOnly").and_then(Value::as_bool);
        let write_only = schema.get("writeOnly").and_then(Value::as_bool);
        if read_only.is_some() || write_only.is_some() {
            return AccessMarkers {
                read_only: read_only.unwrap_or(false),
                write_only: write_only.unwrap_or(false),
            };
        }
        let Some(reference) = schema.get("$ref").and_then(Value::as_str) else {
            return AccessMarkers::default();
        };
        if visited.contains(&reference) {
            return AccessMarkers::default();
        }
        visited.push(reference);
        match document.resolve(reference) {
            Some(target) => node = target,
            None => return AccessMarkers::default(),
        }
    }
}

/// Decide whether a property is visible and required-enforced under `context`.
///
/// - write + `readOnly`: hidden, not required
/// - read + `writeOnly`: hidden, not required
/// - no context: markers are ignored
pub fn property_visible(
    property_schema: &Value,
    context: ValidationContext,
    document: &SchemaDocument,
) -> Visibility {
    if context == ValidationContext::Unspecified {
        return Visibility::VISIBLE;
    }
    let markers = access_markers(property_schema, document);
    let hidden = (context.is_write() && markers.read_only)
        || (context.is_read() && markers.write_only);
    if hidden {
        Visibility::HIDDEN
    } else {
        Visibility::VISIBLE
    }
}
