// Error types for OpenAPI schema validation

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while building a validator
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// Both read and write contexts were requested
    #[error("read and write contexts are mutually exclusive")]
    ConflictingContext,

    /// The schema document root is neither an object nor a boolean
    #[error("schema must be an object or a boolean, got {0}")]
    InvalidRoot(&'static str),

    /// The configured entry reference does not point into the document
    #[error("entry reference '{0}' could not be resolved")]
    UnresolvedEntry(String),

    /// Unrecognized dialect name
    #[error("unknown OpenAPI dialect '{0}' (expected 3.0 or 3.1)")]
    UnknownDialect(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// Instance does not match the declared `type`
    TypeMismatch {
        instance: Value,
        expected: Vec<String>,
    },

    /// Null rejected by the nullable gate
    NullNotAllowed,

    /// Missing required property
    RequiredPropertyMissing { property: String },

    /// readOnly property present under a write context
    ReadOnlyViolation { value: Value },

    /// writeOnly property present under a read context
    WriteOnlyViolation { value: Value },

    /// Properties not allowed by `additionalProperties: false`
    AdditionalPropertyNotAllowed { unexpected: Vec<String> },

    /// No `anyOf` / `oneOf` branch accepted the instance
    NoBranchMatched { instance: Value },

    /// More than one `oneOf` branch accepted the instance
    MultipleBranchesMatched {
        instance: Value,
        matched: Vec<usize>,
    },

    /// The `not` subschema accepted the instance
    NotMatched { instance: Value, schema: Value },

    /// Object lacks the discriminating property
    DiscriminatorPropertyMissing { instance: Value, property: String },

    /// Discriminator value maps to a reference that does not resolve
    DiscriminatorUnresolvable { reference: String },

    /// Value rejected by a format check
    FormatMismatch { instance: Value, format: String },

    /// Tuple-typed array has more items than positions allow
    ArityMismatch { max_items: usize, found: usize },

    /// Value not in enum
    EnumMismatch { instance: Value, allowed: Vec<Value> },

    /// Value differs from `const`
    ConstMismatch { instance: Value, expected: Value },

    /// Number out of range
    NumberOutOfRange {
        value: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
        exclusive_minimum: Option<f64>,
        exclusive_maximum: Option<f64>,
    },

    /// Number not a multiple of
    NumberNotMultipleOf { value: f64, multiple_of: f64 },

    /// String length invalid
    StringLengthInvalid {
        instance: Value,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },

    /// String doesn't match pattern
    StringPatternMismatch { instance: Value, pattern: String },

    /// Array length invalid
    ArrayLengthInvalid {
        instance: Value,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },

    /// Array items not unique
    ArrayItemsNotUnique { instance: Value },

    /// Number of items matching `contains` out of bounds
    ContainsMismatch {
        instance: Value,
        min_contains: usize,
        max_contains: Option<usize>,
    },

    /// Object property count invalid
    PropertyCountInvalid {
        instance: Value,
        min_properties: Option<usize>,
        max_properties: Option<usize>,
    },

    /// Property required by `dependentRequired` is missing
    DependentRequiredMissing { property: String, dependency: String },

    /// The `false` schema never accepts anything
    FalseSchema { instance: Value },

    /// Unresolved schema reference
    UnresolvedReference { reference: String },

    /// The schema itself is malformed at this location
    InvalidSchema { message: String },
}

impl ValidationErrorKind {
    /// Get the error code for this error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationErrorKind::RequiredPropertyMissing { .. } => "O-1-10",
            ValidationErrorKind::TypeMismatch { .. } => "O-1-11",
            ValidationErrorKind::EnumMismatch { .. }
            | ValidationErrorKind::ConstMismatch { .. } => "O-1-12",
            ValidationErrorKind::ArrayLengthInvalid { .. }
            | ValidationErrorKind::ContainsMismatch { .. } => "O-1-13",
            ValidationErrorKind::StringPatternMismatch { .. } => "O-1-14",
            ValidationErrorKind::NumberOutOfRange { .. }
            | ValidationErrorKind::NumberNotMultipleOf { .. } => "O-1-15",
            ValidationErrorKind::PropertyCountInvalid { .. } => "O-1-16",
            ValidationErrorKind::UnresolvedReference { .. } => "O-1-17",
            ValidationErrorKind::AdditionalPropertyNotAllowed { .. } => "O-1-18",
            ValidationErrorKind::ArrayItemsNotUnique { .. } => "O-1-19",
            ValidationErrorKind::StringLengthInvalid { .. } => "O-1-20",
            ValidationErrorKind::NullNotAllowed => "O-1-21",
            ValidationErrorKind::ReadOnlyViolation { .. } => "O-1-22",
            ValidationErrorKind::WriteOnlyViolation { .. } => "O-1-23",
            ValidationErrorKind::NoBranchMatched { .. }
            | ValidationErrorKind::MultipleBranchesMatched { .. }
            | ValidationErrorKind::NotMatched { .. } => "O-1-24",
            ValidationErrorKind::DiscriminatorPropertyMissing { .. } => "O-1-25",
            ValidationErrorKind::DiscriminatorUnresolvable { .. } => "O-1-26",
            ValidationErrorKind::FormatMismatch { .. } => "O-1-27",
            ValidationErrorKind::ArityMismatch { .. } => "O-1-28",
            ValidationErrorKind::DependentRequiredMissing { .. } => "O-1-29",
            ValidationErrorKind::FalseSchema { .. } => "O-1-30",
            ValidationErrorKind::InvalidSchema { .. } => "O-1-99",
        }
    }

    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            ValidationErrorKind::TypeMismatch { instance, expected } => {
                let expected: Vec<String> = expected.iter().map(|t| format!("\"{}\"", t)).collect();
                format!("{} is not of type {}", instance, expected.join(", "))
            }
            ValidationErrorKind::NullNotAllowed => "None for not nullable".to_string(),
            ValidationErrorKind::RequiredPropertyMissing { property } => {
                format!("\"{}\" is a required property", property)
            }
            ValidationErrorKind::ReadOnlyViolation { value } => {
                format!("Tried to write read-only property with {}", plain(value))
            }
            ValidationErrorKind::WriteOnlyViolation { value } => {
                format!("Tried to read write-only property with {}", plain(value))
            }
            ValidationErrorKind::AdditionalPropertyNotAllowed { unexpected } => {
                let quoted: Vec<String> = unexpected.iter().map(|p| format!("\"{}\"", p)).collect();
                let verb = if unexpected.len() == 1 { "was" } else { "were" };
                format!(
                    "Additional properties are not allowed ({} {} unexpected)",
                    quoted.join(", "),
                    verb
                )
            }
            ValidationErrorKind::NoBranchMatched { instance } => {
                format!("{} is not valid under any of the given schemas", instance)
            }
            ValidationErrorKind::MultipleBranchesMatched { instance, .. } => {
                format!("{} is valid under more than one schema", instance)
            }
            ValidationErrorKind::NotMatched { instance, schema } => {
                format!("{} should not be valid under {}", instance, schema)
            }
            ValidationErrorKind::DiscriminatorPropertyMissing { instance, property } => {
                format!(
                    "{} does not contain discriminating property '{}'",
                    instance, property
                )
            }
            ValidationErrorKind::DiscriminatorUnresolvable { reference }
            | ValidationErrorKind::UnresolvedReference { reference } => {
                format!("reference '{}' could not be resolved", reference)
            }
            ValidationErrorKind::FormatMismatch { instance, format } => {
                format!("{} is not a '{}'", instance, format)
            }
            ValidationErrorKind::ArityMismatch { max_items, found } => {
                format!("Expected at most {} items, but found {}", max_items, found)
            }
            ValidationErrorKind::EnumMismatch { instance, allowed } => {
                format!("{} is not one of {}", instance, Value::Array(allowed.clone()))
            }
            ValidationErrorKind::ConstMismatch { instance, expected } => {
                format!("{} was expected, got {}", expected, instance)
            }
            ValidationErrorKind::NumberOutOfRange {
                value,
                minimum,
                maximum,
                exclusive_minimum,
                exclusive_maximum,
            } => {
                if let Some(min) = minimum {
                    format!("{} is less than the minimum of {}", value, min)
                } else if let Some(max) = maximum {
                    format!("{} is greater than the maximum of {}", value, max)
                } else if let Some(min) = exclusive_minimum {
                    format!("{} is less than or equal to the minimum of {}", value, min)
                } else if let Some(max) = exclusive_maximum {
                    format!("{} is greater than or equal to the maximum of {}", value, max)
                } else {
                    format!("{} is out of range", value)
                }
            }
            ValidationErrorKind::NumberNotMultipleOf { value, multiple_of } => {
                format!("{} is not a multiple of {}", value, multiple_of)
            }
            ValidationErrorKind::StringLengthInvalid {
                instance,
                min_length,
                ..
            } => {
                if min_length.is_some() {
                    format!("{} is too short", instance)
                } else {
                    format!("{} is too long", instance)
                }
            }
            ValidationErrorKind::StringPatternMismatch { instance, pattern } => {
                format!("{} does not match \"{}\"", instance, pattern)
            }
            ValidationErrorKind::ArrayLengthInvalid {
                instance,
                min_items,
                ..
            } => {
                if min_items.is_some() {
                    format!("{} is too short", instance)
                } else {
                    format!("{} is too long", instance)
                }
            }
            ValidationErrorKind::ArrayItemsNotUnique { instance } => {
                format!("{} has non-unique elements", instance)
            }
            ValidationErrorKind::ContainsMismatch {
                instance,
                max_contains,
                ..
            } => match max_contains {
                Some(max) => format!(
                    "{} contains more than {} items matching the given schema",
                    instance, max
                ),
                None => format!(
                    "{} does not contain enough items matching the given schema",
                    instance
                ),
            },
            ValidationErrorKind::PropertyCountInvalid {
                instance,
                min_properties,
                ..
            } => {
                if min_properties.is_some() {
                    format!("{} does not have enough properties", instance)
                } else {
                    format!("{} has too many properties", instance)
                }
            }
            ValidationErrorKind::DependentRequiredMissing {
                property,
                dependency,
            } => {
                format!("\"{}\" is a dependency of \"{}\"", dependency, property)
            }
            ValidationErrorKind::FalseSchema { instance } => {
                format!("False schema does not allow {}", instance)
            }
            ValidationErrorKind::InvalidSchema { message } => message.clone(),
        }
    }
}

/// Strings render without quotes, everything else as compact JSON
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validation error with instance and schema location
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub struct ValidationError {
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Instance path where the error occurred (e.g., ["pets", 0, "name"])
    pub instance_path: InstancePath,
    /// Schema path that failed (e.g., ["properties", "pets", "items", "$ref"])
    pub schema_path: SchemaPath,
    /// Branch errors for combinator failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ValidationError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation error at {}: {}",
            self.instance_path,
            self.kind.message()
        )
    }
}

impl ValidationError {
    /// Create a new validation error with a structured kind
    pub fn new(kind: ValidationErrorKind, instance_path: InstancePath) -> Self {
        Self {
            kind,
            instance_path,
            schema_path: SchemaPath::new(),
            context: Vec::new(),
        }
    }

    /// Get the human-readable message for this error
    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// Set the schema path for this error
    pub fn with_schema_path(mut self, schema_path: SchemaPath) -> Self {
        self.schema_path = schema_path;
        self
    }

    /// Attach nested branch errors
    pub fn with_context(mut self, context: Vec<ValidationError>) -> Self {
        self.context = context;
        self
    }
}

/// Instance path (e.g., ["pets", 0, "name"])
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// Create a new empty instance path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a key segment onto the path
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    /// Push an index segment onto the path
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Render the path as a JSON Pointer (RFC 6901)
    pub fn to_pointer(&self) -> String {
        let mut pointer = String::new();
        for segment in &self.segments {
            pointer.push('/');
            match segment {
                PathSegment::Key(key) => {
                    pointer.push_str(&key.replace('~', "~0").replace('/', "~1"))
                }
                PathSegment::Index(index) => pointer.push_str(&index.to_string()),
            }
        }
        pointer
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            for (i, segment) in self.segments.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{}", segment)?;
            }
            Ok(())
        }
    }
}

/// Schema path (e.g., ["properties", "pets", "items", "$ref"])
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SchemaPath {
    segments: Vec<String>,
}

impl SchemaPath {
    /// Create a new empty schema path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a segment onto the path
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.segments.join(" > "))
        }
    }
}

/// A segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}
