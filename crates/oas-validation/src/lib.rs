//! # oas-validation
//!
//! Validation of JSON values against OpenAPI 3.0 and 3.1 schemas.
//!
//! On top of ordinary JSON Schema keywords this crate implements the OpenAPI
//! extensions and their interplay with combinators and `$ref`:
//!
//! - `nullable` (3.0) and `type` arrays containing `"null"` (3.1), decided per
//!   schema node and never inherited across `$ref` or combinator branches
//! - `readOnly` / `writeOnly` filtering under a read or write context
//! - `discriminator` selection of a concrete schema
//! - a per-dialect format registry with pluggable date-time strategies
//!
//! ## Example
//!
//! ```rust
//! use oas_validation::{OasValidator, ValidationContext, ValidatorOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["id", "name"],
//!     "properties": {
//!         "id": {"type": "integer", "readOnly": true},
//!         "name": {"type": "string", "nullable": true}
//!     }
//! });
//!
//! let options = ValidatorOptions::oas30().with_context(ValidationContext::Write);
//! let validator = OasValidator::new(schema, options).unwrap();
//!
//! // `id` is read-only, so a request body may omit it
//! assert!(validator.validate(&json!({"name": null})).is_ok());
//!
//! let err = validator.validate(&json!({"id": 1, "name": "Rex"})).unwrap_err();
//! assert_eq!(err.message(), "Tried to write read-only property with 1");
//! ```

pub mod access;
pub mod combinators;
pub mod dialect;
pub mod discriminator;
pub mod document;
pub mod error;
pub mod format;
mod keywords;
pub mod nullable;
pub mod options;
pub mod validator;

pub use access::{ValidationContext, Visibility, property_visible};
pub use combinators::Combinator;
pub use dialect::Dialect;
pub use discriminator::Discriminator;
pub use document::SchemaDocument;
pub use error::{
    BuildError, InstancePath, PathSegment, SchemaPath, ValidationError, ValidationErrorKind,
    ValidationResult,
};
pub use format::{DateTimeStrategy, FormatCheck, FormatChecker, FormatConfig, FormatRegistry};
pub use nullable::{SchemaType, accepts_null};
pub use options::ValidatorOptions;
pub use validator::OasValidator;
