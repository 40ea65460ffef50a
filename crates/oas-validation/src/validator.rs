// OpenAPI schema validation engine

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::access::ValidationContext;
use crate::combinators;
use crate::dialect::Dialect;
use crate::document::SchemaDocument;
use crate::error::{
    BuildError, InstancePath, PathSegment, SchemaPath, ValidationError, ValidationErrorKind,
    ValidationResult,
};
use crate::format::{FormatChecker, FormatRegistry};
use crate::keywords;
use crate::nullable::{self, SchemaType, declared_type_names};
use crate::options::ValidatorOptions;

const ROOT_REFERENCE: &str = "#";

/// A validator bound to one schema document, dialect, context and format
/// checker. Build it once and reuse it; `validate` takes `&self` and keeps
/// all per-call state on the stack, so a validator can be shared across
/// threads.
pub struct OasValidator {
    document: SchemaDocument,
    entry: String,
    dialect: Dialect,
    context: ValidationContext,
    formats: Arc<dyn FormatChecker>,
}

impl fmt::Debug for OasValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OasValidator")
            .field("entry", &self.entry)
            .field("dialect", &self.dialect)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl OasValidator {
    /// Build a validator for `schema`.
    ///
    /// # Errors
    ///
    /// Fails when the schema root (or the configured entry) is not an object
    /// or boolean schema, or when the entry reference does not resolve.
    pub fn new(schema: Value, options: ValidatorOptions) -> Result<Self, BuildError> {
        if !is_schema(&schema) {
            return Err(BuildError::InvalidRoot(SchemaType::of(&schema).name()));
        }
        let document = SchemaDocument::new(schema);
        let entry = options
            .entry
            .unwrap_or_else(|| ROOT_REFERENCE.to_string());
        match document.resolve(&entry) {
            None => return Err(BuildError::UnresolvedEntry(entry)),
            Some(node) if !is_schema(node) => {
                return Err(BuildError::InvalidRoot(SchemaType::of(node).name()));
            }
            Some(_) => {}
        }

        tracing::debug!(
            dialect = %options.dialect,
            context = ?options.context,
            entry = %entry,
            "built OpenAPI schema validator"
        );

        let formats = FormatRegistry::for_dialect(options.dialect, &options.formats);
        Ok(Self {
            document,
            entry,
            dialect: options.dialect,
            context: options.context,
            formats: Arc::new(formats),
        })
    }

    /// OpenAPI 3.0 validator with default options
    pub fn oas30(schema: Value) -> Result<Self, BuildError> {
        Self::new(schema, ValidatorOptions::oas30())
    }

    /// OpenAPI 3.1 validator with default options
    pub fn oas31(schema: Value) -> Result<Self, BuildError> {
        Self::new(schema, ValidatorOptions::oas31())
    }

    /// Replace the dialect's format registry with a custom checker
    pub fn with_format_checker(mut self, checker: impl FormatChecker + 'static) -> Self {
        self.formats = Arc::new(checker);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn context(&self) -> ValidationContext {
        self.context
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    /// Reference of the schema instances are validated against
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Validate an instance, returning the first error encountered
    pub fn validate(&self, instance: &Value) -> ValidationResult<()> {
        let mut evaluation = Evaluation::new(self);
        match self.document.resolve(&self.entry) {
            Some(schema) => evaluation.evaluate_target(schema, instance),
            None => Err(evaluation.error(ValidationErrorKind::UnresolvedReference {
                reference: self.entry.clone(),
            })),
        }
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validate(instance).is_ok()
    }
}

fn is_schema(node: &Value) -> bool {
    node.is_object() || node.is_boolean()
}

/// Per-call evaluation state: current paths and the stack of schema targets
/// entered through `$ref` or a discriminator.
pub(crate) struct Evaluation<'v> {
    validator: &'v OasValidator,
    instance_path: InstancePath,
    schema_path: SchemaPath,
    /// (target schema, instance) pairs currently being evaluated, compared by
    /// address only
    active: Vec<(*const Value, *const Value)>,
}

impl<'v> Evaluation<'v> {
    fn new(validator: &'v OasValidator) -> Self {
        Self {
            validator,
            instance_path: InstancePath::new(),
            schema_path: SchemaPath::new(),
            active: Vec::new(),
        }
    }

    pub(crate) fn document(&self) -> &'v SchemaDocument {
        &self.validator.document
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.validator.dialect
    }

    pub(crate) fn context(&self) -> ValidationContext {
        self.validator.context
    }

    pub(crate) fn formats(&self) -> &'v dyn FormatChecker {
        self.validator.formats.as_ref()
    }

    /// Build an error located at the current paths
    pub(crate) fn error(&self, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(kind, self.instance_path.clone())
            .with_schema_path(self.schema_path.clone())
    }

    /// Execute a function with a new instance path segment
    pub(crate) fn with_instance_path<F, R>(&mut self, segment: PathSegment, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.instance_path.push(segment);
        let result = f(self);
        self.instance_path.pop();
        result
    }

    /// Execute a function with a new schema path segment
    pub(crate) fn with_schema_path<F, R>(&mut self, segment: impl Into<String>, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.schema_path.push(segment);
        let result = f(self);
        self.schema_path.pop();
        result
    }

    /// Evaluate `instance` against a schema node
    pub(crate) fn evaluate(&mut self, node: &'v Value, instance: &Value) -> ValidationResult<()> {
        match node {
            Value::Bool(true) => Ok(()),
            Value::Bool(false) => Err(self.error(ValidationErrorKind::FalseSchema {
                instance: instance.clone(),
            })),
            Value::Object(schema) => self.evaluate_schema(node, schema, instance),
            other => Err(self.error(ValidationErrorKind::InvalidSchema {
                message: format!(
                    "schema must be an object or a boolean, got {}",
                    SchemaType::of(other)
                ),
            })),
        }
    }

    /// Evaluate a schema reached through indirection. Re-entering a target
    /// that is already being evaluated for the same instance node succeeds.
    pub(crate) fn evaluate_target(
        &mut self,
        target: &'v Value,
        instance: &Value,
    ) -> ValidationResult<()> {
        let key = (target as *const Value, instance as *const Value);
        if self.active.contains(&key) {
            tracing::trace!(path = %self.schema_path, "schema re-entered for the same instance");
            return Ok(());
        }
        self.active.push(key);
        let result = self.evaluate(target, instance);
        self.active.pop();
        result
    }

    /// Whether `instance` satisfies `node`, without reporting
    pub(crate) fn matches(&mut self, node: &'v Value, instance: &Value) -> bool {
        self.evaluate(node, instance).is_ok()
    }

    fn follow_ref(&mut self, reference: &str, instance: &Value) -> ValidationResult<()> {
        match self.document().resolve(reference) {
            Some(target) => self.evaluate_target(target, instance),
            None => Err(self.error(ValidationErrorKind::UnresolvedReference {
                reference: reference.to_string(),
            })),
        }
    }

    fn evaluate_schema(
        &mut self,
        node: &'v Value,
        schema: &'v Map<String, Value>,
        instance: &Value,
    ) -> ValidationResult<()> {
        let dialect = self.dialect();
        let reference = schema.get("$ref").and_then(Value::as_str);

        // Draft-4 rule: a `$ref` replaces the whole node
        if let Some(reference) = reference
            && !dialect.evaluates_ref_siblings()
        {
            return self.with_schema_path("$ref", |ev| ev.follow_ref(reference, instance));
        }

        if instance.is_null() && !nullable::accepts_null(node, dialect) {
            return Err(self.with_schema_path("type", |ev| ev.null_rejected(schema)));
        }

        if let Some(reference) = reference {
            self.with_schema_path("$ref", |ev| ev.follow_ref(reference, instance))?;
        }

        keywords::check_type(self, schema, instance)?;
        keywords::check_enum_const(self, schema, instance)?;
        keywords::check_numeric(self, schema, instance)?;
        keywords::check_string(self, schema, instance)?;
        keywords::check_format(self, schema, instance)?;
        keywords::check_array(self, schema, instance)?;
        keywords::check_object(self, schema, instance)?;
        combinators::evaluate(self, schema, instance)
    }

    fn null_rejected(&self, schema: &Map<String, Value>) -> ValidationError {
        match self.dialect() {
            Dialect::Oas30 => self.error(ValidationErrorKind::NullNotAllowed),
            Dialect::Oas31 => {
                let expected = schema
                    .get("type")
                    .map_or_else(Vec::new, declared_type_names)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                self.error(ValidationErrorKind::TypeMismatch {
                    instance: Value::Null,
                    expected,
                })
            }
        }
    }
}
