// Validator configuration

use serde::{Deserialize, Serialize};

use crate::access::ValidationContext;
use crate::dialect::Dialect;
use crate::format::FormatConfig;

/// Options fixed for the lifetime of an [`OasValidator`](crate::OasValidator).
///
/// The default is OpenAPI 3.1, no read/write context, every date-time
/// strategy available and the document root as the entry schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    pub dialect: Dialect,
    pub context: ValidationContext,
    pub formats: FormatConfig,
    /// Reference to the schema instances are validated against, e.g.
    /// `#/components/schemas/Pet`. `None` means the document root.
    pub entry: Option<String>,
}

impl ValidatorOptions {
    pub fn oas30() -> Self {
        Self::default().with_dialect(Dialect::Oas30)
    }

    pub fn oas31() -> Self {
        Self::default().with_dialect(Dialect::Oas31)
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_formats(mut self, formats: FormatConfig) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }
}
