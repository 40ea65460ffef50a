//! String and numeric format checks.
//!
//! The validator only ever asks a [`FormatChecker`] a yes/no question. The
//! default checker is a [`FormatRegistry`] populated for the active dialect;
//! formats the registry does not know always pass.

mod datetime;

pub use datetime::{DateTimeStrategy, FormatConfig};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use uuid::Uuid;

use crate::dialect::Dialect;

static HOSTNAME_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("static regex")
});

/// Format checking collaborator consulted by the validator
pub trait FormatChecker: Send + Sync {
    /// Check a string value against a named format
    fn check_str(&self, value: &str, format: &str) -> bool;

    /// Check any instance. Non-strings pass unless the checker knows better.
    fn check(&self, instance: &Value, format: &str) -> bool {
        match instance {
            Value::String(s) => self.check_str(s, format),
            _ => true,
        }
    }
}

/// One entry of a [`FormatRegistry`]
#[derive(Clone)]
pub enum FormatCheck {
    /// Built-in predicate
    Builtin(fn(&Value) -> bool),
    /// `date-time` with the configured strategy (`None` accepts everything)
    DateTime(Option<DateTimeStrategy>),
    /// Caller supplied predicate
    Custom(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl FormatCheck {
    fn run(&self, instance: &Value) -> bool {
        match self {
            FormatCheck::Builtin(check) => check(instance),
            FormatCheck::DateTime(strategy) => match (strategy, instance) {
                (Some(strategy), Value::String(s)) => strategy.check(s),
                _ => true,
            },
            FormatCheck::Custom(check) => check(instance),
        }
    }
}

impl fmt::Debug for FormatCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatCheck::Builtin(_) => f.write_str("Builtin"),
            FormatCheck::DateTime(strategy) => f.debug_tuple("DateTime").field(strategy).finish(),
            FormatCheck::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Mapping from format name to check
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    checks: HashMap<String, FormatCheck>,
}

impl FormatRegistry {
    /// A registry with no formats: everything passes
    pub fn empty() -> Self {
        Self::default()
    }

    /// Formats known to OpenAPI 3.0 (draft-4 formats plus the OAS additions)
    pub fn oas30(config: &FormatConfig) -> Self {
        let mut registry = Self::common(config);
        registry.insert("byte", FormatCheck::Builtin(is_byte));
        registry.insert("binary", FormatCheck::Builtin(|_| true));
        registry
    }

    /// Formats known to OpenAPI 3.1 (draft 2020-12 formats plus the OAS additions)
    pub fn oas31(config: &FormatConfig) -> Self {
        let mut registry = Self::common(config);
        registry.insert("time", FormatCheck::Builtin(is_time));
        registry
    }

    pub fn for_dialect(dialect: Dialect, config: &FormatConfig) -> Self {
        match dialect {
            Dialect::Oas30 => Self::oas30(config),
            Dialect::Oas31 => Self::oas31(config),
        }
    }

    fn common(config: &FormatConfig) -> Self {
        let mut registry = Self::empty();
        registry.insert("int32", FormatCheck::Builtin(is_int32));
        registry.insert("int64", FormatCheck::Builtin(is_int64));
        registry.insert("float", FormatCheck::Builtin(is_float));
        registry.insert("double", FormatCheck::Builtin(|_| true));
        registry.insert("password", FormatCheck::Builtin(|_| true));
        registry.insert("date", FormatCheck::Builtin(is_date));
        registry.insert("date-time", FormatCheck::DateTime(config.date_time_strategy()));
        registry.insert("uuid", FormatCheck::Builtin(is_uuid));
        registry.insert("email", FormatCheck::Builtin(is_email));
        registry.insert("ipv4", FormatCheck::Builtin(is_ipv4));
        registry.insert("ipv6", FormatCheck::Builtin(is_ipv6));
        registry.insert("hostname", FormatCheck::Builtin(is_hostname));
        registry.insert("regex", FormatCheck::Builtin(is_regex));
        registry
    }

    fn insert(&mut self, name: &str, check: FormatCheck) {
        self.checks.insert(name.to_string(), check);
    }

    /// Register (or replace) a format check
    pub fn register<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.checks.insert(name.into(), FormatCheck::Custom(Arc::new(check)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered format names, sorted
    pub fn formats(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FormatChecker for FormatRegistry {
    fn check_str(&self, value: &str, format: &str) -> bool {
        self.check(&Value::String(value.to_string()), format)
    }

    fn check(&self, instance: &Value, format: &str) -> bool {
        match self.checks.get(format) {
            Some(check) => check.run(instance),
            None => true,
        }
    }
}

fn string_check(instance: &Value, check: impl FnOnce(&str) -> bool) -> bool {
    match instance {
        Value::String(s) => check(s),
        _ => true,
    }
}

fn is_int32(instance: &Value) -> bool {
    match instance {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).is_ok(),
            None => !n.is_u64(),
        },
        _ => true,
    }
}

fn is_int64(instance: &Value) -> bool {
    match instance {
        Value::Number(n) => n.is_i64() || !n.is_u64(),
        _ => true,
    }
}

fn is_float(instance: &Value) -> bool {
    match instance.as_f64() {
        Some(f) if instance.is_number() => f.is_finite() && f.abs() <= f64::from(f32::MAX),
        _ => true,
    }
}

fn is_byte(instance: &Value) -> bool {
    string_check(instance, |s| STANDARD.decode(s).is_ok())
}

fn is_date(instance: &Value) -> bool {
    string_check(instance, datetime::is_full_date)
}

fn is_time(instance: &Value) -> bool {
    string_check(instance, datetime::is_full_time)
}

fn is_uuid(instance: &Value) -> bool {
    string_check(instance, |s| s.len() == 36 && Uuid::parse_str(s).is_ok())
}

fn is_email(instance: &Value) -> bool {
    string_check(instance, |s| s.contains('@'))
}

fn is_ipv4(instance: &Value) -> bool {
    string_check(instance, |s| s.parse::<Ipv4Addr>().is_ok())
}

fn is_ipv6(instance: &Value) -> bool {
    string_check(instance, |s| s.parse::<Ipv6Addr>().is_ok())
}

fn is_hostname(instance: &Value) -> bool {
    string_check(instance, |s| {
        let s = s.strip_suffix('.').unwrap_or(s);
        !s.is_empty() && s.len() <= 253 && s.split('.').all(|label| HOSTNAME_LABEL.is_match(label))
    })
}

fn is_regex(instance: &Value) -> bool {
    string_check(instance, |s| Regex::new(s).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn oas30() -> FormatRegistry {
        FormatRegistry::oas30(&FormatConfig::default())
    }

    #[test]
    fn test_uuid_any_case() {
        let registry = oas30();
        assert!(registry.check_str("f50ec0b7-f960-400d-91f0-c42a6d44e3d0", "uuid"));
        assert!(registry.check_str("F50EC0B7-F960-400D-91F0-C42A6D44E3D0", "uuid"));
        assert!(!registry.check_str("f50ec0b7f960400d91f0c42a6d44e3d0", "uuid"));
        assert!(!registry.check_str("not-a-uuid", "uuid"));
    }

    #[test]
    fn test_date() {
        let registry = FormatRegistry::oas31(&FormatConfig::default());
        assert!(registry.check_str("2018-01-02", "date"));
        assert!(!registry.check_str("-12", "date"));
        assert!(!registry.check_str("2018-02-30", "date"));
    }

    #[test]
    fn test_date_time_without_strategy_accepts_everything() {
        let registry = FormatRegistry::oas30(&FormatConfig::without_date_time());
        assert!(registry.check_str("1989-01-02T00:00:00Z", "date-time"));
        assert!(registry.check_str("2018", "date-time"));
    }

    #[test]
    fn test_date_time_uses_configured_strategy() {
        let registry = FormatRegistry::oas30(&FormatConfig::only(DateTimeStrategy::Iso8601));
        assert!(registry.check_str("2018-01-02T23:59:59Z", "date-time"));
        assert!(!registry.check_str("1989-01-00Z", "date-time"));
    }

    #[test]
    fn test_numeric_formats() {
        let registry = oas30();
        assert!(registry.check(&json!(2_147_483_647), "int32"));
        assert!(!registry.check(&json!(2_147_483_648_i64), "int32"));
        assert!(registry.check(&json!(i64::MIN), "int64"));
        assert!(!registry.check(&json!(u64::MAX), "int64"));
        assert!(registry.check(&json!(1.5), "float"));
        assert!(!registry.check(&json!(1e300), "float"));
        // Numeric formats do not judge strings
        assert!(registry.check(&json!("abc"), "int32"));
    }

    #[test]
    fn test_dialect_specific_formats() {
        let oas30 = oas30();
        let oas31 = FormatRegistry::oas31(&FormatConfig::default());
        assert!(oas30.contains("byte"));
        assert!(!oas31.contains("byte"));
        assert!(oas31.contains("time"));
        assert!(!oas30.check_str("not base64!", "byte"));
        assert!(oas30.check_str("aGVsbG8=", "byte"));
        assert!(!oas31.check_str("25:00:00Z", "time"));
    }

    #[test]
    fn test_network_formats() {
        let registry = oas30();
        assert!(registry.check_str("192.168.0.1", "ipv4"));
        assert!(!registry.check_str("192.168.0.256", "ipv4"));
        assert!(registry.check_str("::1", "ipv6"));
        assert!(registry.check_str("api.example.com", "hostname"));
        assert!(!registry.check_str("-bad.example.com", "hostname"));
        assert!(registry.check_str("someone@example.com", "email"));
        assert!(!registry.check_str("[unclosed", "regex"));
    }

    #[test]
    fn test_unknown_format_passes_and_custom_registration() {
        let mut registry = oas30();
        assert!(registry.check_str("anything", "color"));
        registry.register("color", |v: &Value| {
            v.as_str().is_none_or(|s| s.starts_with('#'))
        });
        assert!(registry.check_str("#fff", "color"));
        assert!(!registry.check_str("red", "color"));
        assert!(registry.formats().contains(&"color"));
    }
}
