//! Date-time checking strategies.
//!
//! Three interchangeable checkers exist for `format: date-time`. Which one is
//! used is decided by [`FormatConfig`], never by global state: the first
//! available strategy in the order `Rfc3339`, `StrictRfc3339`, `Iso8601` wins,
//! and with none available every string is accepted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RFC3339: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})[Tt](\d{2}):(\d{2}):(\d{2})(\.\d+)?([Zz]|[+-](\d{2}):(\d{2}))$",
    )
    .expect("static regex")
});

static STRICT_RFC3339: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
        .expect("static regex")
});

/// A concrete date-time checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateTimeStrategy {
    /// RFC 3339 grammar with calendar validation; `t` / `z` may be lowercase
    Rfc3339,
    /// RFC 3339 with uppercase `T` / `Z` only, parsed by chrono
    StrictRfc3339,
    /// Lenient ISO 8601 (extended or basic format, optional offset)
    Iso8601,
}

impl DateTimeStrategy {
    /// Priority order used when several strategies are available
    pub const PRIORITY: [DateTimeStrategy; 3] = [
        DateTimeStrategy::Rfc3339,
        DateTimeStrategy::StrictRfc3339,
        DateTimeStrategy::Iso8601,
    ];

    pub fn check(self, value: &str) -> bool {
        match self {
            DateTimeStrategy::Rfc3339 => is_rfc3339(value),
            DateTimeStrategy::StrictRfc3339 => is_strict_rfc3339(value),
            DateTimeStrategy::Iso8601 => is_iso8601(value),
        }
    }
}

/// Which format checking strategies are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub rfc3339_validator: bool,
    pub strict_rfc3339: bool,
    pub iso8601: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            rfc3339_validator: true,
            strict_rfc3339: true,
            iso8601: true,
        }
    }
}

impl FormatConfig {
    /// No date-time checker available: every date-time string passes
    pub fn without_date_time() -> Self {
        Self {
            rfc3339_validator: false,
            strict_rfc3339: false,
            iso8601: false,
        }
    }

    /// Only the given strategy is available
    pub fn only(strategy: DateTimeStrategy) -> Self {
        let mut config = Self::without_date_time();
        match strategy {
            DateTimeStrategy::Rfc3339 => config.rfc3339_validator = true,
            DateTimeStrategy::StrictRfc3339 => config.strict_rfc3339 = true,
            DateTimeStrategy::Iso8601 => config.iso8601 = true,
        }
        config
    }

    fn is_available(&self, strategy: DateTimeStrategy) -> bool {
        match strategy {
            DateTimeStrategy::Rfc3339 => self.rfc3339_validator,
            DateTimeStrategy::StrictRfc3339 => self.strict_rfc3339,
            DateTimeStrategy::Iso8601 => self.iso8601,
        }
    }

    /// The strategy `date-time` checks use, if any
    pub fn date_time_strategy(&self) -> Option<DateTimeStrategy> {
        DateTimeStrategy::PRIORITY
            .into_iter()
            .find(|strategy| self.is_available(*strategy))
    }
}

fn is_rfc3339(value: &str) -> bool {
    let Some(caps) = RFC3339.captures(value) else {
        return false;
    };
    let field = |i: usize| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(u32::MAX)
    };
    let year = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(i32::MIN);
    if NaiveDate::from_ymd_opt(year, field(2), field(3)).is_none() {
        return false;
    }
    // Second 60 is a leap second
    if field(4) > 23 || field(5) > 59 || field(6) > 60 {
        return false;
    }
    if caps.get(9).is_some() && (field(9) > 23 || field(10) > 59) {
        return false;
    }
    true
}

fn is_strict_rfc3339(value: &str) -> bool {
    STRICT_RFC3339.is_match(value) && DateTime::parse_from_rfc3339(value).is_ok()
}

const ISO_NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const ISO_OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y%m%dT%H%M%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

fn is_iso8601(value: &str) -> bool {
    if !value.contains('T') {
        return false;
    }
    let naive = value.strip_suffix('Z').unwrap_or(value);
    if ISO_NAIVE_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(naive, fmt).is_ok())
    {
        return true;
    }
    ISO_OFFSET_FORMATS
        .iter()
        .any(|fmt| DateTime::parse_from_str(value, fmt).is_ok())
}

/// `full-date` from RFC 3339 (`2018-01-02`)
pub(crate) fn is_full_date(value: &str) -> bool {
    value.len() == 10
        && value.as_bytes()[4] == b'-'
        && value.as_bytes()[7] == b'-'
        && value.as_bytes()[..4].iter().all(u8::is_ascii_digit)
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// `full-time` from RFC 3339 (`23:59:59Z`, `08:30:00.5+02:00`)
pub(crate) fn is_full_time(value: &str) -> bool {
    let (clock, offset) = match value.find(['Z', 'z', '+', '-']) {
        Some(i) => value.split_at(i),
        None => return false,
    };
    let offset_ok = match offset {
        "Z" | "z" => true,
        _ => {
            let digits = &offset[1..];
            digits.len() == 5
                && NaiveTime::parse_from_str(&format!("{}:00", digits), "%H:%M:%S").is_ok()
        }
    };
    offset_ok && clock.len() >= 8 && NaiveTime::parse_from_str(clock, "%H:%M:%S%.f").is_ok()
}
