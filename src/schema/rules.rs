//! Field rules
//!
//! Rules run after casting and transforms, on non-null values only. A rule
//! that does not apply to the value's JSON type lets it pass; the field's
//! type check is responsible for rejecting it.

use regex::Regex;
use serde_json::Value;
use validator::{ValidateEmail, ValidateUrl};

#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Numbers: lower bound on the value. Strings: lower bound on the length.
    Min(f64),
    /// Numbers: upper bound on the value. Strings: upper bound on the length.
    Max(f64),
    OneOf(Vec<String>),
    Matches(Regex),
    DateFormat(String),
    Positive,
    Email,
    Url,
    Uuid,
}

/// A rule with an optional message override
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn min(min: f64) -> Self {
        Self::new(RuleKind::Min(min))
    }

    pub fn max(max: f64) -> Self {
        Self::new(RuleKind::Max(max))
    }

    pub fn one_of(allowed: Vec<String>) -> Self {
        Self::new(RuleKind::OneOf(allowed))
    }

    pub fn matches(regex: Regex) -> Self {
        Self::new(RuleKind::Matches(regex))
    }

    pub fn date_format(format: impl Into<String>) -> Self {
        Self::new(RuleKind::DateFormat(format.into()))
    }

    pub fn positive() -> Self {
        Self::new(RuleKind::Positive)
    }

    pub fn email() -> Self {
        Self::new(RuleKind::Email)
    }

    pub fn url() -> Self {
        Self::new(RuleKind::Url)
    }

    pub fn uuid() -> Self {
        Self::new(RuleKind::Uuid)
    }

    /// Replace the default message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Check `value`, returning the message on failure
    pub fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        match self.violation(field, value) {
            None => Ok(()),
            Some(default) => Err(self.message.clone().unwrap_or(default)),
        }
    }

    fn violation(&self, field: &str, value: &Value) -> Option<String> {
        match (&self.kind, value) {
            (RuleKind::Min(min), Value::Number(n)) => {
                let num = n.as_f64()?;
                (num < *min).then(|| {
                    format!(
                        "{} must be greater than or equal to {}",
                        field,
                        format_number(*min)
                    )
                })
            }
            (RuleKind::Min(min), Value::String(s)) => {
                ((s.chars().count() as f64) < *min).then(|| {
                    format!(
                        "{} must be at least {} characters",
                        field,
                        format_number(*min)
                    )
                })
            }
            (RuleKind::Max(max), Value::Number(n)) => {
                let num = n.as_f64()?;
                (num > *max).then(|| {
                    format!(
                        "{} must be less than or equal to {}",
                        field,
                        format_number(*max)
                    )
                })
            }
            (RuleKind::Max(max), Value::String(s)) => {
                ((s.chars().count() as f64) > *max).then(|| {
                    format!(
                        "{} must be at most {} characters",
                        field,
                        format_number(*max)
                    )
                })
            }
            (RuleKind::OneOf(allowed), Value::String(s)) => {
                (!allowed.iter().any(|a| a == s)).then(|| {
                    format!(
                        "{} must be one of the following values: {}",
                        field,
                        allowed.join(", ")
                    )
                })
            }
            (RuleKind::Matches(regex), Value::String(s)) => (!regex.is_match(s)).then(|| {
                format!(
                    "{} must match the following: \"{}\"",
                    field,
                    regex.as_str()
                )
            }),
            (RuleKind::DateFormat(format), Value::String(s)) => {
                chrono::NaiveDate::parse_from_str(s, format)
                    .is_err()
                    .then(|| format!("{} must match the date format {}", field, format))
            }
            (RuleKind::Positive, Value::Number(n)) => {
                let num = n.as_f64()?;
                (num <= 0.0).then(|| format!("{} must be a positive number", field))
            }
            (RuleKind::Email, Value::String(s)) => (!s.as_str().validate_email())
                .then(|| format!("{} must be a valid email", field)),
            (RuleKind::Url, Value::String(s)) => {
                (!s.as_str().validate_url()).then(|| format!("{} must be a valid URL", field))
            }
            (RuleKind::Uuid, Value::String(s)) => uuid::Uuid::parse_str(s)
                .is_err()
                .then(|| format!("{} must be a valid UUID", field)),
            _ => None,
        }
    }
}

/// Render a bound without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
