//! Declarative field checks for inbound payloads.
//!
//! A [`Shape`] turns a raw JSON object into a typed value. Every field is
//! checked before anything is reported, so a client receives the complete
//! list of problems in one response. Unknown keys are ignored.

pub mod inventory;
pub mod user;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

pub use inventory::InventoryInput;
pub use user::{Credentials, UserInput};

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Whether a payload describes a brand new record or an existing record
/// with client changes merged over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Merge,
}

/// A validated payload type
pub trait Shape: Sized {
    fn validate(payload: &Map<String, Value>, mode: Mode) -> Result<Self, Vec<FieldError>>;
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// String constraint for one field
#[derive(Debug, Clone, Copy)]
pub struct Text {
    field: &'static str,
    label: &'static str,
    required: bool,
    min: Option<usize>,
    max: Option<usize>,
}

impl Text {
    pub fn required(field: &'static str, label: &'static str) -> Self {
        Self { field, label, required: true, min: None, max: None }
    }

    pub fn optional(field: &'static str, label: &'static str) -> Self {
        Self { field, label, required: false, min: None, max: None }
    }

    pub fn min(mut self, chars: usize) -> Self {
        self.min = Some(chars);
        self
    }

    pub fn max(mut self, chars: usize) -> Self {
        self.max = Some(chars);
        self
    }
}

/// Collects violations while extracting typed values from a payload.
///
/// Extraction methods return `None` both when a field is absent and when it
/// failed a check; `finish` decides the outcome from the collected errors.
pub struct Checker<'a> {
    payload: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Checker<'a> {
    pub fn new(payload: &'a Map<String, Value>) -> Self {
        Self { payload, errors: Vec::new() }
    }

    /// Present and non-null value for a key
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.payload.get(field).filter(|v| !v.is_null())
    }

    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fail(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn text(&mut self, rule: Text) -> Option<String> {
        let value = match self.get(rule.field) {
            Some(value) => value,
            None => {
                if rule.required {
                    self.fail(rule.field, format!("{} is required", rule.label));
                }
                return None;
            }
        };

        let Value::String(raw) = value else {
            self.fail(rule.field, format!("{} must be a string", rule.label));
            return None;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if rule.required {
                self.fail(rule.field, format!("{} is required", rule.label));
            }
            return None;
        }

        let length = trimmed.chars().count();
        if let Some(min) = rule.min {
            if length < min {
                self.fail(
                    rule.field,
                    format!("{} must be at least {} characters", rule.label, min),
                );
                return None;
            }
        }
        if let Some(max) = rule.max {
            if length > max {
                self.fail(
                    rule.field,
                    format!("{} cannot exceed {} characters", rule.label, max),
                );
                return None;
            }
        }

        Some(trimmed.to_string())
    }

    /// Password-like value, kept exactly as typed
    pub fn secret(&mut self, field: &str, label: &str, required: bool, min: usize) -> Option<String> {
        let raw = match self.get(field) {
            Some(Value::String(raw)) if !raw.is_empty() => raw,
            Some(Value::String(_)) | None => {
                if required {
                    self.fail(field, format!("{} is required", label));
                }
                return None;
            }
            Some(_) => {
                self.fail(field, format!("{} must be a string", label));
                return None;
            }
        };

        if raw.chars().count() < min {
            self.fail(field, format!("{} must be at least {} characters", label, min));
            return None;
        }
        Some(raw.clone())
    }

    /// Required email address, normalized to lower case
    pub fn email(&mut self, field: &'static str) -> Option<String> {
        let email = self.text(Text::required(field, "Email"))?;
        if !is_valid_email(&email) {
            self.fail(field, "Please enter a valid email address");
            return None;
        }
        Some(email.to_lowercase())
    }

    /// Required number no smaller than `min`
    pub fn decimal(&mut self, field: &str, label: &str, min: Decimal) -> Option<Decimal> {
        let Some(value) = self.get(field) else {
            self.fail(field, format!("{} is required", label));
            return None;
        };

        let parsed = match value {
            Value::Number(n) => {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
            }
            _ => None,
        };

        let Some(number) = parsed else {
            self.fail(field, format!("{} must be a number", label));
            return None;
        };

        if number < min {
            self.fail(field, format!("{} must be at least {}", label, min));
            return None;
        }
        Some(number.normalize())
    }

    /// Required whole number no smaller than `min`
    pub fn integer(&mut self, field: &str, label: &str, min: i64) -> Option<i64> {
        let Some(value) = self.get(field) else {
            self.fail(field, format!("{} is required", label));
            return None;
        };

        let Value::Number(n) = value else {
            self.fail(field, format!("{} must be a number", label));
            return None;
        };

        let whole = match n.as_i64() {
            Some(i) => Some(i),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64),
        };

        let Some(number) = whole else {
            self.fail(field, format!("{} must be a whole number", label));
            return None;
        };

        if number < min {
            self.fail(field, format!("{} must be at least {}", label, min));
            return None;
        }
        Some(number)
    }

    /// Optional value drawn from a fixed set
    pub fn choice<T: std::str::FromStr>(
        &mut self,
        field: &str,
        label: &str,
        allowed: &[&str],
    ) -> Option<T> {
        let value = self.get(field)?;
        let parsed = value.as_str().and_then(|s| s.trim().parse::<T>().ok());
        if parsed.is_none() {
            self.fail(
                field,
                format!("{} must be one of: {}", label, allowed.join(", ")),
            );
        }
        parsed
    }

    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, Vec<FieldError>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        // Every extractor either produced a value or recorded an error, so an
        // empty error list means the build succeeds.
        build().ok_or_else(|| vec![FieldError::new("payload", "Invalid payload")])
    }
}
