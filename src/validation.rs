use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::{ApiError, FieldError};

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Collects field errors across one request body.
#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trimmed, non-empty string.
    pub fn text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.push(field, format!("{field} is required"));
                None
            }
        }
    }

    /// Accepts a JSON number or a numeric string; must be finite and > 0.
    pub fn positive_number(&mut self, field: &str, value: Option<&Value>) -> Option<f64> {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.push(field, format!("{field} is required"));
                return None;
            }
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed {
            Some(v) if v.is_finite() && v > 0.0 => Some(v),
            Some(_) => {
                self.push(field, format!("{field} must be greater than zero"));
                None
            }
            None => {
                self.push(field, format!("{field} must be a number"));
                None
            }
        }
    }

    /// Parses a required enum-like value through `FromStr`.
    pub fn choice<T: std::str::FromStr>(
        &mut self,
        field: &str,
        value: Option<&str>,
        allowed: &str,
    ) -> Option<T> {
        match value.map(str::trim) {
            None | Some("") => {
                self.push(field, format!("{field} is required"));
                None
            }
            Some(raw) => match raw.parse::<T>() {
                Ok(v) => Some(v),
                Err(_) => {
                    self.push(field, format!("{field} must be one of: {allowed}"));
                    None
                }
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}
