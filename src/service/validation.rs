//! Field-attributed request validation. Checks accumulate into `FieldErrors` so
//! a client sees every problem with a payload at once.

use crate::error::{AppError, FieldErrors};
use regex::Regex;
use std::sync::OnceLock;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("valid email pattern"))
}

pub fn is_valid_email(s: &str) -> bool {
    email_regex().is_match(s)
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// The trimmed value when present and non-blank.
    pub fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref().map(str::trim) {
            None => {
                self.add(field, REQUIRED);
                None
            }
            Some("") => {
                self.add(field, BLANK);
                None
            }
            Some(s) => Some(s),
        }
    }

    /// Like `required`, but the value is kept as sent. Surrounding whitespace is content.
    pub fn required_untrimmed<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref() {
            None => {
                self.add(field, REQUIRED);
                None
            }
            Some("") => {
                self.add(field, BLANK);
                None
            }
            Some(s) => Some(s),
        }
    }

    /// Required, then shaped like an email address.
    pub fn email<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        let s = self.required(field, value)?;
        if is_valid_email(s) {
            Some(s)
        } else {
            self.add(field, INVALID_EMAIL);
            None
        }
    }

    pub fn min_value(&mut self, field: &str, value: i64, min: i64) -> bool {
        if value < min {
            self.add(field, format!("Ensure this value is greater than or equal to {}.", min));
            false
        } else {
            true
        }
    }

    pub fn max_value(&mut self, field: &str, value: i64, max: i64) -> bool {
        if value > max {
            self.add(field, format!("Ensure this value is less than or equal to {}.", max));
            false
        } else {
            true
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    pub fn finish(self) -> Result<(), AppError> {
        self.errors.into_result()
    }
}
