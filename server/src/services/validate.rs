//! Field validation for request bodies.
//!
//! Bodies arrive as loosely typed JSON (`Option<Value>` per field) so a bad
//! type becomes a field message instead of a deserialization failure. Each
//! rule records at most one message per field and hands back a usable
//! placeholder on failure; callers run [`Validator::finish`] before touching
//! the values.

use std::fmt;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Largest value a `NUMERIC(12, 2)` column holds: 9999999999.99, built from
/// the raw 96-bit mantissa 999_999_999_999 (`lo`, `mid`) at scale 2.
pub const AMOUNT_MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Human-readable attribute name (`category_id` -> `category id`).
fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

/// Loose email check: one `@`, non-empty local part, dotted domain, no spaces.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return None;
    }
    Some(normalized)
}

// =============================================================================
// ERRORS
// =============================================================================

/// Field -> messages, in the order the rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field.to_owned(), vec![message])),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    #[must_use]
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Summary line: the first message plus a count of the rest.
    #[must_use]
    pub fn message(&self) -> String {
        let mut all = self.entries.iter().flat_map(|(_, messages)| messages);
        let Some(first) = all.next() else {
            return "The given data was invalid.".to_owned();
        };
        match all.count() {
            0 => first.clone(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }

    /// JSON object for the `errors` key of the response body.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(field, messages)| {
                let list = messages.iter().cloned().map(Value::String).collect();
                (field.clone(), Value::Array(list))
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.has(field)
    }

    /// # Errors
    ///
    /// Returns every recorded message when any rule failed.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() { Ok(()) } else { Err(self.errors) }
    }

    fn text(&mut self, field: &str, value: Option<&Value>, required: bool) -> Option<String> {
        match value {
            None | Some(Value::Null) => {
                if required {
                    self.add(field, format!("The {} field is required.", attribute(field)));
                }
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                if required {
                    self.add(field, format!("The {} field is required.", attribute(field)));
                }
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.add(field, format!("The {} field must be a string.", attribute(field)));
                None
            }
        }
    }

    fn max_chars(&mut self, field: &str, value: &str, max: usize) -> bool {
        if value.chars().count() > max {
            self.add(field, format!("The {} field must not be greater than {max} characters.", attribute(field)));
            return false;
        }
        true
    }

    /// Required, trimmed string of at most `max` characters.
    pub fn required_string(&mut self, field: &str, value: Option<&Value>, max: usize) -> String {
        let Some(raw) = self.text(field, value, true) else {
            return String::new();
        };
        let trimmed = raw.trim().to_owned();
        if self.max_chars(field, &trimmed, max) { trimmed } else { String::new() }
    }

    /// Optional trimmed string; missing, null, and blank all map to `None`.
    pub fn optional_string(&mut self, field: &str, value: Option<&Value>, max: usize) -> Option<String> {
        let raw = self.text(field, value, false)?;
        let trimmed = raw.trim().to_owned();
        self.max_chars(field, &trimmed, max).then_some(trimmed)
    }

    /// Required email, normalized to lowercase.
    pub fn email(&mut self, field: &str, value: Option<&Value>) -> String {
        let Some(raw) = self.text(field, value, true) else {
            return String::new();
        };
        match normalize_email(&raw) {
            Some(email) if self.max_chars(field, &email, 255) => email,
            Some(_) => String::new(),
            None => {
                self.add(field, format!("The {} field must be a valid email address.", attribute(field)));
                String::new()
            }
        }
    }

    /// Required secret of at least `min` characters. Not trimmed.
    pub fn password(&mut self, field: &str, value: Option<&Value>, min: usize) -> String {
        let Some(raw) = self.text(field, value, true) else {
            return String::new();
        };
        if raw.chars().count() < min {
            self.add(field, format!("The {} field must be at least {min} characters.", attribute(field)));
            return String::new();
        }
        raw
    }

    /// Required non-negative amount (number or numeric string), rounded to cents
    /// and always carrying two decimal places.
    pub fn amount(&mut self, field: &str, value: Option<&Value>) -> Decimal {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.add(field, format!("The {} field is required.", attribute(field)));
                return Decimal::ZERO;
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.add(field, format!("The {} field is required.", attribute(field)));
                return Decimal::ZERO;
            }
            Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
            Some(Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
            Some(_) => None,
        };
        let Some(amount) = parsed else {
            self.add(field, format!("The {} field must be a number.", attribute(field)));
            return Decimal::ZERO;
        };
        if amount < Decimal::ZERO {
            self.add(field, format!("The {} field must be at least 0.", attribute(field)));
            return Decimal::ZERO;
        }
        if amount > AMOUNT_MAX {
            self.add(field, format!("The {} field must not be greater than {AMOUNT_MAX}.", attribute(field)));
            return Decimal::ZERO;
        }
        let mut cents = amount.round_dp(2);
        cents.rescale(2);
        cents
    }

    /// Required integer id (number or numeric string).
    pub fn id(&mut self, field: &str, value: Option<&Value>) -> i64 {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.add(field, format!("The {} field is required.", attribute(field)));
                return 0;
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.add(field, format!("The {} field is required.", attribute(field)));
                return 0;
            }
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(Value::Number(n)) => n.as_i64(),
            Some(_) => None,
        };
        parsed.unwrap_or_else(|| {
            self.add(field, format!("The {} field must be an integer.", attribute(field)));
            0
        })
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
