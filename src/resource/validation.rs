use regex::Regex;
use serde_json::{Number, Value};

use crate::error::ValidationError;

/// Typed conversion applied to a value after it has passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Integer,
    Number,
    Boolean,
}

impl Conversion {
    /// Convert the raw string, `None` if it is not a valid literal.
    #[must_use]
    pub fn apply(self, raw: &str) -> Option<Value> {
        match self {
            Conversion::Integer => raw.parse::<i64>().ok().map(Value::from),
            Conversion::Number => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            Conversion::Boolean => raw.parse::<bool>().ok().map(Value::from),
        }
    }
}

/// Per-parameter rule set.
///
/// The presence of a rule makes the parameter mandatory and non-empty. An
/// optional pattern must match the *entire* value, and an optional
/// conversion turns the string into a typed JSON value.
#[derive(Debug, Clone, Default)]
pub struct ValidationRule {
    pattern: Option<Regex>,
    conversion: Option<Conversion>,
}

impl ValidationRule {
    /// Value must be present and non-empty
    #[must_use]
    pub fn required() -> Self {
        Self::default()
    }

    /// Value must be non-empty and fully match `pattern`.
    ///
    /// The pattern is anchored on both ends, so `[0-9]+` rejects `12a`.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            pattern: Some(anchored),
            conversion: None,
        })
    }

    #[must_use]
    pub fn convert(mut self, conversion: Conversion) -> Self {
        self.conversion = Some(conversion);
        self
    }

    /// Validate (and convert) a resolved value.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::Empty`] if the value is absent or empty
    /// * [`ValidationError::Invalid`] on a pattern mismatch or failed conversion
    pub fn check(&self, name: &str, value: Option<&str>) -> Result<Value, ValidationError> {
        let raw = match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                return Err(ValidationError::Empty {
                    name: name.to_string(),
                })
            }
        };
        let invalid = || ValidationError::Invalid {
            name: name.to_string(),
            value: raw.to_string(),
        };
        if let Some(re) = &self.pattern {
            if !re.is_match(raw) {
                return Err(invalid());
            }
        }
        match self.conversion {
            Some(conversion) => conversion.apply(raw).ok_or_else(invalid),
            None => Ok(Value::String(raw.to_string())),
        }
    }
}
