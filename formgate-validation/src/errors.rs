// Validation errors

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Conditions that stop a validation pass before it produces a result.
///
/// These are caller mistakes. Failed rules are never reported this way;
/// they end up in [`Rules::errors`](crate::Rules::errors).
#[derive(Debug, Error)]
pub enum RulesError {
    /// `validate()` was called with no source values at all
    #[error("no source values to validate")]
    MissingSource,

    /// A registered field has no entry in the source values
    #[error("field `{field}` has rules but no source value")]
    FieldNotInSource { field: String },

    /// A rule names a predicate the predicate set does not provide
    #[error("unknown predicate `{predicate}` in rules for field `{field}`")]
    UnknownPredicate { field: String, predicate: String },

    /// Rule set or source configuration could not be read
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RulesError {
    fn from(e: serde_json::Error) -> Self {
        RulesError::Config(e.to_string())
    }
}

impl From<toml::de::Error> for RulesError {
    fn from(e: toml::de::Error) -> Self {
        RulesError::Config(e.to_string())
    }
}

/// Result type for rule configuration and validation passes
pub type Result<T> = std::result::Result<T, RulesError>;

/// One failed rule, with the message it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,

    /// Resolved, human-readable message
    pub message: String,

    /// Predicate that failed, in rule-string form (e.g. `minLength`)
    pub constraint: String,

    /// Parameters the rule was declared with
    pub params: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get errors for a specific field
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Messages only, in the order they were recorded
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.errors })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(field: &str, constraint: &str) -> ValidationError {
        ValidationError {
            field: field.to_string(),
            message: format!("{} failed {}", field, constraint),
            constraint: constraint.to_string(),
            params: vec![],
        }
    }

    #[test]
    fn test_field_errors() {
        let errors = ValidationErrors::new(vec![
            error("email", "required"),
            error("name", "minLength"),
            error("email", "email"),
        ]);

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get_field_errors("email").len(), 2);
        assert_eq!(errors.messages()[1], "name failed minLength");
    }

    #[test]
    fn test_to_json() {
        let errors = ValidationErrors::from(vec![error("email", "required")]);
        let json = errors.to_json();

        assert_eq!(json["errors"][0]["field"], "email");
        assert_eq!(json["errors"][0]["constraint"], "required");
    }

    #[test]
    fn test_rules_error_display() {
        let err = RulesError::UnknownPredicate {
            field: "age".to_string(),
            predicate: "isPrime".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown predicate `isPrime` in rules for field `age`"
        );
        assert_eq!(
            RulesError::MissingSource.to_string(),
            "no source values to validate"
        );
    }
}
