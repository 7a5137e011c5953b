use thiserror::Error;

/// Errors that can occur while building, validating, or encoding documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FiskalError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// Document number sequencing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// Totals or amount arithmetic inconsistency.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// XML, CSV, or amount encoding/decoding error.
    #[error("codec error: {0}")]
    Codec(String),
}

impl FiskalError {
    /// Stable kind string for machine-readable error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Builder(_) | Self::Numbering(_) | Self::Arithmetic(_) => {
                "validation"
            }
            Self::Codec(_) => "codec",
        }
    }

    /// Collapse a list of validation errors into a single error value.
    pub fn from_validation_errors(errors: &[ValidationError]) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(joined)
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "entries[2].country_code").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Stable rule code if applicable (e.g. "country_code", "BR-16").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule code.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a stable rule code.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
