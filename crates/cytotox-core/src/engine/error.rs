use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssayError {
    #[error("Configuration mismatch in {context}: {detail}")]
    ConfigurationMismatch {
        context: &'static str,
        detail: String,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Shape mismatch for {subject}: {reason}")]
    ShapeMismatch { subject: String, reason: String },
}

impl AssayError {
    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape_mismatch(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Builds a mismatch error from the two sides of a failed set comparison.
    ///
    /// Returns `None` when both sides are empty, so callers can use `?`-free
    /// `if let Some(err)` checks.
    pub(crate) fn set_mismatch(
        context: &'static str,
        only_in_data: &[&str],
        only_in_config: &[&str],
    ) -> Option<Self> {
        if only_in_data.is_empty() && only_in_config.is_empty() {
            return None;
        }
        let mut parts = Vec::new();
        if !only_in_data.is_empty() {
            parts.push(format!("present in data only: [{}]", only_in_data.join(", ")));
        }
        if !only_in_config.is_empty() {
            parts.push(format!(
                "present in configuration only: [{}]",
                only_in_config.join(", ")
            ));
        }
        Some(Self::ConfigurationMismatch {
            context,
            detail: parts.join("; "),
        })
    }
}
