//! Error types and handling for the travel planner

use thiserror::Error;

/// Main error type for the travel planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A collaborator has no credentials and is disabled
    #[error("{feature} is not configured: {message}")]
    NotConfigured { feature: String, message: String },

    /// Network, timeout or response-shape failure of an external service
    #[error("Upstream unavailable: {message}")]
    Upstream { message: String },

    /// A message chunk could not be sent
    #[error("Delivery failed: {message}")]
    Delivery { message: String },

    /// An optional export capability is switched off
    #[error("{capability} export is unavailable")]
    CapabilityUnavailable { capability: String },

    /// Document rendering or text extraction failed
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new missing-configuration error for `feature`
    pub fn not_configured<F: Into<String>, S: Into<String>>(feature: F, message: S) -> Self {
        Self::NotConfigured {
            feature: feature.into(),
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new delivery error
    pub fn delivery<S: Into<String>>(message: S) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Create a new capability-unavailable error
    pub fn capability_unavailable<S: Into<String>>(capability: S) -> Self {
        Self::CapabilityUnavailable {
            capability: capability.into(),
        }
    }

    /// Create a new encoding error
    pub fn encoding<S: Into<String>>(message: S) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            PlannerError::NotConfigured { feature, .. } => {
                format!("{feature} is disabled because no credentials are configured.")
            }
            PlannerError::Upstream { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            PlannerError::Delivery { message } => format!("Failed to send message: {message}"),
            PlannerError::CapabilityUnavailable { capability } => {
                format!("{capability} export is not available in this installation.")
            }
            PlannerError::Encoding { message } => format!("Could not process document: {message}"),
            PlannerError::Validation { message } => format!("Invalid input: {message}"),
            PlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
