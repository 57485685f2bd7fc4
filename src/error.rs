use crate::destination::DestinationError;
use crate::graph::GraphError;
use crate::preferences::PreferencesError;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keychain error: {0}")]
    Keychain(#[from] KeychainError),

    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Otter error: {0}")]
    Otter(#[from] OtterError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Otter API errors
#[derive(Debug, Error)]
pub enum OtterError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

impl OtterError {
    /// Text shown inline in the selection dialog.
    ///
    /// Server errors show the response body, which carries the proxy's
    /// own explanation (bad credentials, unknown speech id, ...).
    pub fn display_message(&self) -> String {
        match self {
            OtterError::ServerError { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Errors from a single recording import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to fetch recording: {0}")]
    Fetch(#[from] OtterError),

    #[error("Failed to write outline: {0}")]
    Write(#[from] GraphError),

    #[error("Failed to update imported ids: {0}")]
    Registry(#[from] PreferencesError),

    #[error("Import cancelled")]
    Cancelled,
}

impl ImportError {
    pub fn display_message(&self) -> String {
        match self {
            ImportError::Fetch(e) => e.display_message(),
            other => other.to_string(),
        }
    }
}

/// Keychain-related errors
#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("Failed to store credentials: {0}")]
    Store(String),

    #[error("Failed to retrieve credentials: {0}")]
    Retrieve(String),

    #[error("Failed to delete credentials: {0}")]
    Delete(String),

    #[error("Invalid credential data: {0}")]
    InvalidData(String),

    #[error("Credential storage not implemented for this platform")]
    NotImplemented,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_displays_body() {
        let err = OtterError::ServerError {
            status: 401,
            message: "Invalid Otter credentials".to_string(),
        };
        assert_eq!(err.display_message(), "Invalid Otter credentials");
        assert_eq!(
            ImportError::Fetch(err).display_message(),
            "Invalid Otter credentials"
        );
    }

    #[test]
    fn test_empty_server_body_falls_back_to_status() {
        let err = OtterError::ServerError {
            status: 502,
            message: "  ".to_string(),
        };
        assert_eq!(err.display_message(), "Server error (502):   ");
    }
}
