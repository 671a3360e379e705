/*!
 * Error types for the langpack application.
 *
 * This module contains custom error types for the remote translation service
 * and for the language pack pipeline, using the thiserror crate for ergonomic
 * error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the remote translation service
#[derive(Error, Debug)]
pub enum CrowdinError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl CrowdinError {
    /// Whether a request that failed with this error may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// How an error affects the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Aborts the whole run with a non-zero exit
    Fatal,
    /// Logged, the pipeline continues
    Recoverable,
}

/// Errors raised by the language pack pipeline stages
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required prior migration step has not been performed
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Downloading the translation archive failed
    #[error("Failed to download translations: {0}")]
    Fetch(#[source] CrowdinError),

    /// Asking the remote service to build a fresh export failed
    #[error("Failed to trigger translation export: {0}")]
    BuildTrigger(#[source] CrowdinError),

    /// Prior per-locale metadata is missing or malformed
    #[error("Failed to load metadata for locale '{locale}': {reason}")]
    LocaleMetadataLoad {
        /// Locale directory name
        locale: String,
        /// What went wrong
        reason: String,
    },

    /// A local locale has no entry in the remote status list
    #[error("No remote translation status for locale '{0}'")]
    UnmatchedRemoteLocale(String),

    /// Reading or writing a zip archive failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Compiling a message catalog failed
    #[error("Catalog compilation error: {0}")]
    Compile(String),

    /// The subtitle refresh pre-step failed
    #[error("Subtitle refresh failed: {0}")]
    SubtitleRefresh(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Classify this error as fatal or recoverable
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Precondition(_)
            | Self::Fetch(_)
            | Self::Archive(_)
            | Self::File(_)
            | Self::SubtitleRefresh(_)
            | Self::Config(_) => ErrorSeverity::Fatal,
            Self::BuildTrigger(_)
            | Self::LocaleMetadataLoad { .. }
            | Self::UnmatchedRemoteLocale(_)
            | Self::Compile(_) => ErrorSeverity::Recoverable,
        }
    }

    /// Shorthand for `severity() == ErrorSeverity::Fatal`
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for PipelineError {
    fn from(error: anyhow::Error) -> Self {
        Self::File(format!("{:#}", error))
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<zip::result::ZipError> for PipelineError {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Archive(error.to_string())
    }
}
