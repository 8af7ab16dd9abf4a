use thiserror::Error;

/// Main error type for the Reel-Composer library
#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("Media processing error: {0}")]
    Media(#[from] MediaError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while probing, describing or encoding media
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to probe media file: {path} - {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Media file has no usable duration: {path}")]
    EmptyDuration { path: String },

    #[error("Media file has no video stream: {path}")]
    NoVideoStream { path: String },

    #[error("Encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Required tool not found: {tool}")]
    ToolMissing { tool: String },
}

/// Errors raised by session bookkeeping
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Unsupported {kind} upload: {name} (expected {expected})")]
    UnsupportedUpload {
        kind: &'static str,
        name: String,
        expected: String,
    },

    #[error("Scratch workspace unavailable: {reason}")]
    WorkspaceFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ComposerError
pub type Result<T> = std::result::Result<T, ComposerError>;

impl ComposerError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Media(MediaError::ToolMissing { tool }) => {
                format!("'{}' was not found. Please install FFmpeg and make sure it is on your PATH.", tool)
            }
            Self::Session(SessionError::UnsupportedUpload { name, expected, .. }) => {
                format!("'{}' cannot be used here. Please upload a {} file.", name, expected)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

/// Outcome of a processing run, as reported back to the user
///
/// Only two outcomes are distinguished: nothing to process, or processing
/// failed somewhere after it started. The failure keeps the underlying
/// message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("No input videos were provided")]
    NoInput,

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

impl ProcessError {
    /// Get the message shown to the user for this outcome
    pub fn user_message(&self) -> String {
        match self {
            Self::NoInput => "Please upload at least one video.".to_string(),
            Self::ProcessingFailed(detail) => format!("Error while processing the videos: {}", detail),
        }
    }
}

impl From<ComposerError> for ProcessError {
    fn from(err: ComposerError) -> Self {
        Self::ProcessingFailed(err.to_string())
    }
}
