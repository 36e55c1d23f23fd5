use thiserror::Error;

/// Main error type for the VHS camera library
#[derive(Error, Debug)]
pub enum VhsError {
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Lane error: {0}")]
    Lane(#[from] LaneError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Failures inside a single filter stage
///
/// These never reach the caller of the pipeline: the orchestrator logs them and
/// falls back to the stage input.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Random source failed: {reason}")]
    Entropy { reason: String },

    #[error("Unsupported frame geometry: {width}x{height}")]
    UnsupportedGeometry { width: u32, height: u32 },

    #[error("Rendering context unavailable: {reason}")]
    ContextUnavailable { reason: String },
}

/// Frame construction errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Buffer of {len} bytes does not match a {width}x{height} RGBA frame")]
    InvalidBuffer { width: u32, height: u32, len: usize },

    #[error("Extent changed from {expected:?} to {actual:?}")]
    ExtentMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Capture lane errors
#[derive(Error, Debug)]
pub enum LaneError {
    #[error("Lane closed: {lane}")]
    Closed { lane: String },

    #[error("Sink rejected frame: {reason}")]
    SinkFailed { reason: String },

    #[error("Worker failed: {reason}")]
    WorkerFailed { reason: String },
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

/// Convenience type alias for Results using VhsError
pub type Result<T> = std::result::Result<T, VhsError>;

impl VhsError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether the frame can simply be passed through unfiltered
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Every stage failure degrades to the stage input
            Self::Stage(_) => true,
            // A sink may accept the next frame
            Self::Lane(LaneError::SinkFailed { .. }) => true,
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Image(e) => {
                format!("Could not read or write the image: {}. Supported formats are PNG and JPEG.", e)
            }
            Self::Lane(LaneError::Closed { lane }) => {
                format!("The {} lane has shut down; restart capture to continue.", lane)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_errors_are_recoverable() {
        let err: VhsError = StageError::Entropy { reason: "exhausted".into() }.into();
        assert!(err.is_recoverable());

        let err: VhsError = ConfigError::FileNotFound { path: "vhs.toml".into() }.into();
        assert!(!err.is_recoverable());
        assert!(err.user_message().contains("vhs.toml"));
    }
}
