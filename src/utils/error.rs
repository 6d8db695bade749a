use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Store request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Roster could not be read: {message}")]
    RosterFormatError { message: String },

    #[error("Invalid ranking value for {email}: {reason}")]
    InvalidOverrideError { email: String, reason: String },

    #[error("{backend} store error: {message}")]
    StoreError { backend: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LeaderboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::RosterFormatError { .. }
            | Self::InvalidOverrideError { .. }
            | Self::SerializationError(_) => ErrorCategory::Input,
            Self::HttpError(_) | Self::StoreError { .. } => ErrorCategory::Storage,
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidOverrideError { .. } | Self::HttpError(_) | Self::StoreError { .. } => {
                ErrorSeverity::Medium
            }
            Self::CsvError(_) | Self::RosterFormatError { .. } | Self::SerializationError(_) => {
                ErrorSeverity::High
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check leaderboard.toml and command line flags, then try again"
            }
            ErrorCategory::Input => {
                "Re-export the roster as comma separated text (columns A-M) and upload again"
            }
            ErrorCategory::Storage => {
                "Verify the store URL and token; the in-memory copy is used until it recovers"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::RosterFormatError { .. } | Self::CsvError(_) => {
                "Failed to parse CSV.".to_string()
            }
            Self::InvalidOverrideError { .. } => "Invalid ranking value".to_string(),
            Self::StoreError { backend, .. } => {
                format!("The {} store is not reachable right now.", backend)
            }
            Self::HttpError(_) => "The key-value store is not reachable right now.".to_string(),
            other => other.to_string(),
        }
    }

    pub(crate) fn store(backend: &str, message: impl Into<String>) -> Self {
        Self::StoreError {
            backend: backend.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;
