use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{provider} provider error: {message}")]
    ProviderError { provider: String, message: String },

    #[error("{kind} provider not implemented: {name}")]
    UnsupportedProvider { kind: String, name: String },

    #[error("Transcription failed: {message}")]
    TranscriptionError { message: String },

    #[error("Dataset download failed: {message}")]
    DatasetError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Provider,
    Storage,
    Data,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrainerError {
    pub fn config(message: impl Into<String>) -> Self {
        TrainerError::ConfigError {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        TrainerError::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        TrainerError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TrainerError::ConfigError { .. }
            | TrainerError::ConfigValidationError { .. }
            | TrainerError::InvalidConfigValueError { .. }
            | TrainerError::MissingConfigError { .. }
            | TrainerError::UnsupportedProvider { .. } => ErrorCategory::Configuration,
            TrainerError::HttpError(_) | TrainerError::DatasetError { .. } => {
                ErrorCategory::Network
            }
            TrainerError::ProviderError { .. } | TrainerError::TranscriptionError { .. } => {
                ErrorCategory::Provider
            }
            TrainerError::IoError(_) | TrainerError::ZipError(_) => ErrorCategory::Storage,
            TrainerError::CsvError(_) | TrainerError::SerializationError(_) => ErrorCategory::Data,
            TrainerError::InvalidInput { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrainerError::InvalidInput { .. } => ErrorSeverity::Low,
            TrainerError::HttpError(_)
            | TrainerError::ProviderError { .. }
            | TrainerError::TranscriptionError { .. }
            | TrainerError::DatasetError { .. } => ErrorSeverity::Medium,
            TrainerError::CsvError(_)
            | TrainerError::SerializationError(_)
            | TrainerError::ZipError(_) => ErrorSeverity::High,
            TrainerError::IoError(_)
            | TrainerError::ConfigError { .. }
            | TrainerError::ConfigValidationError { .. }
            | TrainerError::InvalidConfigValueError { .. }
            | TrainerError::MissingConfigError { .. }
            | TrainerError::UnsupportedProvider { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TrainerError::HttpError(_) => "Check your network connection and the provider base URL",
            TrainerError::ProviderError { .. } => {
                "Verify LLM_API_KEY and the model name, or set LLM_PROVIDER=offline"
            }
            TrainerError::UnsupportedProvider { .. } => {
                "Use one of the supported providers: openai, offline, none"
            }
            TrainerError::TranscriptionError { .. } => {
                "Configure an STT provider or type your line instead"
            }
            TrainerError::DatasetError { .. } => {
                "Set KAGGLE_USERNAME and KAGGLE_KEY, or run with --skip-dataset"
            }
            TrainerError::InvalidInput { .. } => "Say something to the prospect first",
            TrainerError::IoError(_) => "Check that the recordings and data directories are writable",
            TrainerError::ZipError(_) => "Delete the partially downloaded dataset and retry",
            TrainerError::CsvError(_) | TrainerError::SerializationError(_) => {
                "The saved transcript may be corrupted; inspect or remove it"
            }
            TrainerError::ConfigError { .. }
            | TrainerError::ConfigValidationError { .. }
            | TrainerError::InvalidConfigValueError { .. }
            | TrainerError::MissingConfigError { .. } => {
                "Review sales-trainer.toml and the related environment variables"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach a remote service: {}", self),
            ErrorCategory::Provider => format!("A speech or language provider failed: {}", self),
            ErrorCategory::Storage => format!("Could not read or write local files: {}", self),
            ErrorCategory::Data => format!("Could not process session data: {}", self),
            ErrorCategory::Input => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrainerError>;
