use thiserror::Error;

/// 來源層級錯誤：整個輸入無法讀取或結構不符
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Input file not found: {path}")]
    NotFound { path: String },

    #[error("Cannot read {location}: {reason}")]
    Unreadable { location: String, reason: String },

    #[error("Fetching {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("{location} is not valid UTF-8 text")]
    UnsupportedEncoding { location: String },

    #[error("{location} is empty")]
    Empty { location: String },

    #[error("Missing required column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

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

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Configuration,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::Source(_) | EtlError::CsvError(_) => ErrorCategory::Source,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ProcessingError { .. } | EtlError::SerializationError(_) => {
                ErrorCategory::Processing
            }
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路問題通常重試即可
            EtlError::Source(SourceError::Fetch { .. })
            | EtlError::Source(SourceError::HttpStatus { .. }) => ErrorSeverity::Medium,
            EtlError::Source(_) | EtlError::CsvError(_) => ErrorSeverity::High,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::High,
            EtlError::ProcessingError { .. } | EtlError::SerializationError(_) => {
                ErrorSeverity::High
            }
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::Source(SourceError::NotFound { .. }) => {
                "Check the --input path and make sure the file exists"
            }
            EtlError::Source(SourceError::Fetch { .. })
            | EtlError::Source(SourceError::HttpStatus { .. }) => {
                "Check network connectivity and the source URL, then retry"
            }
            EtlError::Source(SourceError::UnsupportedEncoding { .. }) => {
                "Re-save the file as UTF-8 CSV"
            }
            EtlError::Source(SourceError::MissingColumns { .. }) => {
                "The header row must contain Region, Segment Type, Segment Name, Year and Value (USD Thousand)"
            }
            EtlError::Source(_) | EtlError::CsvError(_) => {
                "Verify that the input is a delimited text file with a header row"
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the command-line flags or the TOML configuration file"
            }
            EtlError::ProcessingError { .. } | EtlError::SerializationError(_) => {
                "Run again with --verbose and inspect the logs"
            }
            EtlError::ZipError(_) | EtlError::IoError(_) => {
                "Check that the output directory is writable and has free space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Source => format!("Could not read the market data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
            ErrorCategory::Output => format!("Could not write the output: {}", self),
        }
    }

    /// 結束碼：錯誤一律非零
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
