use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP request to {url} returned status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTML parsing error: {message}")]
    HtmlParseError { message: String },

    #[error("Table #{index} not found: page contains {found} table bodies")]
    TableNotFoundError { index: usize, found: usize },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Source,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::HtmlParseError { .. } | EtlError::TableNotFoundError { .. } => {
                ErrorCategory::Source
            }
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) | EtlError::DatabaseError(_) => ErrorCategory::Storage,
            EtlError::TomlError(_)
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::HttpStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            EtlError::IoError(_) | EtlError::DatabaseError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            EtlError::ApiError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            EtlError::HttpStatusError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check your network connection and that the source URL is reachable".to_string()
            }
            EtlError::HttpStatusError { status, .. } if *status >= 500 => {
                "The source server is failing; retry later or raise source.retry_attempts"
                    .to_string()
            }
            EtlError::HttpStatusError { .. } => {
                "Verify source.url points to an existing page".to_string()
            }
            EtlError::HtmlParseError { .. } => {
                "The page layout may have changed; inspect it with the extract command".to_string()
            }
            EtlError::TableNotFoundError { found, .. } => format!(
                "Set source.table_index to a value below {} (use the extract command to inspect)",
                found
            ),
            EtlError::ProcessingError { .. } | EtlError::ValidationError { .. } => {
                "Inspect the raw rows with the extract command".to_string()
            }
            EtlError::CsvError(_) | EtlError::SerializationError(_) => {
                "Check the extracted data for unexpected characters".to_string()
            }
            EtlError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            EtlError::DatabaseError(_) => {
                "Check the database file and the SQL statement".to_string()
            }
            EtlError::TomlError(_) => "Fix the syntax of the configuration file".to_string(),
            EtlError::ConfigValidationError { field, .. }
            | EtlError::InvalidConfigValueError { field, .. } => {
                format!("Review the '{}' setting in the configuration", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download the source page: {}", self),
            ErrorCategory::Source => format!("Could not read the GDP table: {}", self),
            ErrorCategory::Data => format!("Could not process the GDP data: {}", self),
            ErrorCategory::Storage => format!("Could not save the results: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_by_class() {
        let server_error = EtlError::HttpStatusError {
            url: "http://example.com".to_string(),
            status: 503,
        };
        assert!(server_error.is_retryable());
        assert_eq!(server_error.severity(), ErrorSeverity::Medium);
        assert_eq!(server_error.category(), ErrorCategory::Network);

        let not_found = EtlError::HttpStatusError {
            url: "http://example.com".to_string(),
            status: 404,
        };
        assert!(!not_found.is_retryable());
        assert_eq!(not_found.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_table_not_found_suggestion_names_bound() {
        let err = EtlError::TableNotFoundError { index: 5, found: 3 };
        assert_eq!(err.category(), ErrorCategory::Source);
        assert!(err.recovery_suggestion().contains("below 3"));
        assert!(err.user_friendly_message().starts_with("Could not read the GDP table"));
    }

    #[test]
    fn test_storage_errors_are_critical() {
        let err = EtlError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_retryable());
    }
}
