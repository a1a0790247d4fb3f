use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackofficeError {
    #[error("Config directory not found at {0}. Run 'backoffice init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Server responded with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// A page load failed; carries the message the page is showing
    #[error("{0}")]
    LoadFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error("Amount cannot exceed the remaining balance ({remaining:.2})")]
    OverPayment { remaining: f64 },

    #[error("Debt '{0}' has nothing left to pay")]
    NothingOwed(String),

    #[error("Debt '{0}' not found")]
    DebtNotFound(String),

    #[error("Expense '{0}' not found")]
    ExpenseNotFound(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Failed to write export: {0}")]
    Export(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackofficeError {
    /// True for failures detected locally, before anything reached the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BackofficeError::Validation(_)
                | BackofficeError::OverPayment { .. }
                | BackofficeError::NothingOwed(_)
                | BackofficeError::InvalidDate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BackofficeError>;
