use thiserror::Error;

/// Reasons a draft cannot be saved or an item cannot be added.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client name is required")]
    MissingClientName,
    #[error("an invoice needs at least one item")]
    NoItems,
    #[error("item name is required")]
    MissingItemName,
    #[error("item unit price must be greater than zero")]
    NonPositiveUnitPrice,
    #[error("no item at position {0}")]
    NoSuchItem(usize),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("invoice {0} not found")]
    NotFound(i64),
    #[error("export failed: {0}")]
    Export(String),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database lock poisoned")]
    LockPoisoned,
}

impl AppError {
    /// Validation failures are the user's to fix; everything else is retryable
    /// from the same edit buffer.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
