use thiserror::Error;

/// Main error type for sheet2sql.
/// Aggregates errors from the standard library and the internal modules.
#[derive(Error, Debug)]
pub enum Sheet2SqlError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    RangeError(#[from] crate::spreadsheet::range::RangeError),

    // Database module errors
    #[error("{0}")]
    ColumnError(#[from] crate::database::column::ColumnError),

    #[error("{0}")]
    NamingError(#[from] crate::database::naming::NamingError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, Sheet2SqlError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| Sheet2SqlError::WithContextError(format!("{}: {}", message, e)))
    }
}
