pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Data type conversion error
    #[error("{0}")]
    ConversionError(String),
    /// Error when a driver for an identifier is not found
    #[error("driver not found for: {0}")]
    DriverNotFound(String),
    /// Error parsing a URL
    #[error("{0}")]
    InvalidUrl(String),
    /// IO error
    #[error("{0}")]
    IoError(String),
    /// Error when parsing an integer
    #[error(transparent)]
    TryFromIntError(#[from] std::num::TryFromIntError),
    /// Error when a column type is not supported
    #[error("column type [{column_type}] is not supported for column [{column_name}]")]
    UnsupportedColumnType {
        column_name: String,
        column_type: String,
    },
}

/// Converts a [`jiff::Error`] into an [`ConversionError`](Error::ConversionError)
impl From<jiff::Error> for Error {
    fn from(error: jiff::Error) -> Self {
        Error::ConversionError(error.to_string())
    }
}

/// Converts a [`std::io::Error`] into an [`IoError`](Error::IoError)
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IoError(error.to_string())
    }
}

/// Convert [`url::ParseError`] to [`InvalidUrl`](Error::InvalidUrl)
impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::InvalidUrl(error.to_string())
    }
}
