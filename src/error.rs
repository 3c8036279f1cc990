//! Error types for the export core.
//!
//! Isolated failures (one callout, one image, one auxiliary asset) are logged
//! and degraded where they happen and never reach this type. What does reach
//! it is either malformed input rejected up front or a terminal failure that
//! aborts the whole export.

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Document failed validation (missing required fields, bad shape data)
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A `data:` URI could not be parsed or decoded
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Image decode or encode error
    #[error("Image error: {0}")]
    Image(String),

    /// Rasterisation error (pixmap allocation, invalid geometry)
    #[error("Render error: {0}")]
    Render(String),

    /// PDF generation error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// ZIP serialisation error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON (de)serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The export was cancelled through its cancellation token
    #[error("Export cancelled")]
    Cancelled,
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<crate::writer::ImageError> for Error {
    fn from(err: crate::writer::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}
