use thiserror::Error;

/// Result type alias for the metric pipeline.
pub type Result<T> = std::result::Result<T, MetricError>;

/// Everything that can go wrong between the portal and a served figure.
///
/// Every variant surfaces to the HTTP caller as a 500 with the display
/// message; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// Package metadata or ZIP fetch failed, the archive was unreadable, or
    /// the release had no matching resource.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The release ZIP has no CSV entry for this table number.
    #[error("Table_{0} CSV not found in ZIP")]
    TableNotFound(u32),

    /// No row label in the table matched the metric's pattern.
    #[error("no row matching `{pattern}` in Table_{table}")]
    RowNotFound { table: u32, pattern: String },

    /// Numeric coercion failed, the CSV was structurally invalid, or the
    /// as-of cell did not hold a period label.
    #[error("parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for MetricError {
    fn from(err: reqwest::Error) -> Self {
        MetricError::UpstreamUnavailable(err.to_string())
    }
}

impl From<zip::result::ZipError> for MetricError {
    fn from(err: zip::result::ZipError) -> Self {
        MetricError::UpstreamUnavailable(format!("bad ZIP archive: {}", err))
    }
}

impl From<csv::Error> for MetricError {
    fn from(err: csv::Error) -> Self {
        MetricError::ParseError(err.to_string())
    }
}
