use thiserror::Error;

/// Violations of the document and entry invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// A date string that is not `YYYY-MM`
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    /// An entry carrying both metrics and an error marker
    #[error("Entry {date} has both metrics and an error marker")]
    MetricsAndError { date: String },

    /// An entry with neither a full metric set nor an error marker
    #[error("Entry {date} is missing {field}")]
    MissingField { date: String, field: &'static str },

    /// An error entry followed by further months
    #[error("Entry {date} follows an error entry")]
    EntryAfterError { date: String },

    /// Months out of order or with a gap
    #[error("Entry {date} does not follow {previous}")]
    NotConsecutive { previous: String, date: String },
}

impl DocumentError {
    pub fn invalid_month(s: impl Into<String>) -> Self {
        Self::InvalidMonth(s.into())
    }
}
