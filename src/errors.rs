// errors.rs
use thiserror::Error;

/// Errors that abort a run (or reject it before it starts).
///
/// Page-level trouble is not in here: a failed or empty page becomes an
/// [`Exhaustion`] and a broken record becomes a [`ParseFailure`]; both are
/// recovered where they happen.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Spreadsheet error: {0}")]
    Xlsx(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for PipelineError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        PipelineError::Xlsx(e.to_string())
    }
}

/// Why a source stopped yielding pages for the current query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Exhaustion {
    #[error("response has no listings key")]
    MissingListingsKey,

    #[error("page contained no listings")]
    EmptyPage,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("undecodable response body: {0}")]
    Decode(String),
}

impl Exhaustion {
    /// Transport failures are worth a warning; everything else is just the end of the data.
    pub fn is_transport(&self) -> bool {
        matches!(self, Exhaustion::Transport(_))
    }
}

/// Why a single raw record was dropped during normalization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("missing or empty address")]
    MissingAddress,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unparseable date in '{field}': {value}")]
    UnparseableDate { field: &'static str, value: String },
}
