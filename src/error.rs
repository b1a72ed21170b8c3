use thiserror::Error;

use crate::models::ApiErrorMessage;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        transient: bool,
        #[source]
        source: BoxError,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed XML response: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("<{record}> is missing required field <{field}>")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("<{record}> has invalid <{field}> {value:?}: {reason}")]
    InvalidField {
        record: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Multiple patterns ({count}) returned for pattern id {pattern_id:?}")]
    AmbiguousPattern { pattern_id: String, count: usize },

    #[error("No pattern returned for pattern id {pattern_id:?}")]
    PatternNotFound { pattern_id: String },

    #[error("BusTracker API error: {}", format_api_errors(.0))]
    Api(Vec<ApiErrorMessage>),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport { transient: true, .. })
    }
}

fn format_api_errors(errors: &[ApiErrorMessage]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
