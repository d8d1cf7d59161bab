use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Fatal conditions that abort an ingestion or aggregation run.
///
/// An unplayed match is not in here: it ends ingestion through
/// [`crate::ingest::StopReason::NotYetOccurred`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("expected {expected} {field} on {url}, found {actual}")]
    ParseShapeMismatch {
        url: String,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("malformed {field} {raw:?} for slot {slot} on {url}")]
    MalformedStat {
        url: String,
        slot: usize,
        field: &'static str,
        raw: String,
    },

    #[error("player {name:?} (log row {index}) is not in the registry")]
    UnknownPlayer { name: String, index: usize },

    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("log row {index} is inconsistent: {detail}")]
    CorruptLog { index: usize, detail: String },
}

impl PipelineError {
    pub fn transport(url: &str, detail: impl ToString) -> Self {
        PipelineError::Transport {
            url: url.to_string(),
            detail: detail.to_string(),
        }
    }
}
