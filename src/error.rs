use std::path::PathBuf;

/// The word-pair source could not be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum DataUnavailable {
    #[error("cannot read word list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bundled word list {0} not found")]
    MissingBundled(String),

    #[error("bundled word list {0} is not valid UTF-8")]
    NotUtf8(String),

    #[error("cannot parse word list: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("word pairs unavailable: {0}")]
    DataUnavailable(#[from] DataUnavailable),

    /// Guard against indexing into an empty task list. Logged, never shown.
    #[error("no attempt tasks to display")]
    EmptyTaskSet,
}
