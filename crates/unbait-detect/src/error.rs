use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {context}")]
    UnexpectedStatus { status: u16, context: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("analysis operation did not complete: {0}")]
    OperationIncomplete(String),

    #[error("rewriter returned an empty completion")]
    EmptyCompletion,

    #[error("reliability store I/O error at {path}: {source}")]
    StoreIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reliability store parse error: {0}")]
    StoreParse(#[from] serde_json::Error),
}
