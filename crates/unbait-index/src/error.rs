use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("index rejected batch with HTTP status {status}: {body}")]
    BatchRejected { status: u16, body: String },
}
