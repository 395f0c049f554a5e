//! Downstream search-index upload client.

mod client;
mod error;
mod types;

pub use client::{BatchUploadOutcome, IndexClient};
pub use error::IndexError;
pub use types::OutputDocument;
