use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the metadata API. Surfaced to the user as the
/// Failed state of whichever fetch family triggered the request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// Failures reading or writing the watchlist file. Logged and swallowed;
/// the in-memory watchlist stays authoritative for the session.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not determine a data directory for the watchlist")]
    DataDirUnavailable,

    #[error("failed to create data directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read watchlist file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write watchlist file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("watchlist file {path} is not valid JSON: {source}")]
    MalformedFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize watchlist: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
