//! Error types for bazel-bridge.
//!
//! Library modules return `BridgeResult<T>`; the binary wraps these with
//! anyhow context at the CLI boundary. A repository that hosts nothing is
//! not an error — resolution returns `None` for it.

use std::path::PathBuf;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Corrupt probe cache {} ({reason}), moved aside to {}", .path.display(), .quarantine.display())]
    CorruptCache {
        path: PathBuf,
        quarantine: PathBuf,
        reason: String,
    },

    #[error("Failed to read probe cache {}: {source}", .path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write probe cache {}: {source}", .path.display())]
    CachePersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't handle remote repo URL {url}: {source}")]
    Probe {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Failed to read build model {}: {reason}", .path.display())]
    Model { path: PathBuf, reason: String },

    #[error("extraConfig is not valid JSON: {0}")]
    ExtraConfig(#[source] serde_json::Error),

    #[error("Failed writing {}: {source}", .path.display())]
    DescriptorWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
