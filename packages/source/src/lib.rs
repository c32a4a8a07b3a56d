#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Retrieval of the two public datasets.
//!
//! [`urls`] builds the Baltimore calls-for-service and IEM ASOS download
//! URLs; [`download::fetch`] streams a URL to disk with connect and read
//! timeouts, reporting through a [`progress::DownloadProgress`].

pub mod download;
pub mod progress;
pub mod urls;

use std::path::Path;

pub use download::fetch;

/// Errors that can occur while downloading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (including timeouts).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// A URL failed to parse.
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// I/O error writing to disk.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl SourceError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
