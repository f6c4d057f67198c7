//! Error types shared across the core crate.
//!
//! Each pipeline stage has its own error enum so callers can tell a
//! malformed field apart from an unreachable backend or a projection that
//! cannot be produced. All of them carry enough context (URL, node id,
//! field kind) to locate the offending record upstream.

use std::path::PathBuf;

use thiserror::Error;

use crate::field::FieldKind;

/// A single interchange-text segment could not be decoded into its field kind.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("cannot decode {kind} value {segment:?}: {reason}")]
pub struct FieldDecodeError {
    pub kind: FieldKind,
    pub segment: String,
    pub reason: String,
}

impl FieldDecodeError {
    pub(crate) fn new(kind: FieldKind, segment: &str, reason: impl ToString) -> Self {
        Self {
            kind,
            segment: segment.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response. Never cached, never retried.
    #[error("bad status code for {url}: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while fetching or decoding node records during traversal.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("error decoding JSON response {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("node record from {url} has no usable nid")]
    MissingNid { url: String },

    #[error("members list from {url} contains a non-numeric nid {value:?}")]
    InvalidMember { url: String, value: String },
}

/// Failures of the root export during aggregation. Sub-collection
/// failures are logged and skipped, so they never reach this type.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid CSV export from {url}: {source}")]
    Csv {
        url: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum AbstractError {
    #[error("malformed abstract markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("abstract markup has unclosed elements")]
    Unclosed,

    #[error("abstract markup contains no paragraphs")]
    NoParagraphs,
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("root node {nid} not found among fetched nodes")]
    RootNotFound { nid: i64 },

    #[error("missing required journal metadata: {what}")]
    MissingRequiredMetadata { what: &'static str },

    #[error("unable to convert abstract of node {nid} to JATS: {source}")]
    Abstract {
        nid: i64,
        #[source]
        source: AbstractError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("error decoding term from {url}: {source}")]
    Term {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write Crossref XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("rendered Crossref XML is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
