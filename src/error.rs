//! Error types shared by the content, page and server layers

use thiserror::Error;

/// Errors raised while fetching and rendering site content
#[derive(Error, Debug)]
pub enum SiteError {
    /// Requested identifier is absent from the store or the enumerated set
    #[error("Not found: {0}")]
    NotFound(String),

    /// A listing query returned zero items
    #[error("No entries of content type `{0}`")]
    EmptyResult(String),

    /// A single thumbnail asset could not be fetched
    #[error("Failed to resolve asset {id}: {reason}")]
    AssetResolution { id: String, reason: String },

    #[error("Content store request failed: {0}")]
    Store(String),

    #[error("Malformed {kind} {id}: {source}")]
    Decode {
        kind: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiteError {
    /// Whether the error maps to a user-visible "not found" page
    pub fn is_not_found(&self) -> bool {
        matches!(self, SiteError::NotFound(_))
    }
}

impl From<reqwest::Error> for SiteError {
    fn from(err: reqwest::Error) -> Self {
        SiteError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
