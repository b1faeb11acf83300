//! Remote catalog client contract.
//!
//! # Responsibility
//! - Define the interface resolution and sync code consumes, independent of
//!   any transport.
//!
//! # Invariants
//! - Transport failures are always distinguishable from "no such icon".
//! - Implementations never retry on their own.

use crate::model::icon::IconId;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod http;

pub use http::HttpCatalogClient;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Remote catalog failure carrying enough context for diagnostics.
#[derive(Debug)]
pub enum CatalogError {
    /// The request failed or the server answered with a non-success status.
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },
    /// The server answered successfully but the body did not decode.
    Decode { url: String, message: String },
}

impl CatalogError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Decode { url, .. } => url,
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport {
                url,
                status: Some(status),
                message,
            } => write!(f, "catalog request to {url} failed with {status}: {message}"),
            Self::Transport {
                url,
                status: None,
                message,
            } => write!(f, "catalog request to {url} failed: {message}"),
            Self::Decode { url, message } => {
                write!(f, "catalog response from {url} did not decode: {message}")
            }
        }
    }
}

impl Error for CatalogError {}

/// Interface over the remote icon catalog.
///
/// `Sync` is required so batch workers can share one client by reference.
pub trait CatalogClient: Sync {
    /// Free-text search returning candidate identifiers, best first.
    fn search(&self, query: &str, limit: u32) -> CatalogResult<Vec<IconId>>;

    /// Existence probe for one full identifier.
    fn exists(&self, id: &IconId) -> CatalogResult<bool>;

    /// All known collection prefixes.
    fn list_collection_prefixes(&self) -> CatalogResult<Vec<String>>;

    /// Every icon identifier inside one collection.
    fn list_collection_icons(&self, prefix: &str, include_hidden: bool)
        -> CatalogResult<Vec<IconId>>;

    /// Raw SVG bytes for one icon.
    fn download_svg(&self, id: &IconId) -> CatalogResult<Vec<u8>>;
}
