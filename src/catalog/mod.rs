//! The raw catalog client this layer consumes.
//!
//! [`CatalogClient`] is the seam: the feed and bridge code only see the
//! trait, `InnerTubeClient` talks to the real service, and tests swap in
//! `mock::MockCatalog`.

pub mod client;
pub mod parse;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{AlbumPage, PlayerResponse, SearchFilter, SearchResult};

pub use client::InnerTubeClient;

pub const HOME_SURFACE: &str = "FEmusic_home";
pub const CHARTS_SURFACE: &str = "FEmusic_charts";
pub const NEW_RELEASES_SURFACE: &str = "FEmusic_new_releases";

/// Catalog queries as issued by this layer. Implementations must tolerate
/// concurrent calls from several feed sections at once.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Free-text search, interpreted as songs or albums.
    async fn search(&self, query: &str, filter: SearchFilter) -> Result<SearchResult>;

    /// Raw nested content tree of a structured browse surface.
    async fn browse(&self, surface_id: &str) -> Result<Value>;

    /// Video details and streaming formats for one video.
    async fn player(&self, video_id: &str) -> Result<PlayerResponse>;

    /// Query completions for a partial search string.
    async fn suggestions(&self, query: &str) -> Result<Vec<String>>;

    /// Album header and, when `with_songs` is set, its track list.
    async fn album_page(&self, browse_id: &str, with_songs: bool) -> Result<AlbumPage>;
}
