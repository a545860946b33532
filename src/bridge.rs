use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::catalog::{CatalogClient, InnerTubeClient};
use crate::config::Config;
use crate::error::Result;
use crate::feed::{FallbackOrchestrator, FeedAggregator, Section};
use crate::models::{
    AlbumDetails, AlbumItem, HomeFeedData, SearchFilter, SearchResult, SongItem, StreamData,
};
use crate::observer::{CallSite, FeedObserver, TracingObserver};
use crate::shield::ErrorShield;

/// Consumer-facing entry point.
///
/// Every operation degrades to `None` or an empty collection instead of
/// returning an error; failures are reported to the observer.
#[derive(Clone)]
pub struct MusicBridge {
    client: Arc<dyn CatalogClient>,
    shield: ErrorShield,
    orchestrator: FallbackOrchestrator,
    aggregator: FeedAggregator,
    feed_deadline: Option<Duration>,
}

impl MusicBridge {
    pub fn new(client: Arc<dyn CatalogClient>, observer: Arc<dyn FeedObserver>) -> Self {
        let orchestrator = FallbackOrchestrator::new(client.clone(), observer.clone());
        let aggregator = FeedAggregator::new(orchestrator.clone(), observer.clone());

        Self {
            client,
            shield: ErrorShield::new(observer),
            orchestrator,
            aggregator,
            feed_deadline: None,
        }
    }

    /// Bridge over the live InnerTube client, logging through `tracing`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = InnerTubeClient::new(config)?;
        let bridge = Self::new(Arc::new(client), Arc::new(TracingObserver))
            .with_feed_deadline(config.feed_deadline);
        Ok(bridge)
    }

    pub fn with_feed_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.feed_deadline = deadline;
        self
    }

    pub fn feed_deadline(&self) -> Option<Duration> {
        self.feed_deadline
    }

    /// One song search, no fallback.
    pub async fn search_songs(&self, query: &str) -> Option<Vec<SongItem>> {
        let result = self.search(query, SearchFilter::Songs).await?;
        Some(result.songs())
    }

    /// One album search, no fallback.
    pub async fn search_albums(&self, query: &str) -> Option<Vec<AlbumItem>> {
        let result = self.search(query, SearchFilter::Albums).await?;
        Some(result.albums())
    }

    pub async fn search_suggestions(&self, query: &str) -> Option<Vec<String>> {
        let query = non_blank("query", query)?;
        let site = CallSite::Suggestions {
            query: query.to_string(),
        };
        self.shield
            .absorb(site, self.client.suggestions(query))
            .await
    }

    /// All four sections, resolved concurrently. Never absent.
    pub async fn home_feed_sections(&self) -> HomeFeedData {
        match self.aggregator.aggregate(self.feed_deadline).await {
            Ok(feed) => feed,
            Err(e) => {
                error!("Home feed aggregation failed: {}", e);
                HomeFeedData::default()
            }
        }
    }

    pub async fn trending_songs(&self) -> Vec<SongItem> {
        self.orchestrator.resolve_songs(Section::Trending).await
    }

    pub async fn top_tracks(&self) -> Vec<SongItem> {
        self.orchestrator.resolve_songs(Section::TopTracks).await
    }

    pub async fn new_singles(&self) -> Vec<SongItem> {
        self.orchestrator.resolve_songs(Section::NewSingles).await
    }

    pub async fn new_albums(&self) -> Vec<AlbumItem> {
        self.orchestrator.resolve_albums(Section::NewAlbums).await
    }

    /// Playable audio for one video. `Some` with no `url` means the video
    /// resolved but offered no direct audio stream.
    pub async fn stream_data(&self, video_id: &str) -> Option<StreamData> {
        let video_id = non_blank("video_id", video_id)?;
        let site = CallSite::Player {
            video_id: video_id.to_string(),
        };
        let response = self.shield.absorb(site, self.client.player(video_id)).await?;

        let stream = StreamData::from_player(&response);
        if stream.url.is_none() {
            debug!(video_id, "No direct audio stream offered");
        }
        Some(stream)
    }

    pub async fn album_details(&self, browse_id: &str) -> Option<AlbumDetails> {
        let browse_id = non_blank("browse_id", browse_id)?;
        let site = CallSite::AlbumPage {
            browse_id: browse_id.to_string(),
        };
        let page = self
            .shield
            .absorb(site, self.client.album_page(browse_id, true))
            .await?;

        Some(AlbumDetails::from_page(page))
    }

    async fn search(&self, query: &str, filter: SearchFilter) -> Option<SearchResult> {
        let query = non_blank("query", query)?;
        let site = CallSite::Search {
            query: query.to_string(),
            filter: filter.to_string(),
        };
        self.shield
            .absorb(site, self.client.search(query, filter))
            .await
    }
}

fn non_blank<'a>(field: &'static str, value: &'a str) -> Option<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        debug!(field, "Blank input, skipping catalog call");
        None
    } else {
        Some(trimmed)
    }
}
