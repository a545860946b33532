use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, timeout_at};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::feed::chain::{FallbackOrchestrator, Section};
use crate::models::HomeFeedData;
use crate::observer::FeedObserver;

/// Runs every section's fallback chain concurrently and assembles the home feed.
#[derive(Clone)]
pub struct FeedAggregator {
    orchestrator: FallbackOrchestrator,
    observer: Arc<dyn FeedObserver>,
}

impl FeedAggregator {
    pub fn new(orchestrator: FallbackOrchestrator, observer: Arc<dyn FeedObserver>) -> Self {
        Self {
            orchestrator,
            observer,
        }
    }

    /// Resolve all four sections. A section that fails or misses the deadline
    /// comes back as an empty list; only a crashed section task is an error.
    ///
    /// Dropping the returned future aborts every section still in flight.
    pub async fn aggregate(&self, deadline: Option<Duration>) -> Result<HomeFeedData> {
        info!(?deadline, "Fetching structured home feed");

        let deadline = deadline.and_then(|d| {
            let at = Instant::now().checked_add(d);
            if at.is_none() {
                warn!(?d, "Feed deadline out of range, waiting for every section");
            }
            at
        });

        let trending = self.spawn_section(Section::Trending, deadline, {
            let orchestrator = self.orchestrator.clone();
            async move { orchestrator.resolve_songs(Section::Trending).await }
        });
        let top_tracks = self.spawn_section(Section::TopTracks, deadline, {
            let orchestrator = self.orchestrator.clone();
            async move { orchestrator.resolve_songs(Section::TopTracks).await }
        });
        let new_singles = self.spawn_section(Section::NewSingles, deadline, {
            let orchestrator = self.orchestrator.clone();
            async move { orchestrator.resolve_songs(Section::NewSingles).await }
        });
        let new_albums = self.spawn_section(Section::NewAlbums, deadline, {
            let orchestrator = self.orchestrator.clone();
            async move { orchestrator.resolve_albums(Section::NewAlbums).await }
        });

        let (trending, top_tracks, new_singles, new_albums) =
            tokio::join!(trending, top_tracks, new_singles, new_albums);

        let feed = HomeFeedData {
            trending_songs: joined(Section::Trending, trending)?,
            top_tracks: joined(Section::TopTracks, top_tracks)?,
            new_releases: joined(Section::NewSingles, new_singles)?,
            new_albums: joined(Section::NewAlbums, new_albums)?,
        };

        info!(
            trending = feed.trending_songs.len(),
            top_tracks = feed.top_tracks.len(),
            new_releases = feed.new_releases.len(),
            new_albums = feed.new_albums.len(),
            "Home feed assembled"
        );

        Ok(feed)
    }

    fn spawn_section<T, Fut>(
        &self,
        section: Section,
        deadline: Option<Instant>,
        fetch: Fut,
    ) -> SectionTask<Vec<T>>
    where
        T: Send + 'static,
        Fut: Future<Output = Vec<T>> + Send + 'static,
    {
        let observer = self.observer.clone();

        SectionTask(tokio::spawn(async move {
            let Some(deadline) = deadline else {
                return fetch.await;
            };

            match timeout_at(deadline, fetch).await {
                Ok(items) => items,
                Err(_) => {
                    observer.section_timed_out(section);
                    Vec::new()
                }
            }
        }))
    }
}

/// Spawned section whose task is aborted when the handle is dropped unfinished.
struct SectionTask<T>(JoinHandle<T>);

impl<T> Future for SectionTask<T> {
    type Output = std::result::Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for SectionTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn joined<T>(section: Section, result: std::result::Result<Vec<T>, JoinError>) -> Result<Vec<T>> {
    result.map_err(|e| AppError::Orchestration(format!("{} task failed: {}", section, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::{MockCatalog, Reply, browse_tree_with_songs};
    use crate::models::{AlbumItem, SongItem};
    use crate::observer::recording::{PanickingObserver, RecordingObserver};

    fn aggregator(catalog: MockCatalog) -> (FeedAggregator, Arc<MockCatalog>, Arc<RecordingObserver>) {
        let catalog = Arc::new(catalog);
        let observer = Arc::new(RecordingObserver::default());
        let orchestrator = FallbackOrchestrator::new(catalog.clone(), observer.clone());
        (
            FeedAggregator::new(orchestrator, observer.clone()),
            catalog,
            observer,
        )
    }

    fn healthy_except_trending() -> MockCatalog {
        MockCatalog::new()
            .with_browse(
                "FEmusic_charts",
                Reply::Ok(browse_tree_with_songs(&[("c1", "Chart")])),
            )
            .with_browse(
                "FEmusic_new_releases",
                Reply::Ok(browse_tree_with_songs(&[("n1", "New"), ("n2", "Newer")])),
            )
            .with_album_search(
                "new albums 2024",
                Reply::Ok(vec![AlbumItem::mock("MPREb_1", "Record")]),
            )
    }

    #[tokio::test]
    async fn test_failing_section_degrades_to_empty() {
        let catalog = healthy_except_trending()
            .with_browse("FEmusic_home", Reply::Fail("HTTP 500".to_string()))
            .with_song_search("trending music 2024", Reply::Panic)
            .with_song_search("popular music", Reply::Fail("timeout".to_string()))
            .with_song_search("top hits 2024", Reply::Panic);
        let (aggregator, catalog, _) = aggregator(catalog);

        let feed = aggregator.aggregate(None).await.unwrap();

        assert!(feed.trending_songs.is_empty());
        assert_eq!(feed.top_tracks.len(), 1);
        assert_eq!(feed.new_releases.len(), 2);
        assert_eq!(feed.new_albums.len(), 1);
        assert_eq!(catalog.call_count("search songs \"top hits 2024\""), 1);
    }

    #[tokio::test]
    async fn test_everything_failing_is_still_a_feed() {
        let (aggregator, catalog, _) = aggregator(MockCatalog::new());

        let feed = aggregator.aggregate(None).await.unwrap();

        assert!(feed.is_empty());
        // 4 + 3 + 3 + 1 chain steps
        assert_eq!(catalog.calls().len(), 11);
    }

    #[tokio::test]
    async fn test_deadline_keeps_finished_sections() {
        let catalog = healthy_except_trending().with_browse(
            "FEmusic_home",
            Reply::Slow(
                Duration::from_secs(30),
                browse_tree_with_songs(&[("t1", "Too Late")]),
            ),
        );
        let (aggregator, _, observer) = aggregator(catalog);

        let started = std::time::Instant::now();
        let feed = aggregator
            .aggregate(Some(Duration::from_millis(200)))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(feed.trending_songs.is_empty());
        assert_eq!(feed.top_tracks.len(), 1);
        assert_eq!(feed.new_albums.len(), 1);
        assert!(observer.events().contains(&"trending timed out".to_string()));
    }

    #[tokio::test]
    async fn test_sections_run_concurrently() {
        let delay = Duration::from_millis(400);
        let catalog = MockCatalog::new()
            .with_browse(
                "FEmusic_home",
                Reply::Slow(delay, browse_tree_with_songs(&[("t1", "Trend")])),
            )
            .with_browse(
                "FEmusic_charts",
                Reply::Slow(delay, browse_tree_with_songs(&[("c1", "Chart")])),
            )
            .with_browse(
                "FEmusic_new_releases",
                Reply::Slow(delay, browse_tree_with_songs(&[("n1", "New")])),
            )
            .with_album_search(
                "new albums 2024",
                Reply::Slow(delay, vec![AlbumItem::mock("MPREb_1", "Record")]),
            );
        let (aggregator, _, _) = aggregator(catalog);

        let started = std::time::Instant::now();
        let feed = aggregator.aggregate(None).await.unwrap();

        assert!(started.elapsed() < delay * 3);
        assert_eq!(
            feed.trending_songs.iter().map(SongItem::id).collect::<Vec<_>>(),
            vec!["t1"]
        );
        assert_eq!(feed.new_albums.len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_deadline_waits_for_every_section() {
        let catalog = healthy_except_trending().with_browse(
            "FEmusic_home",
            Reply::Ok(browse_tree_with_songs(&[("t1", "Trend")])),
        );
        let (aggregator, _, observer) = aggregator(catalog);

        let feed = aggregator
            .aggregate(Some(Duration::from_secs(u64::MAX)))
            .await
            .unwrap();

        assert_eq!(feed.trending_songs.len(), 1);
        assert_eq!(feed.top_tracks.len(), 1);
        assert_eq!(feed.new_releases.len(), 2);
        assert_eq!(feed.new_albums.len(), 1);
        assert!(!observer.events().iter().any(|e| e.ends_with("timed out")));
    }

    #[tokio::test]
    async fn test_dropping_aggregate_aborts_sections() {
        let delay = Duration::from_millis(300);
        let catalog = MockCatalog::new().with_browse(
            "FEmusic_home",
            Reply::Slow(delay, browse_tree_with_songs(&[("t1", "Trend")])),
        );
        let (aggregator, catalog, observer) = aggregator(catalog);

        let outcome =
            tokio::time::timeout(Duration::from_millis(50), aggregator.aggregate(None)).await;
        assert!(outcome.is_err());

        tokio::time::sleep(delay * 2).await;

        assert!(observer.events_for(Section::Trending).is_empty());
        assert_eq!(catalog.call_count("search songs \"trending music 2024\""), 0);
    }

    #[tokio::test]
    async fn test_crashed_section_task_is_an_orchestration_error() {
        let catalog = Arc::new(healthy_except_trending());
        let observer = Arc::new(PanickingObserver);
        let orchestrator = FallbackOrchestrator::new(catalog, observer.clone());
        let aggregator = FeedAggregator::new(orchestrator, observer);

        let result = aggregator.aggregate(None).await;

        assert!(matches!(result, Err(AppError::Orchestration(_))));
    }
}
