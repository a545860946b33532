use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{CHARTS_SURFACE, CatalogClient, HOME_SURFACE, NEW_RELEASES_SURFACE};
use crate::error::{AppError, Result};
use crate::models::{AlbumItem, SearchFilter, SongItem};
use crate::normalizer::normalize_browse;
use crate::observer::{FeedObserver, StepOutcome};
use crate::shield::ErrorShield;

/// A named home feed category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Trending,
    TopTracks,
    NewSingles,
    NewAlbums,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Trending,
        Section::TopTracks,
        Section::NewSingles,
        Section::NewAlbums,
    ];

    /// Queries to try for this section, in order.
    pub fn chain(self) -> &'static [ChainStep] {
        match self {
            Section::Trending => TRENDING_CHAIN,
            Section::TopTracks => TOP_TRACKS_CHAIN,
            Section::NewSingles => NEW_SINGLES_CHAIN,
            Section::NewAlbums => NEW_ALBUMS_CHAIN,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Trending => write!(f, "trending"),
            Section::TopTracks => write!(f, "top_tracks"),
            Section::NewSingles => write!(f, "new_singles"),
            Section::NewAlbums => write!(f, "new_albums"),
        }
    }
}

/// One query attempt within a section's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    Browse(&'static str),
    SearchSongs(&'static str),
    SearchAlbums(&'static str),
}

impl fmt::Display for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStep::Browse(surface) => write!(f, "browse {}", surface),
            ChainStep::SearchSongs(query) => write!(f, "search songs \"{}\"", query),
            ChainStep::SearchAlbums(query) => write!(f, "search albums \"{}\"", query),
        }
    }
}

const TRENDING_CHAIN: &[ChainStep] = &[
    ChainStep::Browse(HOME_SURFACE),
    ChainStep::SearchSongs("trending music 2024"),
    ChainStep::SearchSongs("popular music"),
    ChainStep::SearchSongs("top hits 2024"),
];

const TOP_TRACKS_CHAIN: &[ChainStep] = &[
    ChainStep::Browse(CHARTS_SURFACE),
    ChainStep::SearchSongs("top tracks 2024"),
    ChainStep::SearchSongs("top songs"),
];

const NEW_SINGLES_CHAIN: &[ChainStep] = &[
    ChainStep::Browse(NEW_RELEASES_SURFACE),
    ChainStep::SearchSongs("new singles 2024"),
    ChainStep::SearchSongs("new music"),
];

const NEW_ALBUMS_CHAIN: &[ChainStep] = &[ChainStep::SearchAlbums("new albums 2024")];

/// Walks a section's chain until a step yields at least one item.
///
/// A step that fails and a step that succeeds with nothing both move on to
/// the next step. Exhausting the chain yields an empty list.
#[derive(Clone)]
pub struct FallbackOrchestrator {
    client: Arc<dyn CatalogClient>,
    shield: ErrorShield,
}

impl FallbackOrchestrator {
    pub fn new(client: Arc<dyn CatalogClient>, observer: Arc<dyn FeedObserver>) -> Self {
        Self {
            client,
            shield: ErrorShield::new(observer),
        }
    }

    pub async fn resolve_songs(&self, section: Section) -> Vec<SongItem> {
        self.resolve_songs_with(section, section.chain()).await
    }

    pub async fn resolve_songs_with(&self, section: Section, steps: &[ChainStep]) -> Vec<SongItem> {
        self.run_chain(section, steps, |step| self.song_step(step)).await
    }

    pub async fn resolve_albums(&self, section: Section) -> Vec<AlbumItem> {
        self.resolve_albums_with(section, section.chain()).await
    }

    pub async fn resolve_albums_with(
        &self,
        section: Section,
        steps: &[ChainStep],
    ) -> Vec<AlbumItem> {
        self.run_chain(section, steps, |step| self.album_step(step)).await
    }

    async fn run_chain<T, F, Fut>(
        &self,
        section: Section,
        steps: &[ChainStep],
        mut attempt: F,
    ) -> Vec<T>
    where
        F: FnMut(ChainStep) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let observer = self.shield.observer();

        for (index, step) in steps.iter().copied().enumerate() {
            match self.shield.run(attempt(step)).await {
                Ok(items) if !items.is_empty() => {
                    observer.step_finished(section, index, &step, &StepOutcome::Items(items.len()));
                    observer.section_finished(section, items.len());
                    return items;
                }
                Ok(_) => {
                    observer.step_finished(section, index, &step, &StepOutcome::Empty);
                }
                Err(e) => {
                    observer.step_finished(section, index, &step, &StepOutcome::Failed(&e));
                }
            }
        }

        observer.section_finished(section, 0);
        Vec::new()
    }

    async fn song_step(&self, step: ChainStep) -> Result<Vec<SongItem>> {
        match step {
            ChainStep::Browse(surface) => {
                let tree = self.client.browse(surface).await?;
                Ok(normalize_browse(&tree))
            }
            ChainStep::SearchSongs(query) => {
                Ok(self.client.search(query, SearchFilter::Songs).await?.songs())
            }
            ChainStep::SearchAlbums(_) => Err(AppError::InvalidInput(format!(
                "{} cannot produce songs",
                step
            ))),
        }
    }

    async fn album_step(&self, step: ChainStep) -> Result<Vec<AlbumItem>> {
        match step {
            ChainStep::SearchAlbums(query) => {
                Ok(self.client.search(query, SearchFilter::Albums).await?.albums())
            }
            ChainStep::Browse(_) | ChainStep::SearchSongs(_) => Err(AppError::InvalidInput(
                format!("{} cannot produce albums", step),
            )),
        }
    }
}
