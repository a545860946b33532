//! Renderer shapes the catalog uses for a single feed item.
//!
//! Every field is optional: the upstream schema is undocumented and drifts
//! between endpoints, so absence is the normal case and is handled at
//! conversion time, not at deserialization time.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::duration::parse_duration;
use crate::models::{SongItem, Thumbnail};

/// Why a single feed entry was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry has no title")]
    MissingTitle,

    #[error("entry has no video id")]
    MissingVideoId,

    #[error("entry does not link to a watch endpoint")]
    NoWatchEndpoint,

    #[error("entry has no flex columns")]
    NoFlexColumns,

    #[error("entry matches no known renderer")]
    Unrecognized,

    #[error("malformed {shape}: {reason}")]
    Malformed { shape: &'static str, reason: String },
}

const CAROUSEL_KEY: &str = "musicTwoRowItemRenderer";
const SHELF_KEY: &str = "musicResponsiveListItemRenderer";

/// Deserialize a field, falling back to its default when the upstream type has drifted.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Runs {
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Runs {
    pub fn first_text(&self) -> Option<&str> {
        self.runs.first().and_then(|r| r.text.as_deref())
    }

    /// All run texts concatenated, e.g. a suggestion split into bold/plain runs.
    pub fn joined(&self) -> String {
        self.runs
            .iter()
            .filter_map(|r| r.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub text: Option<String>,
    pub navigation_endpoint: Option<NavigationEndpoint>,
}

impl Run {
    pub fn browse_id(&self) -> Option<&str> {
        self.navigation_endpoint
            .as_ref()
            .and_then(|n| n.browse_endpoint.as_ref())
            .and_then(|b| b.browse_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEndpoint {
    pub watch_endpoint: Option<WatchEndpoint>,
    pub browse_endpoint: Option<BrowseEndpoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEndpoint {
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseEndpoint {
    pub browse_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRenderer {
    pub music_thumbnail_renderer: Option<MusicThumbnailRenderer>,
}

impl ThumbnailRenderer {
    pub fn thumbnails(&self) -> Vec<Thumbnail> {
        self.music_thumbnail_renderer
            .as_ref()
            .and_then(|m| m.thumbnail.as_ref())
            .map(|list| list.to_thumbnails())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MusicThumbnailRenderer {
    pub thumbnail: Option<ThumbnailList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailList {
    #[serde(default)]
    pub thumbnails: Vec<RawThumbnail>,
}

impl ThumbnailList {
    pub fn to_thumbnails(&self) -> Vec<Thumbnail> {
        self.thumbnails
            .iter()
            .filter_map(|t| {
                let url = t.url.as_deref().filter(|u| !u.is_empty())?;
                Some(Thumbnail {
                    url: url.to_string(),
                    size: t.width.max(t.height),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThumbnail {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// `musicTwoRowItemRenderer`: a tile inside a carousel shelf.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    pub title: Option<Runs>,
    #[serde(default, deserialize_with = "lenient")]
    pub subtitle: Option<Runs>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail_renderer: Option<ThumbnailRenderer>,
    pub navigation_endpoint: Option<NavigationEndpoint>,
}

/// `musicResponsiveListItemRenderer`: a row inside a list shelf.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfListItem {
    pub playlist_item_data: Option<PlaylistItemData>,
    #[serde(default)]
    pub flex_columns: Vec<FlexColumn>,
    #[serde(default, deserialize_with = "lenient")]
    pub fixed_columns: Vec<FixedColumn>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<ThumbnailRenderer>,
    #[serde(default, deserialize_with = "lenient")]
    pub navigation_endpoint: Option<NavigationEndpoint>,
    #[serde(default, deserialize_with = "lenient")]
    pub badges: Vec<Badge>,
}

impl ShelfListItem {
    pub fn column_runs(&self, index: usize) -> Option<&Runs> {
        self.flex_columns
            .get(index)
            .and_then(|c| c.music_responsive_list_item_flex_column_renderer.as_ref())
            .and_then(|r| r.text.as_ref())
    }

    pub fn fixed_column_runs(&self, index: usize) -> Option<&Runs> {
        self.fixed_columns
            .get(index)
            .and_then(|c| c.music_responsive_list_item_fixed_column_renderer.as_ref())
            .and_then(|r| r.text.as_ref())
    }

    pub fn video_id(&self) -> Option<&str> {
        self.playlist_item_data
            .as_ref()
            .and_then(|p| p.video_id.as_deref())
    }

    pub fn thumbnails(&self) -> Vec<Thumbnail> {
        self.thumbnail
            .as_ref()
            .map(ThumbnailRenderer::thumbnails)
            .unwrap_or_default()
    }

    pub fn is_explicit(&self) -> bool {
        self.badges.iter().any(|b| {
            b.music_inline_badge_renderer
                .as_ref()
                .and_then(|r| r.icon.as_ref())
                .and_then(|i| i.icon_type.as_deref())
                == Some("MUSIC_EXPLICIT_BADGE")
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub music_inline_badge_renderer: Option<InlineBadge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InlineBadge {
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub icon_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemData {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexColumn {
    pub music_responsive_list_item_flex_column_renderer: Option<ColumnRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedColumn {
    pub music_responsive_list_item_fixed_column_renderer: Option<ColumnRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnRenderer {
    pub text: Option<Runs>,
}

/// A feed entry, tagged by the renderer shape it carries.
#[derive(Debug, Clone)]
pub enum Renderer {
    CarouselItem(CarouselItem),
    ShelfListItem(ShelfListItem),
    Unrecognized,
}

impl Renderer {
    /// Split one raw entry into the renderer shapes it carries.
    ///
    /// Each known shape is decoded on its own, so a malformed carousel does not
    /// take a valid shelf row in the same entry down with it. An entry holding
    /// neither shape yields a single `Unrecognized`.
    pub fn classify(entry: &Value) -> Vec<Result<Renderer, EntryError>> {
        let mut renderers = Vec::with_capacity(2);

        if let Some(raw) = entry.get(CAROUSEL_KEY) {
            renderers.push(decode(CAROUSEL_KEY, raw).map(Renderer::CarouselItem));
        }
        if let Some(raw) = entry.get(SHELF_KEY) {
            renderers.push(decode(SHELF_KEY, raw).map(Renderer::ShelfListItem));
        }
        if renderers.is_empty() {
            renderers.push(Ok(Renderer::Unrecognized));
        }

        renderers
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Renderer::CarouselItem(_) => "carousel_item",
            Renderer::ShelfListItem(_) => "shelf_list_item",
            Renderer::Unrecognized => "unrecognized",
        }
    }

    pub fn to_song(&self) -> Result<SongItem, EntryError> {
        match self {
            Renderer::CarouselItem(item) => carousel_to_song(item),
            Renderer::ShelfListItem(item) => shelf_to_song(item),
            Renderer::Unrecognized => Err(EntryError::Unrecognized),
        }
    }
}

fn decode<T: DeserializeOwned>(shape: &'static str, raw: &Value) -> Result<T, EntryError> {
    T::deserialize(raw).map_err(|e| EntryError::Malformed {
        shape,
        reason: e.to_string(),
    })
}

fn carousel_to_song(item: &CarouselItem) -> Result<SongItem, EntryError> {
    let title = item
        .title
        .as_ref()
        .and_then(Runs::first_text)
        .ok_or(EntryError::MissingTitle)?;

    let watch = item
        .navigation_endpoint
        .as_ref()
        .and_then(|n| n.watch_endpoint.as_ref())
        .ok_or(EntryError::NoWatchEndpoint)?;
    let video_id = watch.video_id.as_deref().ok_or(EntryError::MissingVideoId)?;

    // Keep the last run that parses; subtitles mix artist, type and length.
    let duration = item
        .subtitle
        .iter()
        .flat_map(|s| s.runs.iter())
        .filter_map(|r| r.text.as_deref().and_then(parse_duration))
        .last();

    let thumbnails = item
        .thumbnail_renderer
        .as_ref()
        .map(ThumbnailRenderer::thumbnails)
        .unwrap_or_default();

    Ok(build_song(video_id, title)?
        .with_duration(duration)
        .with_thumbnails(thumbnails))
}

fn shelf_to_song(item: &ShelfListItem) -> Result<SongItem, EntryError> {
    let video_id = item.video_id().ok_or(EntryError::MissingVideoId)?;

    if item.flex_columns.is_empty() {
        return Err(EntryError::NoFlexColumns);
    }

    let title = item
        .column_runs(0)
        .and_then(Runs::first_text)
        .ok_or(EntryError::MissingTitle)?;

    Ok(build_song(video_id, title)?.with_thumbnails(item.thumbnails()))
}

pub(crate) fn build_song(video_id: &str, title: &str) -> Result<SongItem, EntryError> {
    if video_id.trim().is_empty() {
        return Err(EntryError::MissingVideoId);
    }
    SongItem::new(video_id, title).ok_or(EntryError::MissingTitle)
}
