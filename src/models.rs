use serde::{Deserialize, Serialize};

/// One entry of a thumbnail list. Lists are ordered smallest to largest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub size: Option<u32>,
}

/// A playable song. Identity is the video id.
///
/// Only [`SongItem::new`] builds one, and it refuses an empty id or title,
/// so every `SongItem` in circulation has both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongItem {
    id: String,
    title: String,
    artists: Vec<String>,
    album: Option<String>,
    duration: Option<u32>,
    thumbnail: String,
    thumbnails: Option<Vec<Thumbnail>>,
}

impl SongItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let title = title.into();

        if id.trim().is_empty() || title.trim().is_empty() {
            return None;
        }

        Some(Self {
            id,
            title,
            artists: Vec::new(),
            album: None,
            duration: None,
            thumbnail: String::new(),
            thumbnails: None,
        })
    }

    pub fn with_artists(mut self, artists: Vec<String>) -> Self {
        self.artists = artists;
        self
    }

    pub fn with_album(mut self, album: Option<String>) -> Self {
        self.album = album;
        self
    }

    pub fn with_duration(mut self, duration: Option<u32>) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    /// Sets the full thumbnail list and derives the single thumbnail from its last entry.
    pub fn with_thumbnails(mut self, thumbnails: Vec<Thumbnail>) -> Self {
        self.thumbnail = thumbnails
            .last()
            .map(|t| t.url.clone())
            .unwrap_or_default();
        self.thumbnails = if thumbnails.is_empty() {
            None
        } else {
            Some(thumbnails)
        };
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    /// Length in seconds, when the catalog exposed a parseable label.
    pub fn duration(&self) -> Option<u32> {
        self.duration
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    pub fn thumbnails(&self) -> Option<&[Thumbnail]> {
        self.thumbnails.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub id: Option<String>,
}

/// Album record as the catalog client returns it. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumItem {
    pub browse_id: String,
    pub playlist_id: Option<String>,
    pub title: String,
    pub artists: Option<Vec<Artist>>,
    pub year: Option<i32>,
    pub thumbnail: String,
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumDetails {
    pub browse_id: String,
    pub title: String,
    pub thumbnail: String,
    pub year: Option<i32>,
    pub artists: Vec<String>,
    pub songs: Vec<SongItem>,
}

impl AlbumDetails {
    pub fn from_page(page: AlbumPage) -> Self {
        let AlbumPage { album, songs } = page;

        Self {
            browse_id: album.browse_id,
            title: album.title,
            thumbnail: album.thumbnail,
            year: album.year,
            artists: album
                .artists
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.name)
                .collect(),
            songs,
        }
    }
}

/// Playable audio for one video. Every field may be absent; a missing `url`
/// means no direct audio stream was offered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamData {
    pub url: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub duration_seconds: Option<u32>,
    pub bitrate: Option<u32>,
    pub mime_type: Option<String>,
    pub itag: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HomeFeedData {
    pub trending_songs: Vec<SongItem>,
    pub top_tracks: Vec<SongItem>,
    pub new_releases: Vec<SongItem>,
    pub new_albums: Vec<AlbumItem>,
}

impl HomeFeedData {
    pub fn is_empty(&self) -> bool {
        self.trending_songs.is_empty()
            && self.top_tracks.is_empty()
            && self.new_releases.is_empty()
            && self.new_albums.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchFilter {
    Songs,
    Albums,
}

impl std::fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchFilter::Songs => write!(f, "songs"),
            SearchFilter::Albums => write!(f, "albums"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchItem {
    Song(SongItem),
    Album(AlbumItem),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub items: Vec<SearchItem>,
}

impl SearchResult {
    pub fn songs(self) -> Vec<SongItem> {
        self.items
            .into_iter()
            .filter_map(|item| match item {
                SearchItem::Song(song) => Some(song),
                SearchItem::Album(_) => None,
            })
            .collect()
    }

    pub fn albums(self) -> Vec<AlbumItem> {
        self.items
            .into_iter()
            .filter_map(|item| match item {
                SearchItem::Album(album) => Some(album),
                SearchItem::Song(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumPage {
    pub album: AlbumItem,
    pub songs: Vec<SongItem>,
}

/// Player endpoint response, reduced to the fields stream resolution reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub video_details: Option<VideoDetails>,
    pub streaming_data: Option<StreamingData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub length_seconds: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    #[serde(default)]
    pub adaptive_formats: Vec<StreamFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFormat {
    pub itag: Option<u32>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub bitrate: Option<u32>,
}

#[cfg(test)]
impl SongItem {
    pub fn mock(id: &str, title: &str) -> Self {
        Self::new(id, title)
            .expect("mock songs have an id and title")
            .with_artists(vec!["Mock Artist".to_string()])
            .with_duration(Some(180))
    }
}

#[cfg(test)]
impl AlbumItem {
    pub fn mock(browse_id: &str, title: &str) -> Self {
        Self {
            browse_id: browse_id.to_string(),
            playlist_id: None,
            title: title.to_string(),
            artists: Some(vec![Artist {
                name: "Mock Artist".to_string(),
                id: Some("UCmock".to_string()),
            }]),
            year: Some(2024),
            thumbnail: "https://example.com/album.jpg".to_string(),
            explicit: false,
        }
    }
}
