//! Parsers for the search, suggestion and album responses of the InnerTube API.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::duration::parse_duration;
use crate::error::{AppError, Result};
use crate::models::{AlbumItem, AlbumPage, Artist, SearchFilter, SearchItem, SearchResult, SongItem};
use crate::normalizer::first_tab_sections;
use crate::normalizer::renderer::{MusicThumbnailRenderer, Runs, ShelfListItem, build_song};

const ARTIST_ID_PREFIX: &str = "UC";
const ALBUM_ID_PREFIX: &str = "MPREb";

/// Result-type labels the catalog puts in front of artist names.
const TYPE_LABELS: [&str; 5] = ["Song", "Video", "Album", "Single", "EP"];

pub fn parse_search(response: &Value, filter: SearchFilter) -> SearchResult {
    let items = search_list_items(response)
        .into_iter()
        .filter_map(|item| match filter {
            SearchFilter::Songs => search_song(&item).map(SearchItem::Song),
            SearchFilter::Albums => search_album(&item).map(SearchItem::Album),
        })
        .collect();

    SearchResult { items }
}

fn search_list_items(response: &Value) -> Vec<ShelfListItem> {
    let sections = response
        .get("contents")
        .and_then(|c| c.get("tabbedSearchResultsRenderer"))
        .and_then(|t| t.get("tabs"))
        .and_then(Value::as_array)
        .and_then(|tabs| tabs.first())
        .and_then(|tab| tab.get("tabRenderer"))
        .and_then(|t| t.get("content"))
        .and_then(|c| c.get("sectionListRenderer"))
        .and_then(|s| s.get("contents"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    shelf_list_items(sections)
}

fn shelf_list_items(sections: &[Value]) -> Vec<ShelfListItem> {
    sections
        .iter()
        .filter_map(|section| {
            section
                .get("musicShelfRenderer")
                .and_then(|s| s.get("contents"))
                .and_then(Value::as_array)
        })
        .flatten()
        .filter_map(|entry| entry.get("musicResponsiveListItemRenderer"))
        .filter_map(|raw| match ShelfListItem::deserialize(raw) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(error = %e, "Skipping malformed list item");
                None
            }
        })
        .collect()
}

fn search_song(item: &ShelfListItem) -> Option<SongItem> {
    let video_id = item.video_id().or_else(|| {
        item.column_runs(0)
            .and_then(|runs| runs.runs.first())
            .and_then(|run| run.navigation_endpoint.as_ref())
            .and_then(|n| n.watch_endpoint.as_ref())
            .and_then(|w| w.video_id.as_deref())
    })?;
    let title = item.column_runs(0).and_then(Runs::first_text)?;

    let details = item.column_runs(1);
    let artists = details.map(artist_names).unwrap_or_default();
    let album = details.and_then(|runs| {
        runs.runs
            .iter()
            .find(|r| r.browse_id().is_some_and(|id| id.starts_with(ALBUM_ID_PREFIX)))
            .and_then(|r| r.text.clone())
    });
    let duration = details.and_then(|runs| {
        runs.runs
            .iter()
            .filter_map(|r| r.text.as_deref().and_then(parse_duration))
            .last()
    });

    let song = build_song(video_id, title).ok()?;
    Some(
        song.with_artists(artists)
            .with_album(album)
            .with_duration(duration)
            .with_thumbnails(item.thumbnails()),
    )
}

fn search_album(item: &ShelfListItem) -> Option<AlbumItem> {
    let browse_id = item
        .navigation_endpoint
        .as_ref()
        .and_then(|n| n.browse_endpoint.as_ref())
        .and_then(|b| b.browse_id.as_deref())
        .filter(|id| !id.is_empty())?;
    let title = item
        .column_runs(0)
        .and_then(Runs::first_text)
        .filter(|t| !t.trim().is_empty())?;

    let details = item.column_runs(1);
    let artists = details.map(linked_artists).filter(|a| !a.is_empty());
    let year = details.and_then(year_from_runs);

    Some(AlbumItem {
        browse_id: browse_id.to_string(),
        playlist_id: None,
        title: title.to_string(),
        artists,
        year,
        thumbnail: item
            .thumbnails()
            .last()
            .map(|t| t.url.clone())
            .unwrap_or_default(),
        explicit: item.is_explicit(),
    })
}

/// Runs that link to an artist page.
fn linked_artists(runs: &Runs) -> Vec<Artist> {
    runs.runs
        .iter()
        .filter_map(|r| {
            let id = r.browse_id().filter(|id| id.starts_with(ARTIST_ID_PREFIX))?;
            let name = r.text.as_deref()?;
            Some(Artist {
                name: name.to_string(),
                id: Some(id.to_string()),
            })
        })
        .collect()
}

/// Linked artist names, or the first plain run when nothing links to an artist.
fn artist_names(runs: &Runs) -> Vec<String> {
    let linked: Vec<String> = linked_artists(runs).into_iter().map(|a| a.name).collect();
    if !linked.is_empty() {
        return linked;
    }

    runs.runs
        .iter()
        .filter_map(|r| r.text.as_deref())
        .map(str::trim)
        .find(|text| {
            !text.is_empty()
                && *text != "•"
                && !TYPE_LABELS.contains(text)
                && parse_duration(text).is_none()
        })
        .map(|text| vec![text.to_string()])
        .unwrap_or_default()
}

fn year_from_runs(runs: &Runs) -> Option<i32> {
    runs.runs
        .iter()
        .filter_map(|r| r.text.as_deref())
        .find_map(parse_year)
}

fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

pub fn parse_suggestions(response: &Value) -> Vec<String> {
    response
        .get("contents")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|section| {
            section
                .get("searchSuggestionsSectionRenderer")
                .and_then(|s| s.get("contents"))
                .and_then(Value::as_array)
        })
        .flatten()
        .filter_map(|entry| {
            entry
                .get("searchSuggestionRenderer")
                .and_then(|r| r.get("suggestion"))
        })
        .filter_map(|raw| Runs::deserialize(raw).ok())
        .map(|runs| runs.joined())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumHeader {
    title: Option<Runs>,
    subtitle: Option<Runs>,
    strapline_text_one: Option<Runs>,
    thumbnail: Option<HeaderThumbnail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderThumbnail {
    music_thumbnail_renderer: Option<MusicThumbnailRenderer>,
    cropped_square_thumbnail_renderer: Option<MusicThumbnailRenderer>,
}

impl HeaderThumbnail {
    fn last_url(&self) -> Option<String> {
        [
            &self.music_thumbnail_renderer,
            &self.cropped_square_thumbnail_renderer,
        ]
        .into_iter()
        .flatten()
        .filter_map(|r| r.thumbnail.as_ref())
        .find_map(|list| list.to_thumbnails().pop())
        .map(|t| t.url)
    }
}

/// Parse an album browse page. Handles the two-column layout with a
/// responsive header and the older single-column layout with a detail header.
pub fn parse_album_page(browse_id: &str, response: &Value, with_songs: bool) -> Result<AlbumPage> {
    let two_column = response
        .get("contents")
        .and_then(|c| c.get("twoColumnBrowseResultsRenderer"));

    let header_raw = first_tab_sections(response)
        .iter()
        .find_map(|s| s.get("musicResponsiveHeaderRenderer"))
        .or_else(|| {
            response
                .get("header")
                .and_then(|h| h.get("musicDetailHeaderRenderer"))
        })
        .ok_or_else(|| AppError::Shape(format!("album {} has no header", browse_id)))?;

    let header = AlbumHeader::deserialize(header_raw)
        .map_err(|e| AppError::Shape(format!("album {} header: {}", browse_id, e)))?;

    let title = header
        .title
        .as_ref()
        .map(Runs::joined)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Shape(format!("album {} has no title", browse_id)))?;

    let mut artists: Vec<Artist> = header
        .strapline_text_one
        .as_ref()
        .map(linked_artists)
        .unwrap_or_default();
    if artists.is_empty() {
        artists = header
            .subtitle
            .as_ref()
            .map(linked_artists)
            .unwrap_or_default();
    }
    if artists.is_empty() {
        // Single-artist headers often carry the name without a link.
        if let Some(name) = header.strapline_text_one.as_ref().map(Runs::joined) {
            if !name.trim().is_empty() {
                artists.push(Artist { name, id: None });
            }
        }
    }

    let album = AlbumItem {
        browse_id: browse_id.to_string(),
        playlist_id: None,
        title,
        artists: Some(artists),
        year: header.subtitle.as_ref().and_then(year_from_runs),
        thumbnail: header
            .thumbnail
            .as_ref()
            .and_then(HeaderThumbnail::last_url)
            .unwrap_or_default(),
        explicit: false,
    };

    let songs = if with_songs {
        let track_sections = two_column
            .and_then(|t| t.get("secondaryContents"))
            .and_then(|s| s.get("sectionListRenderer"))
            .and_then(|s| s.get("contents"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_else(|| first_tab_sections(response));

        shelf_list_items(track_sections)
            .iter()
            .filter_map(|item| album_track(item, &album))
            .collect()
    } else {
        Vec::new()
    };

    Ok(AlbumPage { album, songs })
}

fn album_track(item: &ShelfListItem, album: &AlbumItem) -> Option<SongItem> {
    let video_id = item.video_id()?;
    let title = item.column_runs(0).and_then(Runs::first_text)?;

    let mut artists: Vec<String> = item
        .column_runs(1)
        .map(|runs| linked_artists(runs).into_iter().map(|a| a.name).collect())
        .unwrap_or_default();
    if artists.is_empty() {
        artists = album
            .artists
            .iter()
            .flatten()
            .map(|a| a.name.clone())
            .collect();
    }

    let duration = item
        .fixed_column_runs(0)
        .and_then(Runs::first_text)
        .and_then(parse_duration);

    let song = build_song(video_id, title).ok()?;
    Some(
        song.with_artists(artists)
            .with_album(Some(album.title.clone()))
            .with_duration(duration)
            .with_thumbnail(album.thumbnail.clone()),
    )
}
