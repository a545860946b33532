//! Converts raw browse responses into [`SongItem`] lists, best effort.
//!
//! Entries that fail to convert are dropped one at a time; the rest of the
//! section still converts. An unparseable section yields an empty list.

pub mod renderer;

use serde_json::Value;
use tracing::{debug, trace};

use crate::models::SongItem;

pub use renderer::{EntryError, Renderer};

/// Convert one section's raw entries into songs, in input order.
pub fn normalize<'a, I>(entries: I) -> Vec<SongItem>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut songs = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        for shape in Renderer::classify(entry) {
            let renderer = match shape {
                Ok(renderer) => renderer,
                Err(e) => {
                    debug!(index, error = %e, "Skipping malformed renderer");
                    continue;
                }
            };

            match renderer.to_song() {
                Ok(song) => songs.push(song),
                Err(EntryError::Unrecognized) => {
                    trace!(index, "Skipping entry with no known renderer");
                }
                Err(e) => {
                    debug!(index, renderer = renderer.kind(), error = %e, "Dropping feed entry");
                }
            }
        }
    }

    songs
}

/// Walk a structured browse response down to its shelf entries and normalize them.
pub fn normalize_browse(tree: &Value) -> Vec<SongItem> {
    normalize(browse_entries(tree))
}

/// Every entry of every carousel and list shelf in the first tab of a browse response.
pub fn browse_entries(tree: &Value) -> Vec<&Value> {
    let mut entries = Vec::new();

    for section in first_tab_sections(tree) {
        if let Some(items) = section
            .get("musicCarouselShelfRenderer")
            .and_then(|s| s.get("contents"))
            .and_then(Value::as_array)
        {
            entries.extend(items);
        }

        if let Some(items) = section
            .get("musicShelfRenderer")
            .and_then(|s| s.get("contents"))
            .and_then(Value::as_array)
        {
            entries.extend(items);
        }
    }

    entries
}

/// Sections of `sectionListRenderer` under the first tab, for either browse layout.
pub fn first_tab_sections(tree: &Value) -> &[Value] {
    let contents = tree.get("contents");

    ["singleColumnBrowseResultsRenderer", "twoColumnBrowseResultsRenderer"]
        .iter()
        .find_map(|layout| {
            contents
                .and_then(|c| c.get(*layout))
                .and_then(|l| l.get("tabs"))
                .and_then(Value::as_array)
                .and_then(|tabs| tabs.first())
                .and_then(|tab| tab.get("tabRenderer"))
                .and_then(|t| t.get("content"))
                .and_then(|c| c.get("sectionListRenderer"))
                .and_then(|s| s.get("contents"))
                .and_then(Value::as_array)
        })
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
