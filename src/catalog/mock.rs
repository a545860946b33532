//! Scripted catalog client for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::catalog::CatalogClient;
use crate::error::{AppError, Result};
use crate::models::{
    AlbumItem, AlbumPage, PlayerResponse, SearchFilter, SearchItem, SearchResult, SongItem,
};

/// What the mock does when a given query arrives.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail(String),
    Panic,
    Slow(Duration, T),
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail(message) => Err(AppError::Upstream(message.clone())),
            Reply::Panic => panic!("mock catalog panicked"),
            Reply::Slow(delay, value) => {
                tokio::time::sleep(*delay).await;
                Ok(value.clone())
            }
        }
    }
}

/// Catalog client answering from per-surface / per-query scripts.
///
/// Anything not scripted fails with an upstream error, so tests only have
/// to describe the calls they expect to succeed.
#[derive(Default)]
pub struct MockCatalog {
    browse: HashMap<String, Reply<Value>>,
    searches: HashMap<(String, SearchFilter), Reply<SearchResult>>,
    players: HashMap<String, Reply<PlayerResponse>>,
    suggestions: HashMap<String, Reply<Vec<String>>>,
    albums: HashMap<String, Reply<AlbumPage>>,
    calls: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_browse(mut self, surface: &str, reply: Reply<Value>) -> Self {
        self.browse.insert(surface.to_string(), reply);
        self
    }

    pub fn with_song_search(mut self, query: &str, reply: Reply<Vec<SongItem>>) -> Self {
        let reply = map_reply(reply, |songs| SearchResult {
            items: songs.into_iter().map(SearchItem::Song).collect(),
        });
        self.searches
            .insert((query.to_string(), SearchFilter::Songs), reply);
        self
    }

    pub fn with_album_search(mut self, query: &str, reply: Reply<Vec<AlbumItem>>) -> Self {
        let reply = map_reply(reply, |albums| SearchResult {
            items: albums.into_iter().map(SearchItem::Album).collect(),
        });
        self.searches
            .insert((query.to_string(), SearchFilter::Albums), reply);
        self
    }

    pub fn with_player(mut self, video_id: &str, reply: Reply<PlayerResponse>) -> Self {
        self.players.insert(video_id.to_string(), reply);
        self
    }

    pub fn with_suggestions(mut self, query: &str, reply: Reply<Vec<String>>) -> Self {
        self.suggestions.insert(query.to_string(), reply);
        self
    }

    pub fn with_album_page(mut self, browse_id: &str, reply: Reply<AlbumPage>) -> Self {
        self.albums.insert(browse_id.to_string(), reply);
        self
    }

    /// Every call received, in arrival order, e.g. `search songs "top songs"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn map_reply<A, B>(reply: Reply<A>, f: impl FnOnce(A) -> B) -> Reply<B> {
    match reply {
        Reply::Ok(value) => Reply::Ok(f(value)),
        Reply::Fail(message) => Reply::Fail(message),
        Reply::Panic => Reply::Panic,
        Reply::Slow(delay, value) => Reply::Slow(delay, f(value)),
    }
}

fn unscripted<T>(call: &str) -> Result<T> {
    Err(AppError::Upstream(format!("unscripted call: {}", call)))
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn search(&self, query: &str, filter: SearchFilter) -> Result<SearchResult> {
        let call = format!("search {} \"{}\"", filter, query);
        self.record(call.clone());
        match self.searches.get(&(query.to_string(), filter)) {
            Some(reply) => reply.resolve().await,
            None => unscripted(&call),
        }
    }

    async fn browse(&self, surface_id: &str) -> Result<Value> {
        let call = format!("browse {}", surface_id);
        self.record(call.clone());
        match self.browse.get(surface_id) {
            Some(reply) => reply.resolve().await,
            None => unscripted(&call),
        }
    }

    async fn player(&self, video_id: &str) -> Result<PlayerResponse> {
        let call = format!("player {}", video_id);
        self.record(call.clone());
        match self.players.get(video_id) {
            Some(reply) => reply.resolve().await,
            None => unscripted(&call),
        }
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>> {
        let call = format!("suggestions \"{}\"", query);
        self.record(call.clone());
        match self.suggestions.get(query) {
            Some(reply) => reply.resolve().await,
            None => unscripted(&call),
        }
    }

    async fn album_page(&self, browse_id: &str, with_songs: bool) -> Result<AlbumPage> {
        let call = format!("album {} songs={}", browse_id, with_songs);
        self.record(call.clone());
        match self.albums.get(browse_id) {
            Some(reply) => reply.resolve().await,
            None => unscripted(&call),
        }
    }
}

/// A browse tree with one carousel shelf holding one song tile per `(video_id, title)`.
pub fn browse_tree_with_songs(songs: &[(&str, &str)]) -> Value {
    let tiles: Vec<Value> = songs
        .iter()
        .map(|(video_id, title)| {
            json!({"musicTwoRowItemRenderer": {
                "title": {"runs": [{"text": title}]},
                "subtitle": {"runs": [{"text": "Song"}, {"text": " • "}, {"text": "3:30"}]},
                "navigationEndpoint": {"watchEndpoint": {"videoId": video_id}}
            }})
        })
        .collect();

    json!({"contents": {"singleColumnBrowseResultsRenderer": {"tabs": [{"tabRenderer": {
        "content": {"sectionListRenderer": {"contents": [
            {"musicCarouselShelfRenderer": {"contents": tiles}}
        ]}}
    }}]}}})
}

/// A browse tree whose only shelf holds playlists, which normalize to nothing.
pub fn browse_tree_without_songs() -> Value {
    json!({"contents": {"singleColumnBrowseResultsRenderer": {"tabs": [{"tabRenderer": {
        "content": {"sectionListRenderer": {"contents": [
            {"musicCarouselShelfRenderer": {"contents": [
                {"musicTwoRowItemRenderer": {
                    "title": {"runs": [{"text": "Chill mix"}]},
                    "navigationEndpoint": {"browseEndpoint": {"browseId": "VLRDCLAK"}}
                }}
            ]}}
        ]}}
    }}]}}})
}
