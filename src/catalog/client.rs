use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::CatalogClient;
use crate::catalog::parse::{parse_album_page, parse_search, parse_suggestions};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{AlbumPage, PlayerResponse, SearchFilter, SearchResult};

const WEB_CLIENT_NAME: &str = "WEB_REMIX";
const PLAYER_CLIENT_NAME: &str = "ANDROID_MUSIC";
const ANDROID_SDK_VERSION: u32 = 30;
const ORIGIN: &str = "https://music.youtube.com";

const SONGS_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const ALBUMS_PARAMS: &str = "EgWKAQIYAWoMEA4QChADEAQQCRAF";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientContext {
    client_name: &'static str,
    client_version: String,
    hl: String,
    gl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    android_sdk_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
struct RequestContext {
    client: ClientContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrowseRequest<'a> {
    context: &'a RequestContext,
    browse_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    context: &'a RequestContext,
    query: &'a str,
    params: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRequest<'a> {
    context: &'a RequestContext,
    video_id: &'a str,
    content_check_ok: bool,
    racy_check_ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionsRequest<'a> {
    context: &'a RequestContext,
    input: &'a str,
}

/// Catalog client for the YouTube Music InnerTube API.
pub struct InnerTubeClient {
    http_client: Client,
    base_url: Url,
    web_context: RequestContext,
    player_context: RequestContext,
}

impl InnerTubeClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL: {}", e)))?;

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let web_context = RequestContext {
            client: ClientContext {
                client_name: WEB_CLIENT_NAME,
                client_version: config.client_version.clone(),
                hl: config.language.clone(),
                gl: config.region.clone(),
                android_sdk_version: None,
            },
        };

        let player_context = RequestContext {
            client: ClientContext {
                client_name: PLAYER_CLIENT_NAME,
                client_version: config.player_client_version.clone(),
                hl: config.language.clone(),
                gl: config.region.clone(),
                android_sdk_version: Some(ANDROID_SDK_VERSION),
            },
        };

        Ok(Self {
            http_client,
            base_url,
            web_context,
            player_context,
        })
    }

    async fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| AppError::Config(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        debug!(%url, "InnerTube request");

        let response = self
            .http_client
            .post(url)
            .query(&[("prettyPrint", "false")])
            .header("Origin", ORIGIN)
            .header("Referer", format!("{}/", ORIGIN))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("InnerTube {} failed ({}): {}", endpoint, status, error_text);
            return Err(AppError::Upstream(format!("{} returned {}", endpoint, status)));
        }

        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(AppError::Upstream(format!("{}: {}", endpoint, message)));
        }

        Ok(body)
    }
}

#[async_trait]
impl CatalogClient for InnerTubeClient {
    async fn search(&self, query: &str, filter: SearchFilter) -> Result<SearchResult> {
        let params = match filter {
            SearchFilter::Songs => SONGS_PARAMS,
            SearchFilter::Albums => ALBUMS_PARAMS,
        };

        let request = SearchRequest {
            context: &self.web_context,
            query,
            params,
        };

        let response = self.post("search", &request).await?;
        Ok(parse_search(&response, filter))
    }

    async fn browse(&self, surface_id: &str) -> Result<Value> {
        let request = BrowseRequest {
            context: &self.web_context,
            browse_id: surface_id,
        };

        self.post("browse", &request).await
    }

    async fn player(&self, video_id: &str) -> Result<PlayerResponse> {
        let request = PlayerRequest {
            context: &self.player_context,
            video_id,
            content_check_ok: true,
            racy_check_ok: true,
        };

        let response = self.post("player", &request).await?;

        if let Some(status) = response
            .get("playabilityStatus")
            .and_then(|p| p.get("status"))
            .and_then(Value::as_str)
        {
            if status != "OK" {
                debug!(video_id, status, "Video is not playable");
            }
        }

        Ok(serde_json::from_value(response)?)
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>> {
        let request = SuggestionsRequest {
            context: &self.web_context,
            input: query,
        };

        let response = self.post("music/get_search_suggestions", &request).await?;
        Ok(parse_suggestions(&response))
    }

    async fn album_page(&self, browse_id: &str, with_songs: bool) -> Result<AlbumPage> {
        let response = self.browse(browse_id).await?;
        parse_album_page(browse_id, &response, with_songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_base_url() {
        let config = Config {
            base_url: "::nope".to_string(),
            ..Config::default()
        };
        assert!(matches!(InnerTubeClient::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_endpoints_join_onto_base() {
        let client = InnerTubeClient::new(&Config::default()).unwrap();
        let url = client.base_url.join("music/get_search_suggestions").unwrap();
        assert_eq!(
            url.as_str(),
            "https://music.youtube.com/youtubei/v1/music/get_search_suggestions"
        );
    }

    #[test]
    fn test_player_context_serializes_android_fields() {
        let client = InnerTubeClient::new(&Config::default()).unwrap();
        let request = PlayerRequest {
            context: &client.player_context,
            video_id: "abc",
            content_check_ok: true,
            racy_check_ok: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["videoId"], "abc");
        assert_eq!(json["context"]["client"]["clientName"], "ANDROID_MUSIC");
        assert_eq!(json["context"]["client"]["androidSdkVersion"], 30);

        let browse = BrowseRequest {
            context: &client.web_context,
            browse_id: "FEmusic_home",
        };
        let json = serde_json::to_value(&browse).unwrap();
        assert_eq!(json["browseId"], "FEmusic_home");
        assert!(json["context"]["client"].get("androidSdkVersion").is_none());
    }
}
