//! Spotify Web API client
//!
//! Artist and track search, top tracks, and playlist membership. Takes an
//! already-issued bearer token; obtaining one is left to the operator.
//!
//! HTTP 429 is reported as `Error::RateLimited` so callers can back off and
//! retry. Paginated listings are followed to the end and flattened.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use weekly_common::config::SpotifyConfig;
use weekly_common::{ArtistId, Error, PlaylistId, Result, TrackId};

use super::capabilities::{CatalogCapability, RemoteCollection, SearchCapability, TrackSearch};
use crate::models::{CatalogArtist, CatalogTrack};

const USER_AGENT: &str = concat!("weekly-sync/", env!("CARGO_PKG_VERSION"));
const PLAYLISTS_PAGE_SIZE: &str = "20";
const PLAYLIST_TRACKS_PAGE_SIZE: &str = "100";

/// Paging object wrapping every list response
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    /// Local files have no id
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    artists: Option<Page<ArtistObject>>,
    tracks: Option<Page<TrackObject>>,
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    #[serde(default)]
    tracks: Vec<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct PlaylistObject {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[allow(dead_code)]
    snapshot_id: Option<String>,
}

impl TrackObject {
    fn into_catalog_track(self) -> Option<CatalogTrack> {
        Some(CatalogTrack {
            id: TrackId::new(self.id?),
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
        })
    }
}

fn track_uri(id: &TrackId) -> String {
    format!("spotify:track:{}", id)
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    api_base: String,
    market: String,
    user: Option<String>,
    access_token: String,
}

impl SpotifyClient {
    /// Fails when no access token is configured
    pub fn new(config: &SpotifyConfig) -> Result<Self> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("spotify.access_token is not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            market: config.market.clone(),
            user: config.user.clone(),
            access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send with auth, mapping 429 to `RateLimited` and other failures
    /// through `wrap`
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        wrap: fn(String) -> Error,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| wrap(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(wrap(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        response.json::<T>().await.map_err(|e| wrap(e.to_string()))
    }

    async fn search(&self, kind: &str, query: &str) -> Result<SearchResponse> {
        tracing::debug!(kind, query, "Searching catalog");
        let request = self
            .http_client
            .get(self.url("/search"))
            .query(&[("type", kind), ("q", query), ("market", self.market.as_str())]);
        self.send(request, Error::SearchFailed).await
    }

    /// Follow `next` links from a first request, collecting every item
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: RequestBuilder,
        wrap: fn(String) -> Error,
    ) -> Result<Vec<T>> {
        let mut page: Page<T> = self.send(first, wrap).await?;
        let mut items = std::mem::take(&mut page.items);
        while let Some(next) = page.next.take() {
            page = self.send(self.http_client.get(&next), wrap).await?;
            items.append(&mut page.items);
        }
        Ok(items)
    }
}

#[async_trait]
impl SearchCapability for SpotifyClient {
    async fn find_artist(&self, name: &str) -> Result<Vec<CatalogArtist>> {
        let response = self.search("artist", name).await?;
        Ok(response
            .artists
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .map(|a| CatalogArtist::new(a.id, a.name))
            .collect())
    }
}

#[async_trait]
impl TrackSearch for SpotifyClient {
    async fn find_tracks(&self, query: &str) -> Result<Vec<CatalogTrack>> {
        let response = self.search("track", query).await?;
        Ok(response
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(TrackObject::into_catalog_track)
            .collect())
    }
}

#[async_trait]
impl CatalogCapability for SpotifyClient {
    async fn top_tracks(&self, artist: &ArtistId) -> Result<Vec<TrackId>> {
        let request = self
            .http_client
            .get(self.url(&format!("/artists/{}/top-tracks", artist)))
            .query(&[("market", self.market.as_str())]);
        let response: TopTracksResponse = self.send(request, Error::SearchFailed).await?;
        Ok(response
            .tracks
            .into_iter()
            .filter_map(|t| t.id.map(TrackId::new))
            .collect())
    }
}

#[async_trait]
impl RemoteCollection for SpotifyClient {
    async fn find_by_name(&self, name: &str) -> Result<Option<PlaylistId>> {
        let first = self
            .http_client
            .get(self.url("/me/playlists"))
            .query(&[("limit", PLAYLISTS_PAGE_SIZE)]);
        let playlists: Vec<PlaylistObject> = self.collect_pages(first, Error::FetchFailed).await?;
        let wanted = name.to_lowercase();
        Ok(playlists
            .into_iter()
            .find(|p| p.name.to_lowercase() == wanted)
            .map(|p| PlaylistId::new(p.id)))
    }

    async fn create(&self, name: &str) -> Result<PlaylistId> {
        let path = match &self.user {
            Some(user) => format!("/users/{}/playlists", user),
            None => "/me/playlists".to_string(),
        };
        let request = self
            .http_client
            .post(self.url(&path))
            .json(&json!({ "name": name, "public": true }));
        let created: PlaylistObject = self.send(request, Error::CollectionUpdate).await?;
        tracing::info!(playlist = %created.id, name = %created.name, "Created playlist");
        Ok(PlaylistId::new(created.id))
    }

    async fn current_members(&self, playlist: &PlaylistId) -> Result<Vec<TrackId>> {
        let first = self
            .http_client
            .get(self.url(&format!("/playlists/{}/tracks", playlist)))
            .query(&[("limit", PLAYLIST_TRACKS_PAGE_SIZE)]);
        let items: Vec<PlaylistItem> = self.collect_pages(first, Error::FetchFailed).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.track.and_then(|t| t.id))
            .map(TrackId::new)
            .collect())
    }

    async fn apply_add(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()> {
        let uris: Vec<String> = ids.iter().map(track_uri).collect();
        let request = self
            .http_client
            .post(self.url(&format!("/playlists/{}/tracks", playlist)))
            .json(&json!({ "uris": uris }));
        let _: SnapshotResponse = self.send(request, Error::CollectionUpdate).await?;
        Ok(())
    }

    async fn apply_remove(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()> {
        let tracks: Vec<serde_json::Value> =
            ids.iter().map(|id| json!({ "uri": track_uri(id) })).collect();
        let request = self
            .http_client
            .delete(self.url(&format!("/playlists/{}/tracks", playlist)))
            .json(&json!({ "tracks": tracks }));
        let _: SnapshotResponse = self.send(request, Error::CollectionUpdate).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> SpotifyConfig {
        SpotifyConfig {
            access_token: token.map(String::from),
            api_base: "https://api.example/v1/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_requires_token() {
        assert!(matches!(SpotifyClient::new(&config(None)), Err(Error::Config(_))));
        assert!(matches!(SpotifyClient::new(&config(Some("  "))), Err(Error::Config(_))));
        let client = SpotifyClient::new(&config(Some("token"))).unwrap();
        assert_eq!(client.url("/search"), "https://api.example/v1/search");
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "tracks": {
                "items": [
                    {"id": "t1", "name": "Loser", "artists": [{"id": "a1", "name": "Beck"}]},
                    {"id": null, "name": "Local file"}
                ],
                "next": null
            }
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.artists.is_none());
        let tracks: Vec<CatalogTrack> = response
            .tracks
            .unwrap()
            .items
            .into_iter()
            .filter_map(TrackObject::into_catalog_track)
            .collect();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].main_artist(), Some("Beck"));
    }

    #[test]
    fn test_parse_playlist_page() {
        let json = r#"{
            "items": [{"track": {"id": "t1", "name": "A"}}, {"track": null}],
            "next": "https://api.example/v1/playlists/p/tracks?offset=100"
        }"#;
        let page: Page<PlaylistItem> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next.is_some());
    }

    #[test]
    fn test_track_uri() {
        assert_eq!(track_uri(&TrackId::new("abc")), "spotify:track:abc");
    }
}
