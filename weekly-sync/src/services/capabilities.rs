//! Injected capabilities
//!
//! The sync core never talks HTTP directly. Everything it needs from the
//! music catalog, the radio tracklist and the venue listings goes through
//! these traits, so tests can swap in scripted fakes.

use async_trait::async_trait;
use std::time::Duration;
use weekly_common::{batches, ArtistId, PlaylistId, Result, ShowWindow, TrackId};

use super::retry::retry_while_rate_limited;
use crate::models::{CatalogArtist, CatalogTrack, DesiredItem, VenueEvent};

/// Ranked artist search
#[async_trait]
pub trait SearchCapability: Send + Sync {
    /// First page of artists ranked by the catalog. May fail with
    /// `Error::RateLimited` or `Error::SearchFailed`.
    async fn find_artist(&self, name: &str) -> Result<Vec<CatalogArtist>>;
}

#[async_trait]
pub trait CatalogCapability: Send + Sync {
    /// Most popular tracks first. Callers truncate.
    async fn top_tracks(&self, artist: &ArtistId) -> Result<Vec<TrackId>>;
}

/// Ranked free-text track search
#[async_trait]
pub trait TrackSearch: Send + Sync {
    async fn find_tracks(&self, query: &str) -> Result<Vec<CatalogTrack>>;
}

/// A remote playlist store
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Case-insensitive lookup by playlist name
    async fn find_by_name(&self, name: &str) -> Result<Option<PlaylistId>>;

    async fn create(&self, name: &str) -> Result<PlaylistId>;

    /// Flattened across all pages, in playlist order
    async fn current_members(&self, playlist: &PlaylistId) -> Result<Vec<TrackId>>;

    /// At most `MAX_BATCH_SIZE` ids per call
    async fn apply_add(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()>;

    /// At most `MAX_BATCH_SIZE` ids per call
    async fn apply_remove(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()>;
}

/// Desired items for one show window
#[async_trait]
pub trait WindowSource: Send + Sync {
    async fn desired_items_for(&self, window: &ShowWindow) -> Result<Vec<DesiredItem>>;
}

/// Upcoming events at a venue
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn upcoming_events(&self, venue_id: &str) -> Result<Vec<VenueEvent>>;
}

// Collection helpers. Each remote call retries while rate limited.

/// Case-insensitive playlist lookup
pub async fn lookup_playlist(
    collection: &dyn RemoteCollection,
    name: &str,
    backoff: Duration,
) -> Result<Option<PlaylistId>> {
    retry_while_rate_limited("playlist lookup", backoff, move || collection.find_by_name(name))
        .await
}

/// Current playlist contents, in playlist order
pub async fn members_of(
    collection: &dyn RemoteCollection,
    playlist: &PlaylistId,
    backoff: Duration,
) -> Result<Vec<TrackId>> {
    retry_while_rate_limited("playlist members", backoff, move || {
        collection.current_members(playlist)
    })
    .await
}

/// Add `ids` in order, `batch_size` at a time. Returns the number added.
pub async fn add_in_batches(
    collection: &dyn RemoteCollection,
    playlist: &PlaylistId,
    ids: &[TrackId],
    batch_size: usize,
    backoff: Duration,
) -> Result<usize> {
    for batch in batches(ids, batch_size) {
        retry_while_rate_limited("playlist add", backoff, move || {
            collection.apply_add(playlist, batch)
        })
        .await?;
        tracing::debug!(playlist = %playlist, count = batch.len(), "Added batch");
    }
    Ok(ids.len())
}

/// Remove `ids`, `batch_size` at a time. Returns the number removed.
pub async fn remove_in_batches(
    collection: &dyn RemoteCollection,
    playlist: &PlaylistId,
    ids: &[TrackId],
    batch_size: usize,
    backoff: Duration,
) -> Result<usize> {
    for batch in batches(ids, batch_size) {
        retry_while_rate_limited("playlist remove", backoff, move || {
            collection.apply_remove(playlist, batch)
        })
        .await?;
        tracing::debug!(playlist = %playlist, count = batch.len(), "Removed batch");
    }
    Ok(ids.len())
}

/// Look a playlist up by name, creating it when missing
pub async fn find_or_create(
    collection: &dyn RemoteCollection,
    name: &str,
    backoff: Duration,
) -> Result<PlaylistId> {
    if let Some(id) = lookup_playlist(collection, name, backoff).await? {
        return Ok(id);
    }
    tracing::info!(playlist = %name, "Creating playlist");
    retry_while_rate_limited("playlist create", backoff, move || collection.create(name)).await
}
