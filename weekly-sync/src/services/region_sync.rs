//! Region playlists
//!
//! Every region owns a playlist named "<Region> weekly" holding the top
//! tracks of the artists playing its venues over the coming week. Artists
//! are guessed from event titles and resolved against the catalog, sharing
//! one cache across all regions of a run.
//!
//! Removals are applied before additions so the playlist never temporarily
//! holds both weeks' tracks.

use std::time::Duration;

use weekly_common::{PlaylistId, PlaylistUpdate, Result, TrackId, MAX_BATCH_SIZE};

use super::artist_resolver::{resolve, ArtistCache, ResolvedArtist};
use super::capabilities::{
    add_in_batches, lookup_playlist, members_of, remove_in_batches, CatalogCapability,
    EventSource, RemoteCollection, SearchCapability,
};
use super::retry::{retry_while_rate_limited, DEFAULT_RATE_LIMIT_BACKOFF};
use crate::guessing::Decomposer;
use crate::models::{Region, VenueEvent};

#[derive(Debug, Clone)]
pub struct RegionSyncOptions {
    pub top_tracks_per_artist: usize,
    pub batch_size: usize,
    pub playlist_suffix: String,
    /// Decompose and resolve only; leave playlists untouched
    pub guess_only: bool,
    pub rate_limit_backoff: Duration,
}

impl Default for RegionSyncOptions {
    fn default() -> Self {
        Self {
            top_tracks_per_artist: 3,
            batch_size: MAX_BATCH_SIZE,
            playlist_suffix: "weekly".to_string(),
            guess_only: false,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
        }
    }
}

/// What happened to one region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionReport {
    pub region: String,
    pub playlist: Option<PlaylistId>,
    pub events: usize,
    pub artists: usize,
    /// Event titles for which no artist was found
    pub without_tracks: Vec<String>,
    pub added: usize,
    pub removed: usize,
}

pub struct RegionSync<'a> {
    events: &'a dyn EventSource,
    search: &'a dyn SearchCapability,
    catalog: &'a dyn CatalogCapability,
    collection: &'a dyn RemoteCollection,
    decomposer: Decomposer,
    options: RegionSyncOptions,
}

impl<'a> RegionSync<'a> {
    pub fn new(
        events: &'a dyn EventSource,
        search: &'a dyn SearchCapability,
        catalog: &'a dyn CatalogCapability,
        collection: &'a dyn RemoteCollection,
        options: RegionSyncOptions,
    ) -> Self {
        Self {
            events,
            search,
            catalog,
            collection,
            decomposer: Decomposer::default(),
            options,
        }
    }

    pub fn with_decomposer(mut self, decomposer: Decomposer) -> Self {
        self.decomposer = decomposer;
        self
    }

    /// Sync every region in order. Stops at the first region whose playlist
    /// cannot be read or updated.
    pub async fn sync_all(
        &self,
        regions: &[Region],
        cache: &mut ArtistCache,
    ) -> Result<Vec<RegionReport>> {
        let mut reports = Vec::with_capacity(regions.len());
        for region in regions {
            reports.push(self.sync_region(region, cache).await?);
        }
        Ok(reports)
    }

    pub async fn sync_region(
        &self,
        region: &Region,
        cache: &mut ArtistCache,
    ) -> Result<RegionReport> {
        let backoff = self.options.rate_limit_backoff;
        let title = region.playlist_name(&self.options.playlist_suffix);
        tracing::info!(
            region = %region.name,
            playlist = %title,
            venues = region.venue_ids.len(),
            "Syncing region"
        );

        let playlist = lookup_playlist(self.collection, &title, backoff).await?;
        let mut report = RegionReport {
            region: region.name.clone(),
            playlist: playlist.clone(),
            ..Default::default()
        };

        let mut desired: Vec<TrackId> = Vec::new();
        for venue_id in &region.venue_ids {
            let events = match self.events.upcoming_events(venue_id).await {
                Ok(events) => events,
                Err(e) => {
                    tracing::warn!(venue = %venue_id, error = %e, "Skipping venue");
                    continue;
                }
            };
            tracing::info!(venue = %venue_id, events = events.len(), "Venue events");

            for event in &events {
                report.events += 1;
                let tracks = self.tracks_for_event(event, cache, &mut report).await;
                desired.extend(tracks);
            }
        }

        let Some(playlist) = playlist else {
            tracing::info!(playlist = %title, "No existing playlist");
            return Ok(report);
        };
        if self.options.guess_only {
            tracing::info!(
                playlist = %title,
                desired = desired.len(),
                "Guess only, leaving playlist untouched"
            );
            return Ok(report);
        }

        let before = members_of(self.collection, &playlist, backoff).await?;
        let mut update = PlaylistUpdate::new(before);
        for id in desired {
            update.record_desired(id);
        }

        let to_remove = update.ids_to_remove().to_vec();
        let to_add = update.ids_to_add().to_vec();
        tracing::info!(
            playlist = %title,
            adding = to_add.len(),
            removing = to_remove.len(),
            "Updating playlist"
        );

        let batch_size = self.options.batch_size;
        report.removed =
            remove_in_batches(self.collection, &playlist, &to_remove, batch_size, backoff).await?;
        report.added =
            add_in_batches(self.collection, &playlist, &to_add, batch_size, backoff).await?;

        Ok(report)
    }

    async fn tracks_for_event(
        &self,
        event: &VenueEvent,
        cache: &mut ArtistCache,
        report: &mut RegionReport,
    ) -> Vec<TrackId> {
        tracing::info!(event = %event.name, "Event");
        let tree = self.decomposer.decompose(&event.name);
        let artists = resolve(&tree, self.search, cache, self.options.rate_limit_backoff).await;

        let mut tracks = Vec::new();
        for artist in artists.values() {
            let top = self.top_tracks(artist).await;
            tracing::info!(artist = %artist.catalog_name, tracks = top.len(), "Artist tracks");
            tracks.extend(top);
            report.artists += 1;
        }

        if artists.is_empty() {
            tracing::info!(event = %event.name, "No tracks");
            report.without_tracks.push(event.name.clone());
        }
        tracks
    }

    /// Failures give the artist no tracks
    async fn top_tracks(&self, artist: &ResolvedArtist) -> Vec<TrackId> {
        let catalog = self.catalog;
        let id = &artist.catalog_id;
        let backoff = self.options.rate_limit_backoff;
        let found =
            retry_while_rate_limited("top tracks", backoff, move || catalog.top_tracks(id)).await;
        match found {
            Ok(mut tracks) => {
                tracks.truncate(self.options.top_tracks_per_artist);
                tracks
            }
            Err(e) => {
                tracing::warn!(artist = %artist.catalog_name, error = %e, "Top tracks failed");
                Vec::new()
            }
        }
    }
}
