//! Weekly playlist convergence
//!
//! Starting from the current show window, fetch what was played, match it to
//! catalog tracks, add anything new to the playlist and step one window back.
//! Stops when a window adds nothing or yields nothing (`Converged`), or when
//! the next window would fall before the week's anchor (`BoundaryReached`).
//!
//! Windows are processed strictly one after another: each round's additions
//! must be merged into the baseline before the next round computes its delta.

use chrono::NaiveDateTime;
use std::fmt;
use std::time::Duration;

use weekly_common::{
    Error, PlaylistId, PlaylistUpdate, Result, ShowWindow, TrackId, MAX_BATCH_SIZE,
};

use super::capabilities::{
    add_in_batches, find_or_create, members_of, RemoteCollection, TrackSearch, WindowSource,
};
use super::retry::{retry_while_rate_limited, DEFAULT_RATE_LIMIT_BACKOFF};
use super::track_matcher::select_track;
use crate::models::DesiredItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceState {
    Active,
    /// A window produced no new tracks
    Converged,
    /// Stepped back past the start of the week
    BoundaryReached,
}

impl fmt::Display for ConvergenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConvergenceState::Active => "active",
            ConvergenceState::Converged => "converged",
            ConvergenceState::BoundaryReached => "boundary reached",
        };
        f.write_str(s)
    }
}

/// Summary of a finished loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergenceOutcome {
    pub state: ConvergenceState,
    /// Windows fetched, including the last one
    pub windows: usize,
    pub tracks_added: usize,
    pub last_window: ShowWindow,
}

/// "mbe 24/03/10" for the week starting Sunday 2024-03-10
pub fn weekly_playlist_name(prefix: &str, anchor: NaiveDateTime) -> String {
    format!("{} {}", prefix, anchor.format("%y/%m/%d"))
}

pub struct ConvergenceLoop<'a> {
    source: &'a dyn WindowSource,
    tracks: &'a dyn TrackSearch,
    collection: &'a dyn RemoteCollection,
    batch_size: usize,
    backoff: Duration,
}

impl<'a> ConvergenceLoop<'a> {
    pub fn new(
        source: &'a dyn WindowSource,
        tracks: &'a dyn TrackSearch,
        collection: &'a dyn RemoteCollection,
    ) -> Self {
        Self {
            source,
            tracks,
            collection,
            batch_size: MAX_BATCH_SIZE,
            backoff: DEFAULT_RATE_LIMIT_BACKOFF,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Find or create the playlist for the week containing `start`, then run
    /// the loop against it
    pub async fn sync_weekly_playlist(
        &self,
        prefix: &str,
        start: ShowWindow,
    ) -> Result<ConvergenceOutcome> {
        let anchor = start.week_start();
        let name = weekly_playlist_name(prefix, anchor);
        tracing::info!(playlist = %name, "Generating weekly playlist");

        let playlist = find_or_create(self.collection, &name, self.backoff).await?;
        let before = members_of(self.collection, &playlist, self.backoff).await?;
        tracing::info!(playlist = %playlist, before = before.len(), "Loaded playlist");

        let mut update = PlaylistUpdate::new(before);
        self.run(&playlist, start, anchor, &mut update).await
    }

    /// Walk windows backward from `start` until converged or past `anchor`.
    /// A failed window fetch aborts the loop.
    pub async fn run(
        &self,
        playlist: &PlaylistId,
        start: ShowWindow,
        anchor: NaiveDateTime,
        update: &mut PlaylistUpdate,
    ) -> Result<ConvergenceOutcome> {
        let mut window = start;
        let mut windows = 0;
        let mut tracks_added = 0;

        let state = loop {
            let items = self
                .source
                .desired_items_for(&window)
                .await
                .map_err(|e| Error::ConvergenceAborted(format!("fetching {}: {}", window, e)))?;
            windows += 1;

            for item in &items {
                if let Some(id) = self.match_item(item).await {
                    update.record_desired(id);
                }
            }

            let to_add = update.ids_to_add().to_vec();
            tracing::info!(
                window = %window,
                items = items.len(),
                adding = to_add.len(),
                playlist = %playlist,
                "Processed window"
            );

            if !to_add.is_empty() {
                tracks_added += add_in_batches(
                    self.collection,
                    playlist,
                    &to_add,
                    self.batch_size,
                    self.backoff,
                )
                .await?;
                update.merge();
            }

            if to_add.is_empty() || items.is_empty() {
                break ConvergenceState::Converged;
            }

            let previous = window.previous();
            if previous.start() < anchor {
                break ConvergenceState::BoundaryReached;
            }
            window = previous;
        };

        tracing::info!(state = %state, windows, tracks_added, "Weekly playlist done");

        Ok(ConvergenceOutcome {
            state,
            windows,
            tracks_added,
            last_window: window,
        })
    }

    /// Search failures count as no match
    async fn match_item(&self, item: &DesiredItem) -> Option<TrackId> {
        let tracks = self.tracks;
        let query = item.candidate_track_ref.as_str();
        let found = retry_while_rate_limited("track search", self.backoff, move || {
            tracks.find_tracks(query)
        })
        .await;
        match found {
            Ok(candidates) => select_track(&item.display_title, &candidates).map(|t| t.id.clone()),
            Err(e) => {
                tracing::warn!(query, error = %e, "Track search failed");
                None
            }
        }
    }
}
