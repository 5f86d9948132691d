//! Add/remove delta between a playlist's current tracks and the desired ones
//!
//! A `PlaylistUpdate` starts from the playlist's membership at the beginning
//! of a run ("before") and collects desired tracks as they are discovered.
//! Duplicates and tracks already present are fine to record; the deltas
//! filter them out.
//!
//! [`PlaylistUpdate::merge`] commits a round: proposed additions join the
//! baseline and proposed removals are marked as queued. Neither is proposed
//! again, so a caller that walks several rounds (one per show window) only
//! ever sees the changes that are new in that round.

use crate::ids::TrackId;
use crate::track_set::OrderedSet;
use std::hash::Hash;

/// Hard limit on ids per add/remove request imposed by the playlist API
pub const MAX_BATCH_SIZE: usize = 50;

/// Reconciliation state for one playlist
#[derive(Debug, Clone)]
pub struct PlaylistUpdate<T = TrackId> {
    before: OrderedSet<T>,
    after: Vec<T>,
    queued_removals: OrderedSet<T>,
}

impl<T: Eq + Hash + Clone> PlaylistUpdate<T> {
    /// Start from the playlist's current members
    pub fn new<I: IntoIterator<Item = T>>(before: I) -> Self {
        Self {
            before: before.into_iter().collect(),
            after: Vec::new(),
            queued_removals: OrderedSet::new(),
        }
    }

    /// Record a desired track. Duplicates are allowed.
    pub fn record_desired(&mut self, id: T) {
        self.after.push(id);
    }

    /// Recorded tracks not already in the baseline, deduplicated, in
    /// first-occurrence order
    pub fn ids_to_add(&self) -> OrderedSet<T> {
        self.after
            .iter()
            .filter(|id| !self.before.contains(id))
            .cloned()
            .collect()
    }

    /// Baseline tracks that nobody asked for and that no earlier round
    /// already queued for removal. Order is irrelevant to the remote API.
    pub fn ids_to_remove(&self) -> OrderedSet<T> {
        let desired: OrderedSet<T> = self.after.iter().cloned().collect();
        self.before
            .difference(&desired)
            .difference(&self.queued_removals)
    }

    /// Commit the round: additions join the baseline, removals are queued
    pub fn merge(&mut self) {
        let removals = self.ids_to_remove();
        self.queued_removals.merge(removals);
        let recorded = self.after.clone();
        self.before.merge(recorded);
    }

    /// True when `id` is part of the current baseline
    pub fn contains(&self, id: &T) -> bool {
        self.before.contains(id)
    }

    /// Baseline with queued removals taken out
    pub fn baseline(&self) -> OrderedSet<T> {
        self.before.difference(&self.queued_removals)
    }

    /// Number of desired ids recorded so far, duplicates included
    pub fn recorded(&self) -> usize {
        self.after.len()
    }
}

/// Split `ids` into consecutive chunks of at most `batch_size` items,
/// clamped to [`MAX_BATCH_SIZE`]
pub fn batches<T>(ids: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    ids.chunks(batch_size.clamp(1, MAX_BATCH_SIZE))
}
