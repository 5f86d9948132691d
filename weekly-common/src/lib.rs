//! # Weekly Playlist Common Library
//!
//! Shared, I/O-free building blocks for the weekly playlist sync:
//! - Error type and result alias
//! - Configuration loading
//! - Opaque catalog identifiers
//! - Ordered track sets and playlist reconciliation
//! - Show window and week arithmetic
//! - Logging setup

pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod playlist_update;
pub mod time;
pub mod track_set;

pub use error::{Error, Result};
pub use ids::{ArtistId, PlaylistId, TrackId};
pub use playlist_update::{batches, PlaylistUpdate, MAX_BATCH_SIZE};
pub use time::ShowWindow;
pub use track_set::{OrderedSet, TrackSet};
