//! Services for weekly-sync
//!
//! - Capability traits and their HTTP implementations
//! - Artist resolution and track matching
//! - Region playlist sync and the weekly convergence loop

pub mod artist_resolver;
pub mod capabilities;
pub mod convergence;
pub mod event_client;
pub mod region_sync;
pub mod retry;
pub mod spotify_client;
pub mod track_matcher;
pub mod tracklist_client;

pub use artist_resolver::{resolve, ArtistCache, ArtistResolver, ResolvedArtist, ResolvedArtists};
pub use capabilities::{
    CatalogCapability, EventSource, RemoteCollection, SearchCapability, TrackSearch, WindowSource,
};
pub use convergence::{ConvergenceLoop, ConvergenceOutcome, ConvergenceState};
pub use event_client::EventClient;
pub use region_sync::{RegionReport, RegionSync, RegionSyncOptions};
pub use retry::{retry_while_rate_limited, DEFAULT_RATE_LIMIT_BACKOFF};
pub use spotify_client::SpotifyClient;
pub use track_matcher::{loosely_equal, select_track};
pub use tracklist_client::TracklistClient;
