//! Data models for weekly-sync
//!
//! - Catalog artists and tracks as seen by the resolver
//! - Radio tracklist entries and the desired items derived from them
//! - Venue events
//! - Region definitions loaded from the regions file

pub mod catalog;
pub mod events;
pub mod regions;
pub mod tracklist;

pub use catalog::{CatalogArtist, CatalogTrack};
pub use events::VenueEvent;
pub use regions::{load_regions, Region};
pub use tracklist::{DesiredItem, TracklistEntry};
