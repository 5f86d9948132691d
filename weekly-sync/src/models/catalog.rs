//! Catalog search results

use weekly_common::{ArtistId, TrackId};

/// One entry of a ranked artist search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogArtist {
    pub id: ArtistId,
    pub name: String,
}

impl CatalogArtist {
    pub fn new(id: impl Into<ArtistId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Exact match ignoring case
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// One entry of a ranked track search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub id: TrackId,
    pub name: String,
    /// Credited artist names, main artist first
    pub artists: Vec<String>,
}

impl CatalogTrack {
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: Vec::new(),
        }
    }

    pub fn main_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }
}
