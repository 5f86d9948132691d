//! Region definitions
//!
//! The regions file is a JSON array:
//!
//! ```json
//! [{ "Id": "sea", "Region": "Seattle", "VenueIds": ["123", "456"] }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use weekly_common::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Region {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "Region")]
    pub name: String,
    #[serde(rename = "VenueIds", default)]
    pub venue_ids: Vec<String>,
}

impl Region {
    /// e.g. "Seattle weekly"
    pub fn playlist_name(&self, suffix: &str) -> String {
        format!("{} {}", self.name, suffix)
    }
}

pub fn load_regions(path: &Path) -> Result<Vec<Region>> {
    tracing::info!(path = %path.display(), "Reading regions");
    let text = std::fs::read_to_string(path)?;
    let regions: Vec<Region> = serde_json::from_str(&text)?;
    Ok(regions)
}
