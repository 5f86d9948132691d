//! Radio station tracklist entries
//!
//! The tracklist API returns one JSON array per three-hour show. Only the
//! fields used for matching are modelled; everything else is ignored.

use serde::{Deserialize, Deserializer, Serialize};

const SPOTIFY_SEARCH_PREFIX: &str = "spotify:search:";

/// One played track as reported by the station
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TracklistEntry {
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub artist: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub album: String,
    #[serde(
        rename = "affiliateLinkSpotify",
        deserialize_with = "deserialize_nullable_string"
    )]
    pub affiliate_link_spotify: String,
    pub datetime: Option<String>,
    pub play_id: Option<i64>,
}

/// The station sends `null` for fields it has no value for
fn deserialize_nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Something that should end up in the weekly playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredItem {
    /// Title as announced, compared loosely against catalog track names
    pub display_title: String,
    /// Free-text catalog query for the track
    pub candidate_track_ref: String,
}

impl TracklistEntry {
    /// `None` for entries the station could not link (talk breaks, unknown tracks)
    pub fn desired_item(&self) -> Option<DesiredItem> {
        let link = self.affiliate_link_spotify.trim();
        if link.is_empty() {
            return None;
        }
        Some(DesiredItem {
            display_title: self.title.clone(),
            candidate_track_ref: decode_search_link(link),
        })
    }
}

/// `spotify:search:Artist+Song%21` becomes `Artist Song!`
pub fn decode_search_link(link: &str) -> String {
    let spaced = link.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);
    decoded.replacen(SPOTIFY_SEARCH_PREFIX, "", 1).trim().to_string()
}
