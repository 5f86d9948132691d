//! Matching announced track titles to catalog tracks

use crate::models::CatalogTrack;

/// Keep letters and digits only, lowercased
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Equal after dropping everything but letters and digits, ignoring case.
/// Not fuzzy: "Loser (Live)" and "Loser" differ.
pub fn loosely_equal(a: &str, b: &str) -> bool {
    squash(a) == squash(b)
}

/// First candidate whose name is loosely equal to `title`
pub fn select_track<'a>(title: &str, candidates: &'a [CatalogTrack]) -> Option<&'a CatalogTrack> {
    let selected = candidates.iter().find(|track| loosely_equal(title, &track.name));
    match selected {
        Some(track) => tracing::debug!(
            id = %track.id,
            artist = track.main_artist().unwrap_or("?"),
            track = %track.name,
            "Selected track"
        ),
        None => tracing::debug!(title, candidates = candidates.len(), "No track matched"),
    }
    selected
}
