//! Catalog artist resolution
//!
//! Walks a guess tree in pre-order asking the catalog for each candidate
//! name. A name matches when one of the first page of search results has
//! exactly that name, ignoring case. A match ends the descent into that
//! branch; a miss tries the branch's more specific pieces instead.
//!
//! **Algorithm:**
//! 1. Candidate already in the cache: copy the cached artist, skip children
//! 2. Search (retrying while rate limited)
//! 3. Match: record in the result and the cache, skip children
//! 4. No match or search error: descend into children
//!
//! Only matches are cached, so a name that missed is searched again the next
//! time it shows up.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use weekly_common::{ArtistId, Result};

use super::capabilities::SearchCapability;
use super::retry::{retry_while_rate_limited, DEFAULT_RATE_LIMIT_BACKOFF};
use crate::guessing::GuessNode;

/// A candidate name the catalog recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtist {
    pub candidate_name: String,
    pub catalog_id: ArtistId,
    pub catalog_name: String,
}

/// Candidate name to artist. Ordered by name for stable output.
pub type ResolvedArtists = BTreeMap<String, ResolvedArtist>;

/// Matches remembered across titles within one run
#[derive(Debug, Default)]
pub struct ArtistCache {
    entries: HashMap<String, ResolvedArtist>,
}

impl ArtistCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, candidate_name: &str) -> Option<&ResolvedArtist> {
        self.entries.get(candidate_name)
    }

    pub fn insert(&mut self, artist: ResolvedArtist) {
        self.entries.insert(artist.candidate_name.clone(), artist);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Search for `name` and pick the first exact (case-insensitive) match
pub async fn lookup_artist(
    search: &dyn SearchCapability,
    name: &str,
    backoff: Duration,
) -> Result<Option<ResolvedArtist>> {
    let found =
        retry_while_rate_limited("artist search", backoff, move || search.find_artist(name)).await?;
    Ok(found
        .into_iter()
        .find(|artist| artist.is_named(name))
        .map(|artist| ResolvedArtist {
            candidate_name: name.to_string(),
            catalog_id: artist.id,
            catalog_name: artist.name,
        }))
}

/// Resolve every branch of `root` against the catalog. The root itself is
/// never a candidate. Search failures are logged and count as no match.
pub async fn resolve(
    root: &GuessNode,
    search: &dyn SearchCapability,
    cache: &mut ArtistCache,
    backoff: Duration,
) -> ResolvedArtists {
    let mut found = ResolvedArtists::new();
    let mut stack: Vec<(&GuessNode, usize)> =
        root.children.iter().rev().map(|c| (c, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        tracing::debug!("[{:<8}]{}{}", node.step.tag(), "  ".repeat(depth), node.name);

        if let Some(hit) = cache.get(&node.name) {
            found.insert(node.name.clone(), hit.clone());
            continue;
        }

        match lookup_artist(search, &node.name, backoff).await {
            Ok(Some(artist)) => {
                tracing::info!(
                    candidate = %node.name,
                    artist = %artist.catalog_name,
                    id = %artist.catalog_id,
                    "Matched artist"
                );
                cache.insert(artist.clone());
                found.insert(node.name.clone(), artist);
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(candidate = %node.name, error = %e, "Artist search failed");
            }
        }

        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }

    found
}

/// Resolver holding its search capability and a run-wide cache
pub struct ArtistResolver {
    search: Arc<dyn SearchCapability>,
    cache: ArtistCache,
    backoff: Duration,
}

impl ArtistResolver {
    pub fn new(search: Arc<dyn SearchCapability>) -> Self {
        Self {
            search,
            cache: ArtistCache::new(),
            backoff: DEFAULT_RATE_LIMIT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn resolve(&mut self, root: &GuessNode) -> ResolvedArtists {
        resolve(root, self.search.as_ref(), &mut self.cache, self.backoff).await
    }

    pub fn cache(&self) -> &ArtistCache {
        &self.cache
    }
}
