//! Insertion-ordered set of catalog identifiers
//!
//! Playlists are ordered and the remote APIs take ordered batches, but every
//! comparison we make is set-based. `OrderedSet` keeps both views in step:
//! a hash set for membership and a vector recording first-insertion order.
//! A repeated insert is a no-op, so the two always hold the same members.

use crate::error::{Error, Result};
use crate::ids::TrackId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::hash::Hash;

/// Set of track identifiers in first-insertion order
pub type TrackSet = OrderedSet<TrackId>;

/// Uniqueness-enforcing, insertion-order-preserving container
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    members: HashSet<T>,
    order: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            members: HashSet::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` unless already present. Returns true when it was new.
    pub fn add(&mut self, id: T) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &T) -> bool {
        self.members.contains(id)
    }

    /// Members of `self` absent from `other`, in `self`'s order
    pub fn difference(&self, other: &OrderedSet<T>) -> OrderedSet<T> {
        self.order
            .iter()
            .filter(|id| !other.contains(id))
            .cloned()
            .collect()
    }

    /// Alias of [`OrderedSet::difference`], reads better at removal sites
    pub fn remove_all(&self, removing: &OrderedSet<T>) -> OrderedSet<T> {
        self.difference(removing)
    }

    /// Bulk [`OrderedSet::add`]
    pub fn merge<I: IntoIterator<Item = T>>(&mut self, ids: I) {
        for id in ids {
            self.add(id);
        }
    }

    /// Members in first-insertion order
    pub fn to_vec(&self) -> Vec<T> {
        self.order.clone()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.order
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pick `n` distinct members uniformly at random without replacement
    ///
    /// # Errors
    /// `Error::InsufficientMembers` when `n` exceeds the set's size. That is a
    /// caller bug, not something to retry.
    pub fn sample(&self, n: usize) -> Result<OrderedSet<T>> {
        self.sample_with(n, &mut rand::thread_rng())
    }

    /// [`OrderedSet::sample`] with a caller-supplied random source
    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<OrderedSet<T>> {
        if n > self.len() {
            return Err(Error::InsufficientMembers {
                requested: n,
                available: self.len(),
            });
        }

        // Partial Fisher-Yates shuffle
        Ok(self.order.choose_multiple(rng, n).cloned().collect())
    }
}

impl<T: PartialEq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl<T: Eq> Eq for OrderedSet<T> {}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        set.merge(iter);
        set
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.merge(iter);
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}
