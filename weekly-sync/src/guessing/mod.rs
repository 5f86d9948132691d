//! Guessing artist names from free-form event titles

pub mod decompose;
pub mod normalizer;

pub use decompose::{guess_artists, Decomposer, GuessNode, GuessStep};
pub use normalizer::{normalize, strip_venue, TitleNormalizer};
