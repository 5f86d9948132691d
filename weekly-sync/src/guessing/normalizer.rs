//! Event title cleanup
//!
//! Venue listings decorate the act's name with cities, "SOLD OUT" banners,
//! "live at" trailers, age restrictions in parentheses, and the occasional
//! mis-decoded replacement character. The normalizer strips those with an
//! ordered list of case-insensitive patterns. Order matters: a later pattern
//! may only match once an earlier one has removed interfering text.
//!
//! A trailing " at <venue>" is deliberately left alone here. Some acts have
//! " at " in their name, so the decomposer tries the title both with and
//! without it (see [`strip_venue`]).

use once_cell::sync::Lazy;
use regex::Regex;

/// Noise patterns applied in order, each replaced with nothing
pub const DEFAULT_STRIP_PATTERNS: &[&str] = &[
    r"\bLOS ANGELES, CA\b",
    r"\bNEW HAVEN, CT\b",
    r"\bSOLD\s+OUT\s*!+",
    r"\bSOLD\s+OUT:",
    r"^\s*SOLD\s+OUT\b",
    r"\bLIVE\s+(?:AT\b|IN\b|@).+",
    r"\|.+",
    r"\(.+\)",
    r"\[.+\]",
    "\u{00EF}\u{00BF}\u{00BD}",
    "\u{FFFD}",
];

static DEFAULT_NORMALIZER: Lazy<TitleNormalizer> = Lazy::new(|| {
    TitleNormalizer::with_patterns(DEFAULT_STRIP_PATTERNS)
        .expect("default strip patterns are valid")
});

static VENUE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+AT\s+.+").expect("venue pattern is valid"));

/// Ordered list of strip patterns
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    patterns: Vec<Regex>,
}

impl TitleNormalizer {
    /// Build from custom patterns. Every pattern is matched case-insensitively.
    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Strip every pattern in order and trim. Never fails; no match is a no-op.
    pub fn normalize(&self, raw: &str) -> String {
        let mut title = raw.to_string();
        for pattern in &self.patterns {
            if pattern.is_match(&title) {
                title = pattern.replace_all(&title, "").into_owned();
            }
        }
        title.trim().to_string()
    }

    /// [`TitleNormalizer::normalize`] followed by [`strip_venue`]
    pub fn normalize_without_venue(&self, raw: &str) -> String {
        let cleaned = self.normalize(raw);
        strip_venue(&cleaned).unwrap_or(cleaned)
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        DEFAULT_NORMALIZER.clone()
    }
}

/// Normalize with the default patterns
pub fn normalize(raw: &str) -> String {
    DEFAULT_NORMALIZER.normalize(raw)
}

/// Drop a trailing " at <venue>". `None` when there is no such suffix or
/// nothing would be left.
pub fn strip_venue(title: &str) -> Option<String> {
    let stripped = VENUE_SUFFIX.replace(title, "");
    let stripped = stripped.trim();
    if stripped.is_empty() || stripped == title.trim() {
        None
    } else {
        Some(stripped.to_string())
    }
}
