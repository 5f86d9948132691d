//! Artist guess tree
//!
//! An event title is turned into a tree of candidate artist names. The root
//! holds the raw title, its single child the normalized title, and below
//! that every way of splitting the title into acts. The resolver walks the
//! tree in pre-order and stops descending a branch once a name matches, so
//! the whole title is always tried before its pieces.
//!
//! ```text
//! Root      "SOLD OUT! A & B with C at The Club"
//! Cleaned    "A & B with C at The Club"
//! Initial     "A & B"
//! AndSwap      "A and B"
//! MultiSplit   "A"
//! MultiSplit   "B"
//! Initial     "C at The Club"
//! VenueStrip  "A & B with C"
//! Initial      "A & B"
//! ...
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::normalizer::{strip_venue, TitleNormalizer};

/// Splits a title into billed acts: "with", "feat.", "presents", commas,
/// pipes, slashes, "+ more", "presented by ..." trailers and bare colons
static INITIAL_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(?:\b\\w\b|\bw/|,\s+|\s*\+\s*more\b|\swith\sspecial\sguests?\s",
        r"|\bwith\b|\bfeat\b\.?|\s+ft\.?\s+|\bpresented\s+by\b.*$|\bpresents?\b",
        r"|\bfeaturing\b|\||//?|:\s)",
    ))
    .expect("initial split pattern is valid")
});

/// Splits a single billing into individual artists
static MULTI_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\\w|w/|,\s+|\band\b|\by\b|&|:|\s\+\s)")
        .expect("multi-artist pattern is valid")
});

/// Which decomposition step produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuessStep {
    Root,
    Cleaned,
    Initial,
    AndSwap,
    MultiSplit,
    VenueStrip,
}

impl GuessStep {
    pub fn tag(&self) -> &'static str {
        match self {
            GuessStep::Root => "root",
            GuessStep::Cleaned => "cleaned",
            GuessStep::Initial => "initial",
            GuessStep::AndSwap => "and-swap",
            GuessStep::MultiSplit => "multi",
            GuessStep::VenueStrip => "venue",
        }
    }
}

impl fmt::Display for GuessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One candidate artist name and the alternatives derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessNode {
    pub name: String,
    pub step: GuessStep,
    pub children: Vec<GuessNode>,
}

impl GuessNode {
    pub fn new(name: impl Into<String>, step: GuessStep) -> Self {
        Self {
            name: name.into(),
            step,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Every descendant in pre-order, excluding `self`
    pub fn descendants(&self) -> Vec<&GuessNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&GuessNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Names of every descendant in pre-order
    pub fn candidate_names(&self) -> Vec<&str> {
        self.descendants()
            .into_iter()
            .map(|n| n.name.as_str())
            .collect()
    }

    /// First descendant with this exact name
    pub fn find(&self, name: &str) -> Option<&GuessNode> {
        self.descendants().into_iter().find(|n| n.name == name)
    }

    /// Levels below this node (0 for a leaf)
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Indented dump, one node per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, level: usize) {
        out.push_str(&format!(
            "{}[{}] {}\n",
            "  ".repeat(level),
            self.step.tag(),
            self.name
        ));
        for child in &self.children {
            child.render_into(out, level + 1);
        }
    }
}

/// Builds guess trees from raw event titles
#[derive(Debug, Clone, Default)]
pub struct Decomposer {
    normalizer: TitleNormalizer,
}

impl Decomposer {
    pub fn new(normalizer: TitleNormalizer) -> Self {
        Self { normalizer }
    }

    /// Build the guess tree for a raw title. A title that is nothing but
    /// noise yields a childless root.
    pub fn decompose(&self, raw_title: &str) -> GuessNode {
        let mut root = GuessNode::new(raw_title, GuessStep::Root);

        let cleaned = self.normalizer.normalize(raw_title);
        if cleaned.is_empty() {
            return root;
        }

        let mut cleaned_node = GuessNode::new(cleaned.as_str(), GuessStep::Cleaned);
        expand_billing(&mut cleaned_node);

        if let Some(without_venue) = strip_venue(&cleaned) {
            let mut venue_node = GuessNode::new(without_venue, GuessStep::VenueStrip);
            expand_billing(&mut venue_node);
            cleaned_node.children.push(venue_node);
        }

        root.children.push(cleaned_node);
        root
    }
}

/// Decompose with the default normalizer
pub fn guess_artists(raw_title: &str) -> GuessNode {
    Decomposer::default().decompose(raw_title)
}

/// Split on `re`, trimming and dropping empty pieces. `None` unless the
/// pattern actually matched.
fn split_segments(re: &Regex, name: &str) -> Option<Vec<String>> {
    let raw: Vec<&str> = re.split(name).collect();
    if raw.len() < 2 {
        return None;
    }
    Some(
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    )
}

/// Initial split of a whole title. Each billed segment is then expanded into
/// individual artists. A title with a single billing is expanded directly.
fn expand_billing(node: &mut GuessNode) {
    match split_segments(&INITIAL_SPLIT, &node.name) {
        Some(segments) => {
            for segment in segments {
                let mut child = GuessNode::new(segment, GuessStep::Initial);
                expand_artists(&mut child);
                node.children.push(child);
            }
        }
        None => expand_artists(node),
    }
}

fn expand_artists(node: &mut GuessNode) {
    swap_ands(node);
    separate_artists(node);
}

/// "A & B" also gets tried as "A and B"
fn swap_ands(node: &mut GuessNode) {
    if !node.name.contains('&') {
        return;
    }
    let swapped = node.name.replace('&', "and");
    let swapped = swapped.trim();
    if !swapped.is_empty() && swapped != node.name {
        node.children.push(GuessNode::new(swapped, GuessStep::AndSwap));
    }
}

fn separate_artists(node: &mut GuessNode) {
    let Some(segments) = split_segments(&MULTI_SPLIT, &node.name) else {
        return;
    };
    for segment in segments {
        // Pieces lose at least one separator so this always terminates
        let mut child = GuessNode::new(segment, GuessStep::MultiSplit);
        expand_artists(&mut child);
        node.children.push(child);
    }
}
