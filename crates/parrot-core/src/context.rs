//! Contextual info cards keyed by keyword match.
//!
//! A small ordered table maps keywords to static reference cards. Matching is
//! a case-insensitive substring check, first match wins. Extending the table
//! is the intended extension point.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A hyperlink attached to a contextual info card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextLink {
    /// Link label shown to the user.
    pub text: String,
    /// Link target.
    pub url: String,
}

impl ContextLink {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// A static reference card displayed in the contextual info panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCard {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub links: Vec<ContextLink>,
}

/// Ordered keyword table backing [`ContextIndex::resolve`].
///
/// Entries are consulted in insertion order; the first keyword contained in
/// the text (case-insensitively) selects the card.
#[derive(Debug, Clone, Default)]
pub struct ContextIndex {
    entries: Vec<(String, ContextCard)>,
}

impl ContextIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyword -> card mapping. Later entries only match when no
    /// earlier keyword is present in the text.
    pub fn with_entry(mut self, keyword: impl Into<String>, card: ContextCard) -> Self {
        self.entries.push((keyword.into().to_lowercase(), card));
        self
    }

    /// Resolves the text against the table.
    ///
    /// Case-insensitive substring match, first match wins. `None` means the
    /// panel renders nothing.
    pub fn resolve(&self, text: &str) -> Option<&ContextCard> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| haystack.contains(keyword.as_str()))
            .map(|(_, card)| card)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The built-in keyword table.
///
/// "typescript" is listed before "javascript" so text mentioning both picks
/// the more specific card.
pub static DEFAULT_INDEX: Lazy<ContextIndex> = Lazy::new(|| {
    ContextIndex::new()
        .with_entry(
            "react",
            ContextCard {
                title: "React".to_string(),
                description: "A JavaScript library for building user interfaces."
                    .to_string(),
                links: vec![
                    ContextLink::new("Official Documentation", "https://react.dev"),
                    ContextLink::new("Quick Start", "https://react.dev/learn"),
                ],
            },
        )
        .with_entry(
            "typescript",
            ContextCard {
                title: "TypeScript".to_string(),
                description:
                    "A strongly typed programming language that builds on JavaScript."
                        .to_string(),
                links: vec![
                    ContextLink::new("Official Site", "https://www.typescriptlang.org"),
                    ContextLink::new(
                        "Handbook",
                        "https://www.typescriptlang.org/docs/handbook/intro.html",
                    ),
                ],
            },
        )
        .with_entry(
            "javascript",
            ContextCard {
                title: "JavaScript".to_string(),
                description: "The programming language of the web.".to_string(),
                links: vec![ContextLink::new(
                    "MDN JavaScript Guide",
                    "https://developer.mozilla.org/en-US/docs/Web/JavaScript/Guide",
                )],
            },
        )
});
