//! Link disposition definitions for the preparation pipeline
//!
//! Every candidate link that enters preparation leaves with exactly one of
//! these dispositions.
use serde::Serialize;
use std::fmt;

/// What happened to a candidate link during preparation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDisposition {
    // ===== Kept =====
    /// Resolved, valid, and not a listing page
    Accepted,

    // ===== Dropped =====
    /// Resolution produced no new destination (or failed)
    Unresolved,

    /// The resolved destination failed URL validation
    Invalid,

    /// The resolved destination is a search results page
    SearchPage,

    /// The resolved destination is a category or collection page
    CollectionPage,

    /// The resolved destination duplicates an earlier accepted link
    Duplicate,
}

impl LinkDisposition {
    /// Returns true if the link is handed to extraction
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns true if the link was dropped because of what the page is
    pub fn is_listing(&self) -> bool {
        matches!(self, Self::SearchPage | Self::CollectionPage)
    }

    /// Stable lowercase name, used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Unresolved => "unresolved",
            Self::Invalid => "invalid",
            Self::SearchPage => "search_page",
            Self::CollectionPage => "collection_page",
            Self::Duplicate => "duplicate",
        }
    }

    /// Returns all possible dispositions
    pub fn all() -> [Self; 6] {
        [
            Self::Accepted,
            Self::Unresolved,
            Self::Invalid,
            Self::SearchPage,
            Self::CollectionPage,
            Self::Duplicate,
        ]
    }
}

impl fmt::Display for LinkDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
