//! Core types used throughout the storefront resolver
//!
//! This module contains the fundamental types that all other modules depend on:
//! the store enum, the locator produced from a pasted URL, and the normalized
//! record every adapter reduces its upstream payload to.

pub mod error;
pub mod http;
pub mod locator;

// Re-export main types for convenience
pub use error::{ErrorKind, ErrorResponse, Result, StoreError};
pub use http::HttpClient;
pub use locator::resolve;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest description kept for stores that return long-form text
pub const DESCRIPTION_LIMIT: usize = 200;

/// Supported storefronts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    Steam,
    Epic,
    Microsoft,
}

impl Store {
    pub const ALL: [Store; 3] = [Store::Steam, Store::Epic, Store::Microsoft];

    /// Human-readable storefront name for card and error display
    pub fn display_name(&self) -> &'static str {
        match self {
            Store::Steam => "Steam",
            Store::Epic => "Epic Games",
            Store::Microsoft => "Xbox/Microsoft",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Store::Steam => "steam",
            Store::Epic => "epic",
            Store::Microsoft => "microsoft",
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Store {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steam" => Ok(Store::Steam),
            "epic" | "epicgames" => Ok(Store::Epic),
            "microsoft" | "xbox" => Ok(Store::Microsoft),
            other => Err(format!(
                "unknown store '{}' (expected steam, epic or microsoft)",
                other
            )),
        }
    }
}

/// The `(store, id)` pair extracted from a pasted URL
///
/// `store == None` means no pattern matched. Callers treat that as terminal
/// and never try the other adapters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedLocator {
    pub store: Option<Store>,
    pub id: String,
}

impl ResolvedLocator {
    pub fn new<S: Into<String>>(store: Store, id: S) -> Self {
        Self {
            store: Some(store),
            id: id.into(),
        }
    }

    pub fn unrecognized() -> Self {
        Self {
            store: None,
            id: String::new(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.store.is_some()
    }
}

/// Store-agnostic game summary used for rendering a gift card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedGame {
    pub name: String,
    /// Absolute image URL, empty when the store has no image
    pub header_image: String,
    pub short_description: String,
    /// The id used to query upstream, echoed from the locator
    pub store_id: String,
    pub store: Store,
    pub store_url: String,
}

impl NormalizedGame {
    /// Locator that regenerates the request this record came from
    pub fn locator(&self) -> ResolvedLocator {
        ResolvedLocator::new(self.store, self.store_id.clone())
    }
}

/// Cut a description down to at most [`DESCRIPTION_LIMIT`] characters
pub fn truncate_description(text: &str) -> String {
    text.chars().take(DESCRIPTION_LIMIT).collect()
}
