//! Storefront module
//!
//! This module contains the whole resolution core: URL resolution, the
//! per-store adapters, configuration and the normalization gateway.

pub mod core;
pub mod config;
pub mod gateway;
pub mod sources;

// Re-export main types for convenience
pub use self::core::{
    ErrorKind, ErrorResponse, HttpClient, NormalizedGame, ResolvedLocator, Result, Store,
    StoreError, resolve, truncate_description,
};
pub use self::config::StoreConfig;
pub use gateway::{GameResolver, GameResponse};
pub use sources::{EpicAdapter, MicrosoftAdapter, StoreAdapter, SteamAdapter};
