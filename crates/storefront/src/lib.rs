//! Storefront Library
//!
//! This library turns a pasted storefront URL (Steam, Epic Games Store or
//! Xbox/Microsoft Store) into a normalized game record ready to be printed on
//! a gift card.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use storefront::{GameResolver, GameResponse, StoreConfig};
//!
//! # async fn example() -> storefront::Result<()> {
//! let resolver = GameResolver::new(StoreConfig::from_env()?)?;
//!
//! match resolver
//!     .resolve_game_response("https://store.steampowered.com/app/1245620/ELDEN_RING/")
//!     .await
//! {
//!     GameResponse::Game(game) => println!("{} -> {}", game.name, game.store_url),
//!     GameResponse::Error(e) => println!("{} ({})", e.error, e.status),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **URL resolution**: pure mapping of store URLs to a `(store, id)` locator
//! - **Store adapters**: one upstream call per lookup, per-store fallback rules
//! - **Uniform errors**: client-input, not-found, upstream-unavailable, internal
//! - **Catalog cache**: the large Epic catalog is reused for a bounded window

pub mod storefront;

// Re-export commonly used types for convenience
pub use storefront::{
    ErrorKind, ErrorResponse, GameResolver, GameResponse, NormalizedGame, ResolvedLocator,
    Result, Store, StoreConfig, StoreError, resolve,
};
