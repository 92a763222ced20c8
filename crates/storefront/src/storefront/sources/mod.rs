//! Store adapter implementations
//!
//! Each adapter turns an id into exactly one upstream request and reduces the
//! upstream payload to a [`NormalizedGame`]. Every store is defined in its own
//! file along with its payload types and fallback rules.

use async_trait::async_trait;

pub mod epic;
pub mod microsoft;
pub mod steam;

pub use epic::EpicAdapter;
pub use microsoft::MicrosoftAdapter;
pub use steam::SteamAdapter;

use crate::storefront::core::{NormalizedGame, Result, Store};

/// The one capability every storefront provides
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Which store this adapter speaks to
    fn store(&self) -> Store;

    /// Fetch the game behind `id` and normalize it
    async fn fetch_game(&self, id: &str) -> Result<NormalizedGame>;
}

/// Treat empty strings as absent in fallback chains
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
