//! Normalization gateway
//!
//! The call chain flows as follows:
//!
//! Caller (CLI, UI, ...)
//! ↓
//! GameResolver::resolve_game (this file)
//! ↓
//! core::locator::resolve (pure, no network)
//! ↓
//! GameResolver::fetch_store (dispatch on the resolved store)
//! ↓
//! SteamAdapter | EpicAdapter | MicrosoftAdapter (sources/*)
//! ↓
//! HttpClient (core/http.rs)

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::storefront::config::StoreConfig;
use crate::storefront::core::{
    ErrorKind, ErrorResponse, HttpClient, NormalizedGame, ResolvedLocator, Result, Store,
    StoreError, resolve,
};
use crate::storefront::sources::{EpicAdapter, MicrosoftAdapter, SteamAdapter, StoreAdapter};

/// What the rendering side receives: a record or an `{error, status}` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GameResponse {
    Game(NormalizedGame),
    Error(ErrorResponse),
}

impl From<Result<NormalizedGame>> for GameResponse {
    fn from(result: Result<NormalizedGame>) -> Self {
        match result {
            Ok(game) => GameResponse::Game(game),
            Err(e) => GameResponse::Error(e.to_response()),
        }
    }
}

/// Entry point turning pasted storefront URLs into normalized game records
///
/// Each call is independent and makes at most one upstream request. The only
/// state shared between calls is the Epic catalog cache inside the HTTP client.
#[derive(Clone)]
pub struct GameResolver {
    steam: SteamAdapter,
    epic: EpicAdapter,
    microsoft: MicrosoftAdapter,
}

impl GameResolver {
    /// Create a resolver talking to the configured upstream endpoints
    pub fn new(config: StoreConfig) -> Result<Self> {
        let http = HttpClient::from_config(&config)?;
        Ok(Self::with_client(http, config))
    }

    /// Create a resolver around an existing HTTP client
    pub fn with_client(http: HttpClient, config: StoreConfig) -> Self {
        let config = Arc::new(config);
        Self {
            steam: SteamAdapter::new(http.clone(), Arc::clone(&config)),
            epic: EpicAdapter::new(http.clone(), Arc::clone(&config)),
            microsoft: MicrosoftAdapter::new(http, config),
        }
    }

    /// Resolve a pasted URL and fetch its game
    ///
    /// Unrecognized URLs fail with a client-input error before any request.
    pub async fn resolve_game(&self, raw_url: &str) -> Result<NormalizedGame> {
        let locator = resolve(raw_url);
        if !locator.is_recognized() {
            debug!("No storefront pattern matched {:?}", raw_url);
            return Err(StoreError::UnrecognizedUrl {
                url: raw_url.to_string(),
            });
        }
        self.fetch(&locator).await
    }

    /// Like [`GameResolver::resolve_game`], folded into the serializable response
    pub async fn resolve_game_response(&self, raw_url: &str) -> GameResponse {
        self.resolve_game(raw_url).await.into()
    }

    /// Fetch the game behind an already resolved locator
    pub async fn fetch(&self, locator: &ResolvedLocator) -> Result<NormalizedGame> {
        match locator.store {
            Some(store) => self.fetch_store(store, &locator.id).await,
            None => Err(StoreError::UnrecognizedUrl {
                url: locator.id.clone(),
            }),
        }
    }

    /// Fetch a game from one store by id
    pub async fn fetch_store(&self, store: Store, id: &str) -> Result<NormalizedGame> {
        let id = id.trim();
        if id.is_empty() {
            return Err(StoreError::MissingId { store });
        }

        let result = match store {
            Store::Steam => guarded(&self.steam, id).await,
            Store::Epic => guarded(&self.epic, id).await,
            Store::Microsoft => guarded(&self.microsoft, id).await,
        };

        if let Err(ref e) = result {
            if e.kind() == ErrorKind::Internal {
                error!("{} lookup for '{}' failed: {}", store, id, e);
            } else {
                warn!("{} lookup for '{}' failed ({}): {}", store, id, e.category(), e);
            }
        }
        result
    }
}

/// Run one adapter call, turning a panic into an internal error
async fn guarded<A: StoreAdapter>(adapter: &A, id: &str) -> Result<NormalizedGame> {
    let store = adapter.store();
    match AssertUnwindSafe(adapter.fetch_game(id)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "adapter panicked".to_string());
            Err(StoreError::Internal { store, reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct PanickingAdapter;

    #[async_trait]
    impl StoreAdapter for PanickingAdapter {
        fn store(&self) -> Store {
            Store::Epic
        }

        async fn fetch_game(&self, _id: &str) -> Result<NormalizedGame> {
            panic!("catalog shape changed")
        }
    }

    #[tokio::test]
    async fn test_adapter_panic_becomes_internal_error() {
        let error = guarded(&PanickingAdapter, "hades").await.unwrap_err();

        match &error {
            StoreError::Internal { store, reason } => {
                assert_eq!(*store, Store::Epic);
                assert_eq!(reason, "catalog shape changed");
            }
            other => panic!("expected internal error, got {:?}", other),
        }
        assert_eq!(error.to_response().status, 500);
    }

    fn offline_resolver() -> GameResolver {
        GameResolver::new(StoreConfig::default().with_api_base("http://127.0.0.1:9")).unwrap()
    }

    #[tokio::test]
    async fn test_missing_id_rejected_before_dispatch() {
        let resolver = offline_resolver();

        for store in Store::ALL {
            let error = resolver.fetch_store(store, "  ").await.unwrap_err();
            assert!(matches!(error, StoreError::MissingId { .. }));
            assert_eq!(error.to_response().status, 400);
        }
    }

    #[tokio::test]
    async fn test_unrecognized_locator_is_client_input() {
        let resolver = offline_resolver();
        let error = resolver.fetch(&ResolvedLocator::unrecognized()).await.unwrap_err();
        assert_eq!(error.to_response().status, 400);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_configuration_error() {
        let config = StoreConfig::default().with_api_base("not a url");
        let resolver = GameResolver::new(config).unwrap();

        for store in Store::ALL {
            let error = resolver.fetch_store(store, "1245620").await.unwrap_err();
            assert!(matches!(error, StoreError::Configuration { .. }));
            assert_eq!(error.to_response().status, 400);
        }
    }

    #[test]
    fn test_response_serialization() {
        let response: GameResponse = Err::<NormalizedGame, _>(StoreError::UnrecognizedUrl {
            url: "https://example.com/game".to_string(),
        })
        .into();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(
            json["error"],
            "Invalid URL. Supported stores: Steam, Epic Games, Xbox/Microsoft Store"
        );
    }
}
