//! Steam storefront adapter

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{StoreAdapter, non_empty};
use crate::storefront::config::StoreConfig;
use crate::storefront::core::{
    HttpClient, NormalizedGame, Result, Store, StoreError, truncate_description,
};

/// Envelope Steam returns for each requested app id
#[derive(Debug, Clone, Deserialize)]
pub struct SteamAppEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<SteamAppData>,
}

/// App detail fields used for a card
#[derive(Debug, Clone, Deserialize)]
pub struct SteamAppData {
    pub name: Option<String>,
    pub header_image: Option<String>,
    pub short_description: Option<String>,
}

/// `appdetails` answers with a map keyed by the app id string
pub type SteamAppDetails = HashMap<String, SteamAppEnvelope>;

/// Adapter for the Steam storefront detail endpoint
#[derive(Clone)]
pub struct SteamAdapter {
    http: HttpClient,
    config: Arc<StoreConfig>,
}

impl SteamAdapter {
    pub fn new(http: HttpClient, config: Arc<StoreConfig>) -> Self {
        Self { http, config }
    }

    fn details_url(&self) -> String {
        format!("{}/api/appdetails", self.config.steam_api_base)
    }

    /// Canonical store page for an app id
    pub fn store_url(&self, app_id: &str) -> String {
        format!("{}/app/{}", self.config.steam_store_base, app_id)
    }

    /// Reduce an `appdetails` payload to a normalized record
    ///
    /// The app id is trusted to be a digit run; the resolver guarantees that.
    pub fn normalize(&self, app_id: &str, mut details: SteamAppDetails) -> Result<NormalizedGame> {
        let not_found = || StoreError::NotFound {
            store: Store::Steam,
            id: app_id.to_string(),
            message: "Game not found".to_string(),
        };

        let envelope = details.remove(app_id).ok_or_else(not_found)?;
        if !envelope.success {
            return Err(not_found());
        }

        let data = envelope.data.ok_or_else(|| StoreError::MalformedPayload {
            store: Store::Steam,
            reason: format!("app {} reported success without data", app_id),
        })?;
        let name = non_empty(data.name.as_deref())
            .ok_or_else(|| StoreError::MalformedPayload {
                store: Store::Steam,
                reason: format!("app {} has no name", app_id),
            })?
            .to_string();

        Ok(NormalizedGame {
            name,
            header_image: data.header_image.unwrap_or_default(),
            short_description: truncate_description(
                data.short_description.as_deref().unwrap_or_default(),
            ),
            store_id: app_id.to_string(),
            store: Store::Steam,
            store_url: self.store_url(app_id),
        })
    }
}

#[async_trait]
impl StoreAdapter for SteamAdapter {
    fn store(&self) -> Store {
        Store::Steam
    }

    async fn fetch_game(&self, id: &str) -> Result<NormalizedGame> {
        let request = self
            .http
            .get(&self.details_url())
            .query(&[("appids", id)])
            .header("Accept-Language", &self.config.steam_accept_language);

        let details: SteamAppDetails = self.http.get_json(Store::Steam, request).await?;
        debug!("Steam returned {} app entries", details.len());

        let game = self.normalize(id, details)?;
        info!("Resolved Steam app {} to '{}'", id, game.name);
        Ok(game)
    }
}
