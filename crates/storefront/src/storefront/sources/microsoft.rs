//! Microsoft Store / Xbox adapter

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::{StoreAdapter, non_empty};
use crate::storefront::config::StoreConfig;
use crate::storefront::core::{
    HttpClient, NormalizedGame, Result, Store, StoreError, truncate_description,
};

/// Image purposes accepted as a header, any of them, first in catalog order
const HEADER_PURPOSES: [&str; 3] = ["SuperHeroArt", "Poster", "BoxArt"];
const SCREENSHOT_PURPOSE: &str = "Screenshot";

/// Display catalog response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MicrosoftCatalogResponse {
    pub products: Option<Vec<MicrosoftProduct>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MicrosoftProduct {
    pub product_id: Option<String>,
    pub localized_properties: Option<Vec<MicrosoftLocalizedProperties>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MicrosoftLocalizedProperties {
    pub product_title: Option<String>,
    pub short_description: Option<String>,
    pub product_description: Option<String>,
    pub images: Option<Vec<MicrosoftImage>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MicrosoftImage {
    pub image_purpose: Option<String>,
    pub uri: Option<String>,
}

impl MicrosoftImage {
    fn has_purpose(&self, purposes: &[&str]) -> bool {
        self.image_purpose
            .as_deref()
            .is_some_and(|purpose| purposes.contains(&purpose))
    }
}

impl MicrosoftLocalizedProperties {
    /// Pick the header image
    ///
    /// Any hero/poster/box art (whichever comes first), else the first
    /// screenshot, else the first image at all.
    pub fn header_image(&self) -> Option<&MicrosoftImage> {
        let images = self.images.as_deref().unwrap_or_default();
        images
            .iter()
            .find(|img| img.has_purpose(&HEADER_PURPOSES))
            .or_else(|| images.iter().find(|img| img.has_purpose(&[SCREENSHOT_PURPOSE])))
            .or_else(|| images.first())
    }

    /// Short description when present, else the long one cut down
    pub fn description(&self) -> String {
        if let Some(short) = non_empty(self.short_description.as_deref()) {
            return short.to_string();
        }
        non_empty(self.product_description.as_deref())
            .map(truncate_description)
            .unwrap_or_default()
    }
}

/// Catalog image URIs are often protocol-relative
pub fn absolute_image_url(uri: &str) -> String {
    if uri.starts_with("//") {
        format!("https:{}", uri)
    } else {
        uri.to_string()
    }
}

/// Storefront slug rebuilt from a title: lower-cased, whitespace runs to hyphens
///
/// Best effort only; the real store slug is not available from the catalog.
pub fn title_slug(title: &str) -> String {
    title.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Adapter for the Microsoft display catalog
#[derive(Clone)]
pub struct MicrosoftAdapter {
    http: HttpClient,
    config: Arc<StoreConfig>,
}

impl MicrosoftAdapter {
    pub fn new(http: HttpClient, config: Arc<StoreConfig>) -> Self {
        Self { http, config }
    }

    fn products_url(&self) -> String {
        format!("{}/v7.0/products", self.config.microsoft_api_base)
    }

    pub fn store_url(&self, title: &str, product_id: &str) -> String {
        format!(
            "{}/games/store/{}/{}",
            self.config.microsoft_store_base,
            title_slug(title),
            product_id
        )
    }

    /// Reduce a display catalog payload to a normalized record
    pub fn normalize(
        &self,
        product_id: &str,
        catalog: MicrosoftCatalogResponse,
    ) -> Result<NormalizedGame> {
        let not_found = |message: &str| StoreError::NotFound {
            store: Store::Microsoft,
            id: product_id.to_string(),
            message: message.to_string(),
        };

        let product = catalog
            .products
            .and_then(|products| products.into_iter().next())
            .ok_or_else(|| not_found("Game not found"))?;
        debug!("Microsoft catalog returned product {:?}", product.product_id);

        let props = product
            .localized_properties
            .and_then(|props| props.into_iter().next())
            .ok_or_else(|| not_found("Game data not available"))?;
        let title = non_empty(props.product_title.as_deref())
            .ok_or_else(|| not_found("Game data not available"))?;

        let header_image = props
            .header_image()
            .and_then(|img| {
                debug!("Microsoft header image purpose: {:?}", img.image_purpose);
                non_empty(img.uri.as_deref())
            })
            .map(absolute_image_url)
            .unwrap_or_default();

        Ok(NormalizedGame {
            name: title.to_string(),
            header_image,
            short_description: props.description(),
            store_id: product_id.to_string(),
            store: Store::Microsoft,
            store_url: self.store_url(title, product_id),
        })
    }
}

#[async_trait]
impl StoreAdapter for MicrosoftAdapter {
    fn store(&self) -> Store {
        Store::Microsoft
    }

    async fn fetch_game(&self, id: &str) -> Result<NormalizedGame> {
        let request = self
            .http
            .get(&self.products_url())
            .query(&[
                ("bigIds", id),
                ("market", self.config.market.as_str()),
                ("languages", self.config.language.as_str()),
            ])
            .header("Accept", "application/json");

        let catalog: MicrosoftCatalogResponse =
            self.http.get_json(Store::Microsoft, request).await?;

        let game = self.normalize(id, catalog)?;
        info!("Resolved Microsoft product {} to '{}'", id, game.name);
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> MicrosoftAdapter {
        let config = Arc::new(StoreConfig::default());
        let http = HttpClient::from_config(&config).unwrap();
        MicrosoftAdapter::new(http, config)
    }

    fn image(purpose: &str, uri: &str) -> MicrosoftImage {
        MicrosoftImage {
            image_purpose: Some(purpose.to_string()),
            uri: Some(uri.to_string()),
        }
    }

    fn props(images: Vec<MicrosoftImage>) -> MicrosoftLocalizedProperties {
        MicrosoftLocalizedProperties {
            product_title: Some("Halo Infinite".to_string()),
            images: Some(images),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_purposes_taken_in_catalog_order() {
        let props = props(vec![
            image("Logo", "//img/logo.png"),
            image("BoxArt", "//img/box.png"),
            image("SuperHeroArt", "//img/hero.png"),
        ]);
        assert_eq!(props.header_image().unwrap().uri.as_deref(), Some("//img/box.png"));
    }

    #[test]
    fn test_screenshot_then_first_image() {
        let with_shot = props(vec![
            image("Logo", "//img/logo.png"),
            image("Screenshot", "//img/shot.png"),
        ]);
        assert_eq!(with_shot.header_image().unwrap().uri.as_deref(), Some("//img/shot.png"));

        let only_logo = props(vec![image("Logo", "//img/logo.png")]);
        assert_eq!(only_logo.header_image().unwrap().uri.as_deref(), Some("//img/logo.png"));

        assert!(props(Vec::new()).header_image().is_none());
    }

    #[test]
    fn test_protocol_relative_uri() {
        assert_eq!(absolute_image_url("//img.example/x.png"), "https://img.example/x.png");
        assert_eq!(absolute_image_url("https://img.example/x.png"), "https://img.example/x.png");
    }

    #[test]
    fn test_title_slug() {
        assert_eq!(title_slug("Halo Infinite"), "halo-infinite");
        assert_eq!(title_slug("Forza  Horizon\t5"), "forza-horizon-5");
    }

    #[test]
    fn test_description_fallback() {
        let mut p = props(Vec::new());
        p.short_description = Some("s".repeat(300));
        p.product_description = Some("long".to_string());
        assert_eq!(p.description().chars().count(), 300);

        p.short_description = Some(String::new());
        p.product_description = Some("l".repeat(500));
        assert_eq!(p.description().chars().count(), 200);

        p.product_description = None;
        assert_eq!(p.description(), "");
    }

    #[test]
    fn test_normalize_payload() {
        let body = r#"{
            "Products": [{
                "ProductId": "9PP5G1F0C2B6",
                "LocalizedProperties": [{
                    "ProductTitle": "Halo Infinite",
                    "ShortDescription": "Master Chief returns.",
                    "Images": [
                        {"ImagePurpose": "Screenshot", "Uri": "//img.example/shot"},
                        {"ImagePurpose": "Poster", "Uri": "//img.example/poster"}
                    ]
                }]
            }]
        }"#;
        let catalog: MicrosoftCatalogResponse = serde_json::from_str(body).unwrap();
        let game = adapter().normalize("9PP5G1F0C2B6", catalog).unwrap();

        assert_eq!(game.name, "Halo Infinite");
        assert_eq!(game.header_image, "https://img.example/poster");
        assert_eq!(game.short_description, "Master Chief returns.");
        assert_eq!(game.store, Store::Microsoft);
        assert_eq!(game.store_id, "9PP5G1F0C2B6");
        assert_eq!(
            game.store_url,
            "https://www.xbox.com/games/store/halo-infinite/9PP5G1F0C2B6"
        );
    }

    #[test]
    fn test_empty_products_is_not_found() {
        let catalog: MicrosoftCatalogResponse =
            serde_json::from_str(r#"{"Products": []}"#).unwrap();
        let error = adapter().normalize("9XXXXXXXXXXX", catalog).unwrap_err();
        assert_eq!(error.user_message(), "Game not found");
        assert_eq!(error.to_response().status, 404);
    }

    #[test]
    fn test_missing_localized_properties_is_not_found() {
        let catalog: MicrosoftCatalogResponse =
            serde_json::from_str(r#"{"Products": [{"LocalizedProperties": []}]}"#).unwrap();
        let error = adapter().normalize("9XXXXXXXXXXX", catalog).unwrap_err();
        assert_eq!(error.user_message(), "Game data not available");
        assert!(matches!(error, StoreError::NotFound { store: Store::Microsoft, .. }));
    }

    #[test]
    fn test_untitled_product_is_not_found() {
        let bodies = [
            r#"{"Products": [{"LocalizedProperties": [{"ShortDescription": "x"}]}]}"#,
            r#"{"Products": [{"LocalizedProperties": [{"ProductTitle": ""}]}]}"#,
        ];

        for body in bodies {
            let catalog: MicrosoftCatalogResponse = serde_json::from_str(body).unwrap();
            let error = adapter().normalize("9XXXXXXXXXXX", catalog).unwrap_err();
            assert_eq!(error.user_message(), "Game data not available");
            assert_eq!(error.to_response().status, 404);
        }
    }
}
