//! Epic Games Store adapter
//!
//! Epic exposes no per-slug product lookup on the public surface used here.
//! The adapter downloads the promotions catalog (one request, shared through
//! the response cache) and searches it for the slug. Matching is best effort:
//! a game missing from the catalog is reported as not found, with a few
//! catalog titles as a hint.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::{StoreAdapter, non_empty};
use crate::storefront::config::StoreConfig;
use crate::storefront::core::{
    HttpClient, NormalizedGame, Result, Store, StoreError, truncate_description,
};

/// Number of catalog titles suggested when a slug is not found
const HINT_TITLES: usize = 5;

/// Image types in order of preference for a wide card header
const IMAGE_PREFERENCE: [&str; 4] = [
    "OfferImageWide",
    "DieselStoreFrontWide",
    "featuredMedia",
    "Thumbnail",
];

#[derive(Debug, Clone, Deserialize)]
pub struct EpicCatalogResponse {
    pub data: Option<EpicCatalogData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpicCatalogData {
    #[serde(rename = "Catalog")]
    pub catalog: Option<EpicCatalog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpicCatalog {
    #[serde(rename = "searchStore")]
    pub search_store: Option<EpicSearchStore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpicSearchStore {
    pub elements: Option<Vec<EpicElement>>,
}

/// One catalog entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicElement {
    pub title: Option<String>,
    pub description: Option<String>,
    pub key_images: Option<Vec<EpicKeyImage>>,
    pub product_slug: Option<String>,
    pub url_slug: Option<String>,
    pub catalog_ns: Option<EpicCatalogNamespace>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpicKeyImage {
    #[serde(rename = "type")]
    pub image_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpicCatalogNamespace {
    pub mappings: Option<Vec<EpicPageMapping>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicPageMapping {
    pub page_slug: Option<String>,
}

impl EpicCatalogResponse {
    /// Catalog elements, if the payload carries any
    pub fn into_elements(self) -> Option<Vec<EpicElement>> {
        self.data?.catalog?.search_store?.elements
    }
}

impl EpicElement {
    fn title(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    fn url_slug(&self) -> Option<&str> {
        non_empty(self.url_slug.as_deref())
    }

    fn product_slug(&self) -> Option<&str> {
        non_empty(self.product_slug.as_deref())
    }

    fn page_slugs(&self) -> impl Iterator<Item = &str> {
        self.catalog_ns
            .iter()
            .flat_map(|ns| ns.mappings.iter().flatten())
            .filter_map(|m| non_empty(m.page_slug.as_deref()))
    }

    fn images(&self) -> &[EpicKeyImage] {
        self.key_images.as_deref().unwrap_or_default()
    }

    /// Header image: preferred types first, then whatever image comes first
    pub fn header_image(&self) -> String {
        let images = self.images();
        IMAGE_PREFERENCE
            .iter()
            .find_map(|wanted| {
                images
                    .iter()
                    .filter(|img| img.image_type.as_deref() == Some(*wanted))
                    .find_map(|img| non_empty(img.url.as_deref()))
            })
            .or_else(|| images.first().and_then(|img| non_empty(img.url.as_deref())))
            .unwrap_or_default()
            .to_string()
    }

    /// Slug for the canonical store page
    ///
    /// First page mapping, then the first path segment of the product slug,
    /// then the url slug, then whatever the caller searched for.
    pub fn page_slug<'a>(&'a self, requested: &'a str) -> &'a str {
        self.page_slugs()
            .next()
            .or_else(|| self.product_slug().and_then(|s| non_empty(s.split('/').next())))
            .or_else(|| self.url_slug())
            .unwrap_or(requested)
    }
}

/// Ordered matching rules, tried per catalog element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    UrlSlugEquals,
    UrlSlugContains,
    ProductSlugContains,
    TitleEquals,
    TitleContains,
    PageSlugContains,
}

impl MatchRule {
    pub const ORDERED: [MatchRule; 6] = [
        MatchRule::UrlSlugEquals,
        MatchRule::UrlSlugContains,
        MatchRule::ProductSlugContains,
        MatchRule::TitleEquals,
        MatchRule::TitleContains,
        MatchRule::PageSlugContains,
    ];

    fn matches(&self, element: &EpicElement, query: &SlugQuery) -> bool {
        let lower = |s: &str| s.to_lowercase();
        match self {
            MatchRule::UrlSlugEquals => {
                element.url_slug().is_some_and(|s| lower(s) == query.slug)
            }
            MatchRule::UrlSlugContains => {
                element.url_slug().is_some_and(|s| lower(s).contains(&query.slug))
            }
            MatchRule::ProductSlugContains => {
                element.product_slug().is_some_and(|s| lower(s).contains(&query.slug))
            }
            MatchRule::TitleEquals => element.title().is_some_and(|t| lower(t) == query.title),
            MatchRule::TitleContains => {
                element.title().is_some_and(|t| lower(t).contains(&query.title))
            }
            MatchRule::PageSlugContains => {
                element.page_slugs().any(|s| lower(s).contains(&query.slug))
            }
        }
    }
}

/// A slug prepared for case-insensitive comparison
#[derive(Debug, Clone)]
pub struct SlugQuery {
    /// Slug as requested, used for display
    pub search_terms: String,
    slug: String,
    title: String,
}

impl SlugQuery {
    pub fn new(slug: &str) -> Self {
        let search_terms = slug.replace('-', " ");
        Self {
            slug: slug.to_lowercase(),
            title: search_terms.to_lowercase(),
            search_terms,
        }
    }
}

/// Find the first element, in catalog order, matching any rule
///
/// Elements without a title cannot become a card and are skipped.
pub fn find_match<'a>(
    elements: &'a [EpicElement],
    query: &SlugQuery,
) -> Option<(&'a EpicElement, MatchRule)> {
    elements
        .iter()
        .filter(|element| element.title().is_some())
        .find_map(|element| {
            MatchRule::ORDERED
                .iter()
                .find(|rule| rule.matches(element, query))
                .map(|rule| (element, *rule))
        })
}

/// Titles offered when nothing matched
pub fn suggestion_titles(elements: &[EpicElement]) -> Vec<&str> {
    elements
        .iter()
        .filter(|e| e.url_slug().is_some())
        .filter_map(|e| e.title())
        .take(HINT_TITLES)
        .collect()
}

/// Adapter for the Epic promotions catalog
#[derive(Clone)]
pub struct EpicAdapter {
    http: HttpClient,
    config: Arc<StoreConfig>,
}

impl EpicAdapter {
    pub fn new(http: HttpClient, config: Arc<StoreConfig>) -> Self {
        Self { http, config }
    }

    fn catalog_url(&self) -> String {
        format!("{}/freeGamesPromotions", self.config.epic_api_base)
    }

    pub fn store_url(&self, page_slug: &str) -> String {
        format!("{}/p/{}", self.config.epic_store_base, page_slug)
    }

    /// Search a catalog payload for `slug` and normalize the hit
    pub fn normalize(&self, slug: &str, catalog: EpicCatalogResponse) -> Result<NormalizedGame> {
        let elements = catalog
            .into_elements()
            .filter(|elements| !elements.is_empty())
            .ok_or_else(|| StoreError::MalformedPayload {
                store: Store::Epic,
                reason: "Could not load Epic Games catalog".to_string(),
            })?;

        let query = SlugQuery::new(slug);
        let Some((game, rule)) = find_match(&elements, &query) else {
            let hint = suggestion_titles(&elements).join(", ");
            debug!("No Epic catalog entry matched '{}' among {} elements", slug, elements.len());
            return Err(StoreError::NotFound {
                store: Store::Epic,
                id: slug.to_string(),
                message: format!(
                    "Game \"{}\" not found. Try one of the featured games: {}",
                    query.search_terms, hint
                ),
            });
        };
        debug!("Epic slug '{}' matched {:?} via {:?}", slug, game.title, rule);

        Ok(NormalizedGame {
            name: game.title().unwrap_or_default().to_string(),
            header_image: game.header_image(),
            short_description: truncate_description(
                game.description.as_deref().unwrap_or_default(),
            ),
            store_id: slug.to_string(),
            store: Store::Epic,
            store_url: self.store_url(game.page_slug(slug)),
        })
    }
}

#[async_trait]
impl StoreAdapter for EpicAdapter {
    fn store(&self) -> Store {
        Store::Epic
    }

    async fn fetch_game(&self, id: &str) -> Result<NormalizedGame> {
        let url = self.catalog_url();
        let query = [
            ("locale", self.config.locale.as_str()),
            ("country", self.config.country.as_str()),
            ("allowCountries", self.config.country.as_str()),
        ];
        let request = self
            .http
            .get(&url)
            .query(&query)
            .header("User-Agent", &self.config.epic_user_agent)
            .header("Accept", "application/json");

        let cache_key = format!(
            "{}?locale={}&country={}",
            url, self.config.locale, self.config.country
        );
        let catalog: EpicCatalogResponse = self
            .http
            .get_json_cached(Store::Epic, &cache_key, self.config.epic_catalog_ttl, request)
            .await?;

        let game = self.normalize(id, catalog)?;
        info!("Resolved Epic slug {} to '{}'", id, game.name);
        Ok(game)
    }
}
