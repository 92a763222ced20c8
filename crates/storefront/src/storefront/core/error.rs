//! Error types for storefront resolution with context and status classification

use serde::Serialize;
use thiserror::Error;

use super::Store;

/// Message shown for any input that no store pattern recognizes
pub const UNRECOGNIZED_URL_MESSAGE: &str =
    "Invalid URL. Supported stores: Steam, Epic Games, Xbox/Microsoft Store";

/// Message shown when an adapter breaks in an unexpected way
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to fetch game data";

/// Errors produced while resolving a storefront URL into a game record
#[derive(Error, Debug)]
pub enum StoreError {
    /// The pasted URL matched none of the supported storefront shapes
    #[error("Unrecognized storefront URL '{url}'")]
    UnrecognizedUrl { url: String },

    /// A locator reached the gateway without an id
    #[error("Missing {store} id")]
    MissingId { store: Store },

    /// Upstream answered, but has no game for this id
    #[error("{store} has no game for '{id}': {message}")]
    NotFound {
        store: Store,
        id: String,
        message: String,
    },

    /// Upstream answered with a non-success HTTP status
    #[error("{store} request to '{url}' returned HTTP {status}")]
    UpstreamStatus {
        store: Store,
        url: String,
        status: u16,
    },

    /// Upstream could not be reached
    #[error("{store} request to '{url}' failed")]
    UpstreamRequest {
        store: Store,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream did not answer within the configured timeout
    #[error("{store} request to '{url}' timed out")]
    UpstreamTimeout { store: Store, url: String },

    /// Upstream answered with a body that does not fit its schema
    #[error("{store} returned a malformed payload: {reason}")]
    MalformedPayload { store: Store, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Anything an adapter did that it never declared it could do
    #[error("Internal error in {store} adapter: {reason}")]
    Internal { store: Store, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Uniform failure taxonomy seen by callers of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    ClientInput,
    NotFound,
    UpstreamUnavailable,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status class for this kind
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::ClientInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::UpstreamUnavailable => 502,
            ErrorKind::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ClientInput => write!(f, "client-input"),
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::UpstreamUnavailable => write!(f, "upstream-unavailable"),
            ErrorKind::Internal => write!(f, "internal-error"),
        }
    }
}

/// The `{error, status}` object handed to the rendering side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

impl StoreError {
    /// Classify this error into the four caller-visible kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::UnrecognizedUrl { .. } => ErrorKind::ClientInput,
            StoreError::MissingId { .. } => ErrorKind::ClientInput,
            StoreError::Configuration { .. } => ErrorKind::ClientInput,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::UpstreamStatus { .. } => ErrorKind::UpstreamUnavailable,
            StoreError::UpstreamRequest { .. } => ErrorKind::UpstreamUnavailable,
            StoreError::UpstreamTimeout { .. } => ErrorKind::UpstreamUnavailable,
            StoreError::MalformedPayload { .. } => ErrorKind::UpstreamUnavailable,
            StoreError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::UnrecognizedUrl { .. } => "unrecognized_url",
            StoreError::MissingId { .. } => "missing_id",
            StoreError::NotFound { .. } => "not_found",
            StoreError::UpstreamStatus { .. } => "upstream_status",
            StoreError::UpstreamRequest { .. } => "upstream_request",
            StoreError::UpstreamTimeout { .. } => "upstream_timeout",
            StoreError::MalformedPayload { .. } => "malformed_payload",
            StoreError::Configuration { .. } => "configuration",
            StoreError::Internal { .. } => "internal",
        }
    }

    /// Message meant to be displayed verbatim to the person holding the card
    pub fn user_message(&self) -> String {
        match self {
            StoreError::UnrecognizedUrl { .. } => UNRECOGNIZED_URL_MESSAGE.to_string(),
            StoreError::MissingId { store } => match store {
                Store::Steam => "App ID is required".to_string(),
                Store::Epic => "Game slug is required".to_string(),
                Store::Microsoft => "Product ID is required".to_string(),
            },
            StoreError::NotFound { message, .. } => message.clone(),
            StoreError::UpstreamStatus { store, .. }
            | StoreError::UpstreamRequest { store, .. }
            | StoreError::UpstreamTimeout { store, .. }
            | StoreError::MalformedPayload { store, .. } => unavailable_message(*store).to_string(),
            StoreError::Configuration { message, .. } => message.clone(),
            StoreError::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Build the serializable `{error, status}` pair
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.user_message(),
            status: self.kind().status(),
        }
    }

    /// Attach a store to a transport error coming out of reqwest
    pub fn from_reqwest(store: Store, url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StoreError::UpstreamTimeout {
                store,
                url: url.to_string(),
            }
        } else if error.is_decode() {
            StoreError::MalformedPayload {
                store,
                reason: error.to_string(),
            }
        } else {
            StoreError::UpstreamRequest {
                store,
                url: url.to_string(),
                source: error,
            }
        }
    }
}

fn unavailable_message(store: Store) -> &'static str {
    match store {
        Store::Steam => "Failed to fetch from Steam API",
        Store::Epic => "Epic Games Store is currently unavailable",
        Store::Microsoft => "Failed to fetch from Microsoft Store API",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(ErrorKind::ClientInput.status(), 400);
        assert_eq!(ErrorKind::NotFound.status(), 404);
        assert_eq!(ErrorKind::UpstreamUnavailable.status(), 502);
        assert_eq!(ErrorKind::Internal.status(), 500);
    }

    #[test]
    fn test_unrecognized_url_is_client_input() {
        let error = StoreError::UnrecognizedUrl {
            url: "https://example.com/game".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::ClientInput);
        assert_eq!(
            error.to_response(),
            ErrorResponse {
                error: UNRECOGNIZED_URL_MESSAGE.to_string(),
                status: 400,
            }
        );
    }

    #[test]
    fn test_upstream_failures_share_a_kind() {
        let status = StoreError::UpstreamStatus {
            store: Store::Steam,
            url: "https://store.steampowered.com/api/appdetails".to_string(),
            status: 503,
        };
        let malformed = StoreError::MalformedPayload {
            store: Store::Steam,
            reason: "expected value".to_string(),
        };
        let timeout = StoreError::UpstreamTimeout {
            store: Store::Steam,
            url: "https://store.steampowered.com/api/appdetails".to_string(),
        };

        for error in [&status, &malformed, &timeout] {
            assert_eq!(error.kind(), ErrorKind::UpstreamUnavailable);
            assert_eq!(error.user_message(), "Failed to fetch from Steam API");
        }
    }

    #[test]
    fn test_missing_id_messages() {
        let cases = [
            (Store::Steam, "App ID is required"),
            (Store::Epic, "Game slug is required"),
            (Store::Microsoft, "Product ID is required"),
        ];
        for (store, message) in cases {
            let error = StoreError::MissingId { store };
            assert_eq!(error.user_message(), message);
            assert_eq!(error.kind().status(), 400);
        }
    }

    #[test]
    fn test_internal_is_distinct_from_declared_failures() {
        let error = StoreError::Internal {
            store: Store::Microsoft,
            reason: "adapter panicked".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert_eq!(error.category(), "internal");
        assert_eq!(error.to_response().status, 500);
        assert_eq!(error.user_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Internal.to_string(), "internal-error");
        assert_eq!(ErrorKind::UpstreamUnavailable.to_string(), "upstream-unavailable");
    }
}
