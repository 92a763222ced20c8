//! Storefront URL resolution
//!
//! Maps a pasted URL onto a [`ResolvedLocator`]. Resolution is pure and total:
//! no network access, and malformed input simply fails to match.

use tracing::debug;
use url::Url;

use super::{ResolvedLocator, Store};

const STEAM_HOST: &str = "store.steampowered.com";
const EPIC_HOST: &str = "store.epicgames.com";
const XBOX_DOMAIN: &str = "xbox.com";
const MICROSOFT_DOMAIN: &str = "microsoft.com";

/// Resolve a raw storefront URL into a `(store, id)` pair
///
/// Rules are tried in order and the first match wins:
///
/// 1. `store.steampowered.com/app/<digits>` (Steam app id)
/// 2. `store.epicgames.com/<locale>/p/<slug>` (Epic page slug)
/// 3. `xbox.com/<locale>/games/store/<name>/<PRODUCT_ID>`
/// 4. `microsoft.com/<locale>/p/<name>/<PRODUCT_ID>`
///
/// Anything else yields [`ResolvedLocator::unrecognized`].
pub fn resolve(raw_url: &str) -> ResolvedLocator {
    let Some(url) = parse_lenient(raw_url) else {
        debug!("Input is not a parseable URL: {:?}", raw_url);
        return ResolvedLocator::unrecognized();
    };

    let Some(host) = url.host_str() else {
        return ResolvedLocator::unrecognized();
    };
    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();

    let resolved = steam_app(host, &segments)
        .map(|id| ResolvedLocator::new(Store::Steam, id))
        .or_else(|| epic_slug(host, &segments).map(|id| ResolvedLocator::new(Store::Epic, id)))
        .or_else(|| {
            xbox_product(host, &segments).map(|id| ResolvedLocator::new(Store::Microsoft, id))
        })
        .or_else(|| {
            microsoft_product(host, &segments).map(|id| ResolvedLocator::new(Store::Microsoft, id))
        })
        .unwrap_or_else(ResolvedLocator::unrecognized);

    debug!("Resolved {:?} to {:?}", raw_url, resolved);
    resolved
}

/// Parse the input as a URL, assuming https when the scheme was left off
fn parse_lenient(raw_url: &str) -> Option<Url> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return None;
    }

    match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some() => Some(url),
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", trimmed)).ok()
        }
        Err(_) => None,
    }
}

fn host_in_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Longest non-empty prefix of `segment` whose characters satisfy `accept`
fn leading_run(segment: &str, accept: impl Fn(char) -> bool) -> Option<&str> {
    let end = segment
        .char_indices()
        .find(|(_, c)| !accept(*c))
        .map(|(i, _)| i)
        .unwrap_or(segment.len());
    (end > 0).then(|| &segment[..end])
}

fn is_locale(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
}

fn steam_app(host: &str, segments: &[&str]) -> Option<String> {
    if host != STEAM_HOST {
        return None;
    }
    match segments {
        ["app", id, ..] => leading_run(id, |c| c.is_ascii_digit()).map(str::to_string),
        _ => None,
    }
}

fn epic_slug(host: &str, segments: &[&str]) -> Option<String> {
    if host != EPIC_HOST {
        return None;
    }
    match segments {
        [locale, p, slug, ..] if is_locale(locale) && p.eq_ignore_ascii_case("p") => {
            leading_run(slug, |c| c.is_ascii_alphanumeric() || c == '-').map(str::to_string)
        }
        _ => None,
    }
}

fn xbox_product(host: &str, segments: &[&str]) -> Option<String> {
    if !host_in_domain(host, XBOX_DOMAIN) {
        return None;
    }
    match segments {
        [locale, games, store, name, id, ..]
            if is_locale(locale)
                && games.eq_ignore_ascii_case("games")
                && store.eq_ignore_ascii_case("store")
                && !name.is_empty() =>
        {
            leading_run(id, |c| c.is_ascii_alphanumeric()).map(str::to_string)
        }
        _ => None,
    }
}

fn microsoft_product(host: &str, segments: &[&str]) -> Option<String> {
    if !host_in_domain(host, MICROSOFT_DOMAIN) {
        return None;
    }
    match segments {
        [locale, p, name, id, ..]
            if is_locale(locale) && p.eq_ignore_ascii_case("p") && !name.is_empty() =>
        {
            leading_run(id, |c| c.is_ascii_alphanumeric()).map(str::to_string)
        }
        _ => None,
    }
}
