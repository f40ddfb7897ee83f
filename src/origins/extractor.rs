//! Turns pasted text into deduplicated `(url, origin)` pairs.
//!
//! Candidates come from [`candidates::discover`]; each one is cleaned,
//! parsed, reduced to its registrable domain and looked up in the
//! [`OriginCatalog`]. Pairs are deduplicated on a normalization key built
//! from host, path and query so that `www.`/scheme variants of the same
//! link collapse into one.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use thiserror::Error;
use tracing::debug;
use url::{Host, Url};

use super::candidates::{self, CandidateKind};
use super::catalog::OriginCatalog;
use crate::error::CollectionError;
use crate::models::UrlOriginPair;

pub const EMPTY_INPUT: &str = "url cannot be empty";
pub const NO_URL_FOUND: &str = "no valid URL found in input text";
pub const NO_SUPPORTED_ORIGIN: &str = "no *supported* origin found in input text";

/// Base for protocol-relative candidates (`//host/path`).
static RELATIVE_BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("https://localhost/").unwrap());

/// Why a single candidate did not produce a pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("empty candidate")]
    Empty,
    #[error("unsupported protocol scheme")]
    UnsupportedScheme,
    #[error("parse error: {0}")]
    Parse(#[from] url::ParseError),
    #[error("missing host")]
    MissingHost,
    #[error("ip address host {0}")]
    IpHost(String),
    #[error("no registrable domain for host {0}")]
    NotRegistrable(String),
    #[error("unsupported origin {0}")]
    Unsupported(String),
}

/// A candidate that resolved to a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Cleaned candidate as pasted; this is what gets stored.
    pub url: String,
    /// Registrable domain (or `localhost`) used for the lookup.
    pub domain: String,
    pub origin: String,
    /// Dedup key: host without `www.`, escaped path, `?query` if present.
    pub key: String,
}

/// Stateless URL extractor bound to a catalog.
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    catalog: Arc<OriginCatalog>,
}

impl UrlExtractor {
    pub fn new(catalog: Arc<OriginCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &OriginCatalog {
        &self.catalog
    }

    /// Extract every supported URL from `text`, in first-seen order.
    pub fn extract_all(&self, text: &str) -> Result<Vec<UrlOriginPair>, CollectionError> {
        if text.trim().is_empty() {
            return Err(CollectionError::invalid_argument(EMPTY_INPUT));
        }

        let discovery = candidates::discover(text);
        if !discovery.matched {
            return Err(CollectionError::invalid_argument(NO_URL_FOUND));
        }

        let mut seen = HashSet::new();
        let mut pairs = Vec::new();

        for candidate in discovery.into_candidates() {
            let resolved = match self.resolve(candidate.text) {
                Ok(resolved) => resolved,
                Err(reason) => {
                    debug!(
                        candidate = candidate.text,
                        bare = candidate.kind == CandidateKind::Bare,
                        reason = %reason,
                        "url candidate rejected"
                    );
                    continue;
                }
            };

            if !seen.insert(format!("{}|{}", resolved.key, resolved.origin)) {
                debug!(url = %resolved.url, key = %resolved.key, "duplicate url dropped");
                continue;
            }
            pairs.push(UrlOriginPair::new(resolved.url, resolved.origin));
        }

        if pairs.is_empty() {
            return Err(CollectionError::invalid_argument(NO_SUPPORTED_ORIGIN));
        }

        debug!(count = pairs.len(), "urls extracted");
        Ok(pairs)
    }

    /// Canonicalize one raw candidate and resolve its origin.
    pub fn resolve(&self, raw: &str) -> Result<Resolved, Rejection> {
        let url = candidates::clean_candidate(raw);
        if url.is_empty() {
            return Err(Rejection::Empty);
        }

        let parsed = parse_candidate(url)?;
        let host = match parsed.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.trim_end_matches('.'),
            Some(Host::Ipv4(ip)) => return Err(Rejection::IpHost(ip.to_string())),
            Some(Host::Ipv6(ip)) => return Err(Rejection::IpHost(ip.to_string())),
            _ => return Err(Rejection::MissingHost),
        };

        let domain = registrable_domain(host)?;
        let origin = self
            .catalog
            .lookup(domain)
            .ok_or_else(|| Rejection::Unsupported(domain.to_string()))?;

        Ok(Resolved {
            url: url.to_string(),
            domain: domain.to_string(),
            origin: origin.to_string(),
            key: normalization_key(host, url, &parsed),
        })
    }
}

/// Parse a cleaned candidate, treating scheme-less forms as protocol-relative.
fn parse_candidate(url: &str) -> Result<Url, Rejection> {
    if has_http_scheme(url) {
        return Ok(Url::parse(url)?);
    }
    if url.contains("://") {
        return Err(Rejection::UnsupportedScheme);
    }
    let relative = if url.starts_with("//") {
        url.to_string()
    } else {
        format!("//{url}")
    };
    Ok(Url::options()
        .base_url(Some(&RELATIVE_BASE))
        .parse(&relative)?)
}

fn has_http_scheme(url: &str) -> bool {
    let starts_with = |prefix: &str| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    starts_with("http://") || starts_with("https://")
}

/// eTLD+1 via the public-suffix list, with a `localhost` fallback.
fn registrable_domain(host: &str) -> Result<&str, Rejection> {
    match psl::domain_str(host) {
        Some(domain) => Ok(domain),
        None if host == "localhost" => Ok(host),
        None => Err(Rejection::NotRegistrable(host.to_string())),
    }
}

/// Host without a leading `www.`, then the path as pasted and `?query`.
///
/// The path is taken from the candidate text rather than [`Url::path`], so
/// dot segments are kept and `/a/../b` stays distinct from `/b`.
fn normalization_key(host: &str, candidate: &str, url: &Url) -> String {
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let mut key = format!("{host}{}", escape_path(raw_path(candidate)));
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }
    key
}

/// The path component of a cleaned candidate, empty when it has none.
fn raw_path(candidate: &str) -> &str {
    let rest = if has_http_scheme(candidate) {
        candidate.split_once("://").map_or(candidate, |(_, rest)| rest)
    } else {
        candidate.trim_start_matches("//")
    };
    let Some(start) = rest.find(['/', '?', '#']) else {
        return "";
    };
    let tail = &rest[start..];
    if !tail.starts_with('/') {
        return "";
    }
    let end = tail.find(['?', '#']).unwrap_or(tail.len());
    &tail[..end]
}

/// Percent-encode non-ASCII bytes; existing escapes are left alone.
fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                escaped.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    escaped
}
