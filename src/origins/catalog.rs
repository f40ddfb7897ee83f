//! Host to origin-label catalog loaded from a JSON document at startup.
//!
//! The document looks like:
//!
//! ```json
//! {
//!   "support": ["Bilibili", "Gmail"],
//!   "items": [
//!     { "host": "bilibili.com", "origin": "Bilibili" },
//!     { "host": "gmail.com", "origin": "Gmail" }
//!   ]
//! }
//! ```
//!
//! Hosts are registrable domains (or `localhost`). The catalog is read-only
//! once built and is shared by reference.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading the catalog. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read origin file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse origin file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("origin map is empty, check file: {0}")]
    Empty(String),
    #[error("invalid origin entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct OriginDocument {
    #[serde(default)]
    support: Vec<String>,
    #[serde(default)]
    items: Vec<OriginItem>,
}

#[derive(Debug, Deserialize)]
struct OriginItem {
    host: String,
    origin: String,
}

/// Immutable host → origin-label mapping.
#[derive(Debug, Clone)]
pub struct OriginCatalog {
    origins: HashMap<String, String>,
    supported: Vec<String>,
}

impl OriginCatalog {
    /// Load the catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&data, &path.display().to_string())?;
        info!(
            path = %path.display(),
            hosts = catalog.len(),
            labels = catalog.labels().len(),
            "origin catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse the catalog from a JSON document. `name` is used in error messages.
    pub fn from_json_str(json: &str, name: &str) -> Result<Self, CatalogError> {
        let doc: OriginDocument = serde_json::from_str(json)?;
        Self::from_document(doc, name)
    }

    /// Build a catalog from `(host, label)` entries.
    pub fn from_entries<I, H, L>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (H, L)>,
        H: Into<String>,
        L: Into<String>,
    {
        let items = entries
            .into_iter()
            .map(|(host, origin)| OriginItem {
                host: host.into(),
                origin: origin.into(),
            })
            .collect();
        Self::from_document(
            OriginDocument {
                support: Vec::new(),
                items,
            },
            "<entries>",
        )
    }

    fn from_document(doc: OriginDocument, name: &str) -> Result<Self, CatalogError> {
        if doc.items.is_empty() {
            return Err(CatalogError::Empty(name.to_string()));
        }

        let mut origins = HashMap::with_capacity(doc.items.len());
        let mut labels_in_order = Vec::new();

        for (index, item) in doc.items.into_iter().enumerate() {
            let label = item.origin.trim();
            if label.is_empty() {
                return Err(CatalogError::InvalidEntry {
                    index,
                    reason: format!("empty origin for host {:?}", item.host),
                });
            }
            let host = normalize_catalog_host(&item.host).ok_or_else(|| {
                CatalogError::InvalidEntry {
                    index,
                    reason: format!("invalid host {:?}", item.host),
                }
            })?;

            if !labels_in_order.iter().any(|l: &String| l == label) {
                labels_in_order.push(label.to_string());
            }
            if let Some(previous) = origins.insert(host.clone(), label.to_string()) {
                warn!(host = %host, previous = %previous, origin = %label, "duplicate origin host, last entry wins");
            }
        }

        let supported = if doc.support.is_empty() {
            labels_in_order
        } else {
            doc.support
        };

        Ok(Self { origins, supported })
    }

    /// Look up the origin label for a registrable domain.
    pub fn lookup(&self, host: &str) -> Option<&str> {
        self.origins.get(host).map(String::as_str)
    }

    /// Every label a lookup can return.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.origins.values().map(String::as_str).collect()
    }

    /// Advisory list of supported sources for display.
    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    /// Number of hosts in the catalog.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Normalize a configured host the way the URL parser normalizes hostnames:
/// IDNA to ASCII, lowercase, no trailing dot.
fn normalize_catalog_host(host: &str) -> Option<String> {
    let host = host.trim().trim_end_matches('.');
    if host.is_empty() {
        return None;
    }
    match url::Host::parse(host).ok()? {
        url::Host::Domain(domain) => Some(domain),
        _ => None,
    }
}
