use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reading certificate data {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing certificate data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("certificate data must be a JSON object keyed by certificate")]
    NotAnObject,
}

/// Certificate knowledge base keyed by certificate identifier.
///
/// Every key is reachable both as written and with underscores replaced by
/// spaces, so `driving_license` also answers to `driving license`.
#[derive(Debug, Clone, Default)]
pub struct CertificateCatalog {
    entries: HashMap<String, Value>,
}

impl CertificateCatalog {
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(map) = value else {
            return Err(CatalogError::NotAnObject);
        };
        Ok(Self::from_map(map))
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut entries = HashMap::with_capacity(map.len() * 2);
        for (key, value) in map {
            entries.insert(key.replace('_', " "), value.clone());
            entries.insert(key, value);
        }
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Like [`CertificateCatalog::load`], but an unusable file yields an empty
    /// catalog so the actions can still answer with apologies.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => {
                info!(path = %path.display(), keys = catalog.len(), "loaded certificate data");
                catalog
            }
            Err(err) => {
                warn!(%err, "certificate data unavailable; continuing with empty catalog");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key lookup without normalization.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a slot value: lowercased first, then with spaces as underscores.
    pub fn lookup(&self, cert_type: &str) -> Option<&Value> {
        let lowered = cert_type.to_lowercase();
        self.entries
            .get(&lowered)
            .or_else(|| self.entries.get(&lowered.replace(' ', "_")))
    }
}

/// The entry's `name`, or the slot value title-cased.
pub fn display_name(entry: &Value, cert_type: &str) -> String {
    entry
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| title_case(cert_type))
}

/// Uppercase the first letter of every word and lowercase the rest. A word
/// starts after any non-alphabetic character.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}

/// `snake_case_key` rendered as a title, e.g. `"two_wheeler"` → `"Two Wheeler"`.
pub fn humanize_key(key: &str) -> String {
    title_case(&key.replace('_', " "))
}
