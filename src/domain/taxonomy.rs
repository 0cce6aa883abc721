//! Category taxonomy
//!
//! A two-level mapping from first-level category key (e.g. `대_스킨케어`) to
//! the ordered second-level category names beneath it. Built once per run by
//! the navigator (or loaded from `categories.json`) and read-only afterward.
//! Entry order is the order categories were encountered on the site, so the
//! custom serde impls go through a map in document order instead of a
//! `HashMap`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::fs;

/// Opaque numeric handle (`dispCatNo`) the site uses to address a
/// second-level category's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHandle(String);

impl CategoryHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// First-level key -> ordered second-level names, in encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTaxonomy {
    entries: Vec<(String, Vec<String>)>,
}

impl CategoryTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, first_key: impl Into<String>, mids: Vec<String>) {
        self.entries.push((first_key.into(), mids));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(first, mids)| (first.as_str(), mids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (first, second) category pairs.
    pub fn category_count(&self) -> usize {
        self.entries.iter().map(|(_, mids)| mids.len()).sum()
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read taxonomy file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed taxonomy file: {}", path.display()))
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize taxonomy")?;
        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write taxonomy file: {}", path.display()))
    }
}

impl Serialize for CategoryTaxonomy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (first, mids) in &self.entries {
            map.serialize_entry(first, mids)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryTaxonomy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TaxonomyVisitor;

        impl<'de> Visitor<'de> for TaxonomyVisitor {
            type Value = CategoryTaxonomy;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of category key to list of second-level names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut taxonomy = CategoryTaxonomy::new();
                while let Some((first, mids)) = access.next_entry::<String, Vec<String>>()? {
                    taxonomy.insert(first, mids);
                }
                Ok(taxonomy)
            }
        }

        deserializer.deserialize_map(TaxonomyVisitor)
    }
}
