//! JSON persistence for product datasets
//!
//! Product arrays are written human-readable (pretty, UTF-8 as-is). Also
//! hosts the debug dump written when a category's first listing page comes
//! back empty.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tracing::info;

use crate::domain::product::Product;

static FILENAME_HOSTILE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());

/// Replace filesystem-hostile characters so category names can become file
/// names.
pub fn sanitize_filename(name: &str) -> String {
    FILENAME_HOSTILE.replace_all(name, "_").into_owned()
}

pub async fn save_products(path: impl AsRef<Path>, products: &[Product]) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(products).context("Failed to serialize products")?;
    fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write products file: {}", path.display()))?;
    info!(count = products.len(), path = %path.display(), "saved products");
    Ok(())
}

pub async fn load_products(path: impl AsRef<Path>) -> Result<Vec<Product>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read products file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Malformed products file: {}", path.display()))
}

/// Like [`load_products`] but a missing file yields an empty dataset, for
/// merge runs where no recovery output exists.
pub async fn load_products_or_empty(path: impl AsRef<Path>) -> Result<Vec<Product>> {
    let path = path.as_ref();
    if !fs::try_exists(path).await.unwrap_or(false) {
        info!(path = %path.display(), "products file absent, treating as empty");
        return Ok(Vec::new());
    }
    load_products(path).await
}

/// Dump raw page markup for diagnosis. Not part of the stable contract.
pub async fn dump_debug_page(
    dir: impl AsRef<Path>,
    first_key: &str,
    mid_name: &str,
    html: &str,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create debug dir: {}", dir.display()))?;
    let file = dir.join(format!(
        "debug_{}_{}.html",
        sanitize_filename(first_key),
        sanitize_filename(mid_name)
    ));
    fs::write(&file, html)
        .await
        .with_context(|| format!("Failed to write debug dump: {}", file.display()))?;
    Ok(file)
}
