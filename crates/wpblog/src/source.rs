//! Loads saved WordPress REST responses from disk.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::time::timeout;

use crate::content::WordPressPage;

/// Reads one `/wp/v2/posts` or `/wp/v2/pages` response.
pub async fn load_collection(path: &Path) -> Result<Vec<WordPressPage>> {
    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read content file: {}", path.display()))?;
    let items: Vec<WordPressPage> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid WordPress response in: {}", path.display()))?;
    log::info!("Loaded {} items from {}", items.len(), path.display());
    Ok(items)
}

/// Loads one collection, giving up after `limit`.
pub async fn load_with_timeout(path: &Path, limit: Duration) -> Result<Vec<WordPressPage>> {
    with_timeout(path, limit, load_collection(path)).await
}

async fn with_timeout<T, F>(path: &Path, limit: Duration, load: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, load).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "Timed out after {:?} loading {}",
            limit,
            path.display()
        )),
    }
}

/// Loads pages and posts concurrently. Either failure fails the whole load.
pub async fn load_all(
    pages_path: &Path,
    posts_path: &Path,
    limit: Duration,
) -> Result<(Vec<WordPressPage>, Vec<WordPressPage>)> {
    let result = tokio::try_join!(
        load_with_timeout(pages_path, limit),
        load_with_timeout(posts_path, limit)
    );
    if let Err(e) = &result {
        log::error!("Error loading content: {:#}", e);
    }
    result
}
