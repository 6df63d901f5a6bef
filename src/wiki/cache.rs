use crate::write_output_file;
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{FetchPolicy, fetch_text};

/// Read-through disk cache of fetched pages. Entries are never invalidated;
/// deleting a file forces the next run to fetch it again.
pub struct PageCache {
    client: Client,
    dir: PathBuf,
    policy: FetchPolicy,
}

impl PageCache {
    pub fn new(client: Client, dir: impl Into<PathBuf>, policy: FetchPolicy) -> Self {
        Self {
            client,
            dir: dir.into(),
            policy,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.html", url_to_filename(url)))
    }

    pub async fn load(&self, url: &str) -> Result<String> {
        let path = self.path_for(url);
        let cached = fs::try_exists(&path)
            .await
            .with_context(|| format!("failed to check cache file {}", path.display()))?;
        if cached {
            tracing::debug!(url, "serving page from cache");
            return fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read cache file {}", path.display()));
        }

        tracing::info!("fetching {url}");
        let body = fetch_text(&self.client, url, self.policy).await?;
        write_output_file(&path, body.as_bytes()).await?;
        Ok(body)
    }
}

pub fn url_to_filename(url: &str) -> String {
    url.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{Page, local_client, serve_pages};
    use super::*;

    #[test]
    fn filenames_replace_every_symbol() {
        assert_eq!(
            url_to_filename("https://eldenring.wiki.fextralife.com/Lordsworn's+Greatsword"),
            "https___eldenring_wiki_fextralife_com_Lordsworn_s_Greatsword"
        );
    }

    #[tokio::test]
    async fn cached_pages_are_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(Client::new(), dir.path(), FetchPolicy::default());
        let url = "https://wiki.invalid/Dagger";
        std::fs::write(cache.path_for(url), "<html>cached</html>").unwrap();

        let body = cache.load(url).await.unwrap();
        assert_eq!(body, "<html>cached</html>");
    }

    #[tokio::test]
    async fn fetch_failures_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(Client::new(), dir.path(), FetchPolicy::default());
        let result = cache.load("http://127.0.0.1:9/Dagger").await;
        assert!(result.is_err());
        assert!(!cache.path_for("http://127.0.0.1:9/Dagger").exists());
    }

    #[tokio::test]
    async fn missed_pages_are_fetched_persisted_and_reused() {
        let (base_url, server) = serve_pages(vec![Page::new("/Dagger", "<html>fresh</html>")]).await;
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(local_client(), dir.path().join("pages"), FetchPolicy::default());
        let url = format!("{base_url}/Dagger");

        assert_eq!(cache.load(&url).await.unwrap(), "<html>fresh</html>");
        assert_eq!(
            std::fs::read_to_string(cache.path_for(&url)).unwrap(),
            "<html>fresh</html>"
        );

        server.abort();
        let _ = server.await;
        assert_eq!(cache.load(&url).await.unwrap(), "<html>fresh</html>");
    }

    #[tokio::test]
    async fn error_statuses_are_not_cached() {
        let (base_url, server) = serve_pages(Vec::new()).await;
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(local_client(), dir.path(), FetchPolicy::default());
        let url = format!("{base_url}/Missing");

        assert!(cache.load(&url).await.is_err());
        assert!(!cache.path_for(&url).exists());
        server.abort();
    }
}
