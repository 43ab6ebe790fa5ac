use cn_core::episode::episodes_from;
use cn_core::{Article, ArticleBackend, Category, Episode, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Read-only client cache of the backend's articles.
#[derive(Clone, Default)]
pub struct ArticleStore {
    articles: Arc<RwLock<Vec<Article>>>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache with a fresh listing. The old cache survives a failed fetch.
    pub async fn refresh(&self, backend: &dyn ArticleBackend) -> Result<usize> {
        match backend.list_articles().await {
            Ok(articles) => {
                let count = articles.len();
                *self.articles.write().await = articles;
                info!("📰 Loaded {} articles from {}", count, backend.name());
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to refresh articles from {}: {}", backend.name(), e);
                Err(e)
            }
        }
    }

    pub async fn all(&self) -> Vec<Article> {
        self.articles.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Article> {
        self.articles.read().await.iter().find(|a| a.id == id).cloned()
    }

    pub async fn by_category(&self, category: Category) -> Vec<Article> {
        self.filtered(|a| a.category == category).await
    }

    pub async fn premium(&self) -> Vec<Article> {
        self.filtered(|a| a.is_premium).await
    }

    pub async fn free(&self) -> Vec<Article> {
        self.filtered(|a| !a.is_premium).await
    }

    pub async fn episodes(&self, audio_base_url: &str) -> Vec<Episode> {
        episodes_from(&self.articles.read().await, audio_base_url)
    }

    pub async fn episode(&self, id: &str, audio_base_url: &str) -> Option<Episode> {
        self.get(id)
            .await
            .map(|a| Episode::from_article(&a, audio_base_url))
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }

    async fn filtered<F>(&self, keep: F) -> Vec<Article>
    where
        F: Fn(&Article) -> bool,
    {
        self.articles
            .read()
            .await
            .iter()
            .filter(|a| keep(a))
            .cloned()
            .collect()
    }
}
