use async_trait::async_trait;
use chrono::Utc;
use cn_core::types::{DEFAULT_LANGUAGE, DEFAULT_READ_TIME, DEFAULT_SOURCE};
use cn_core::{Article, ArticleBackend, Error, Identity, NewArticle, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::policy::AccessPolicy;

/// In-process stand-in for the hosted table. Enforces the same access rules.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    rows: Arc<RwLock<Vec<Article>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(articles)),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

pub(crate) fn round_score(score: f64) -> Result<f64> {
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(Error::backend(
            400,
            "verification_score must be between 0.00 and 1.00",
        ));
    }
    Ok((score * 100.0).round() / 100.0)
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[async_trait]
impl ArticleBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        let mut articles = self.rows.read().await.clone();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(articles)
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>> {
        Ok(self.rows.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_article(&self, article: &NewArticle, identity: &Identity) -> Result<Article> {
        AccessPolicy::check_insert(article, identity)?;

        let now = Utc::now();
        let row = Article {
            id: Uuid::new_v4().to_string(),
            title: article.title.clone(),
            summary: article.summary.clone(),
            content: article.content.clone(),
            image_url: article.image_url.clone(),
            category: article.category,
            source: or_default(&article.source, DEFAULT_SOURCE),
            author: article.author.clone(),
            author_id: article.author_id.clone(),
            language: or_default(&article.language, DEFAULT_LANGUAGE),
            tags: article.tags.clone(),
            is_premium: article.is_premium,
            read_time: if article.read_time == 0 { DEFAULT_READ_TIME } else { article.read_time },
            published_at: now,
            created_at: now,
            updated_at: now,
            is_verified: false,
            verification_score: 0.0,
        };

        debug!("Inserted article {} by {}", row.id, row.author_id);
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn update_verification(
        &self,
        id: &str,
        is_verified: bool,
        score: f64,
        identity: &Identity,
    ) -> Result<Article> {
        let score = round_score(score)?;
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))?;
        AccessPolicy::check_modify(row, identity)?;

        row.is_verified = is_verified;
        row.verification_score = score;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_article(&self, id: &str, identity: &Identity) -> Result<()> {
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))?;
        AccessPolicy::check_modify(&rows[index], identity)?;
        rows.remove(index);
        Ok(())
    }
}
