use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Article;

/// Narration rate used to estimate how long an article takes to read aloud.
pub const NARRATION_WORDS_PER_MINUTE: u64 = 150;

/// A playable audio rendition of an article. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub title: String,
    /// Length in seconds.
    pub duration: u64,
    pub audio_url: String,
    pub image_url: String,
    pub published_at: DateTime<Utc>,
}

impl Episode {
    pub fn from_article(article: &Article, audio_base_url: &str) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            duration: narration_seconds(article.word_count()),
            audio_url: format!("{}/{}.mp3", audio_base_url.trim_end_matches('/'), article.id),
            image_url: article.image_url.clone(),
            published_at: article.published_at,
        }
    }
}

pub fn narration_seconds(words: usize) -> u64 {
    let words = words as u64;
    (words * 60).div_ceil(NARRATION_WORDS_PER_MINUTE).max(1)
}

pub fn episodes_from(articles: &[Article], audio_base_url: &str) -> Vec<Episode> {
    articles
        .iter()
        .map(|a| Episode::from_article(a, audio_base_url))
        .collect()
}
