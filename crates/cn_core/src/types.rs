use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_SOURCE: &str = "Cambliss Community";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_READ_TIME: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Breaking,
    Politics,
    India,
    World,
    Business,
    Technology,
    Sports,
    Entertainment,
    Health,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Breaking,
        Category::Politics,
        Category::India,
        Category::World,
        Category::Business,
        Category::Technology,
        Category::Sports,
        Category::Entertainment,
        Category::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Breaking => "breaking",
            Category::Politics => "politics",
            Category::India => "india",
            Category::World => "world",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

/// A published row of `user_articles` as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: String,
    pub category: Category,
    pub source: String,
    pub author: String,
    pub author_id: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_premium: bool,
    pub read_time: u32,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verification_score: f64,
}

impl Article {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Body of a create-article request. Ids and timestamps are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: String,
    pub category: Category,
    pub source: String,
    pub author: String,
    pub author_id: String,
    pub language: String,
    pub tags: Vec<String>,
    pub is_premium: bool,
    pub read_time: u32,
}

/// Who is acting, as handed to us by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name shown as the article author.
    pub fn author_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub amount: u64,
    pub label: String,
    pub awarded_at: DateTime<Utc>,
}

/// Locally persisted user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub published_articles: u32,
    #[serde(default)]
    pub points_history: Vec<PointsEntry>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}
