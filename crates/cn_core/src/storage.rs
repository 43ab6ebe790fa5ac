use async_trait::async_trait;

use crate::types::{Article, Identity, NewArticle, UserProfile};
use crate::Result;

/// The hosted `user_articles` table.
#[async_trait]
pub trait ArticleBackend: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// All published articles, newest first.
    async fn list_articles(&self) -> Result<Vec<Article>>;

    async fn get_article(&self, id: &str) -> Result<Option<Article>>;

    /// Insert a new row and return it as the backend stored it.
    async fn insert_article(&self, article: &NewArticle, identity: &Identity) -> Result<Article>;

    /// Update the verification fields of a row owned by `identity`.
    async fn update_verification(
        &self,
        id: &str,
        is_verified: bool,
        score: f64,
        identity: &Identity,
    ) -> Result<Article>;

    async fn delete_article(&self, id: &str, identity: &Identity) -> Result<()>;
}

/// Client-side persisted state: the premium flag string and the user profile.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn premium_flag(&self) -> Result<Option<String>>;

    async fn set_premium_flag(&self, value: Option<&str>) -> Result<()>;

    async fn load_profile(&self) -> Result<Option<UserProfile>>;

    async fn save_profile(&self, profile: &UserProfile) -> Result<()>;
}
