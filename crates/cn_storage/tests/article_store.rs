use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cn_core::{Article, ArticleBackend, Category, Error, Identity, NewArticle, Result};
use cn_storage::{ArticleStore, MemoryBackend};

fn article(id: &str, category: Category, premium: bool, day: u32) -> Article {
    let at = Utc.with_ymd_and_hms(2024, 6, day, 8, 0, 0).unwrap();
    Article {
        id: id.to_string(),
        title: format!("Story {}", id),
        summary: "A summary that is long enough".to_string(),
        content: "one two three four five".to_string(),
        image_url: "https://cdn.example.com/story.png".to_string(),
        category,
        source: "Cambliss Community".to_string(),
        author: "Desk".to_string(),
        author_id: "desk".to_string(),
        language: "en".to_string(),
        tags: vec![],
        is_premium: premium,
        read_time: 1,
        published_at: at,
        created_at: at,
        updated_at: at,
        is_verified: false,
        verification_score: 0.0,
    }
}

struct FailingBackend;

#[async_trait]
impl ArticleBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        Err(Error::Network("connection reset".to_string()))
    }

    async fn get_article(&self, _id: &str) -> Result<Option<Article>> {
        Ok(None)
    }

    async fn insert_article(&self, _article: &NewArticle, _identity: &Identity) -> Result<Article> {
        Err(Error::Network("connection reset".to_string()))
    }

    async fn update_verification(&self, id: &str, _v: bool, _s: f64, _i: &Identity) -> Result<Article> {
        Err(Error::NotFound(id.to_string()))
    }

    async fn delete_article(&self, id: &str, _identity: &Identity) -> Result<()> {
        Err(Error::NotFound(id.to_string()))
    }
}

fn seeded_backend() -> MemoryBackend {
    MemoryBackend::with_articles(vec![
        article("old", Category::Sports, false, 1),
        article("new", Category::Technology, true, 3),
        article("mid", Category::Sports, false, 2),
    ])
}

#[tokio::test]
async fn test_refresh_orders_newest_first() {
    let store = ArticleStore::new();
    let count = store.refresh(&seeded_backend()).await.unwrap();

    assert_eq!(count, 3);
    let ids: Vec<_> = store.all().await.into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn test_filters() {
    let store = ArticleStore::new();
    store.refresh(&seeded_backend()).await.unwrap();

    assert_eq!(store.by_category(Category::Sports).await.len(), 2);
    assert!(store.by_category(Category::Health).await.is_empty());
    assert_eq!(store.premium().await.len(), 1);
    assert_eq!(store.free().await.len(), 2);
    assert_eq!(store.get("mid").await.unwrap().id, "mid");
    assert!(store.get("absent").await.is_none());
}

#[tokio::test]
async fn test_episodes_follow_cache() {
    let store = ArticleStore::new();
    store.refresh(&seeded_backend()).await.unwrap();

    let episodes = store.episodes("https://audio.example.com").await;
    assert_eq!(episodes.len(), 3);
    assert_eq!(episodes[0].id, "new");
    assert_eq!(episodes[0].audio_url, "https://audio.example.com/new.mp3");
    // Five words narrate in two seconds.
    assert_eq!(episodes[0].duration, 2);

    let single = store.episode("old", "https://audio.example.com").await.unwrap();
    assert_eq!(single.title, "Story old");
}

#[tokio::test]
async fn test_failed_refresh_keeps_cache() {
    let store = ArticleStore::new();
    store.refresh(&seeded_backend()).await.unwrap();

    let result = store.refresh(&FailingBackend).await;
    assert!(matches!(result, Err(Error::Network(_))));
    assert_eq!(store.len().await, 3);
}
