use cn_core::{Article, ArticleBackend, Error, Identity, LocalStore, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::form::ArticleForm;
use crate::loyalty::{LoyaltyLedger, PUBLISH_REWARD};

/// What happened to the loyalty reward after the row was inserted.
///
/// The insert and the reward are not one transaction. A failed reward does not
/// undo the published article; it is reported here instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PointsAward {
    Awarded { points: u64, total: u64, published_articles: u32 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub article: Article,
    pub points: PointsAward,
}

#[derive(Clone)]
pub struct SubmissionWorkflow {
    backend: Arc<dyn ArticleBackend>,
    ledger: LoyaltyLedger,
}

impl SubmissionWorkflow {
    pub fn new(backend: Arc<dyn ArticleBackend>, store: Arc<dyn LocalStore>) -> Self {
        Self {
            backend,
            ledger: LoyaltyLedger::new(store),
        }
    }

    pub fn ledger(&self) -> &LoyaltyLedger {
        &self.ledger
    }

    /// Validate, insert once, then credit the reward. Never retries.
    pub async fn submit(&self, form: &ArticleForm, identity: Option<&Identity>) -> Result<SubmissionOutcome> {
        form.validate()?;
        let identity = identity.ok_or(Error::Unauthenticated)?;

        let request = form.to_new_article(identity);
        let article = match self.backend.insert_article(&request, identity).await {
            Ok(article) => article,
            Err(e) => {
                warn!("Publishing '{}' failed on {}: {}", request.title, self.backend.name(), e);
                return Err(e);
            }
        };
        info!("✅ Published '{}' as {}", article.title, article.id);

        let points = match self.ledger.record_publication(identity, &article.title).await {
            Ok(profile) => PointsAward::Awarded {
                points: PUBLISH_REWARD,
                total: profile.points,
                published_articles: profile.published_articles,
            },
            Err(e) => {
                warn!("Article {} was published but the reward failed: {}", article.id, e);
                PointsAward::Failed { reason: e.to_string() }
            }
        };

        Ok(SubmissionOutcome { article, points })
    }
}
