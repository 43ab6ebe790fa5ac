use chrono::Utc;
use cn_core::{Identity, LocalStore, PointsEntry, Result, UserProfile};
use std::sync::Arc;
use tracing::info;

/// Cambliss Points credited for each published article.
pub const PUBLISH_REWARD: u64 = 50;

/// Points and counters kept in the local user profile.
#[derive(Clone)]
pub struct LoyaltyLedger {
    store: Arc<dyn LocalStore>,
}

impl LoyaltyLedger {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The stored profile if it belongs to `identity`, otherwise a fresh one.
    pub async fn profile_for(&self, identity: &Identity) -> Result<UserProfile> {
        Ok(match self.store.load_profile().await? {
            Some(profile) if profile.id == identity.user_id => profile,
            _ => UserProfile::new(&identity.user_id, identity.author_name()),
        })
    }

    pub async fn award_points(&self, identity: &Identity, amount: u64, label: &str) -> Result<UserProfile> {
        let mut profile = self.profile_for(identity).await?;
        credit(&mut profile, amount, label);
        self.store.save_profile(&profile).await?;
        info!("🏅 Awarded {} points to {} ({})", amount, profile.id, label);
        Ok(profile)
    }

    /// Credit the publishing reward and bump the published counter in one save.
    pub async fn record_publication(&self, identity: &Identity, title: &str) -> Result<UserProfile> {
        let mut profile = self.profile_for(identity).await?;
        credit(&mut profile, PUBLISH_REWARD, &format!("Published article: {}", title));
        profile.published_articles += 1;
        self.store.save_profile(&profile).await?;
        info!(
            "🏅 {} now has {} points and {} published articles",
            profile.id, profile.points, profile.published_articles
        );
        Ok(profile)
    }
}

fn credit(profile: &mut UserProfile, amount: u64, label: &str) {
    profile.points += amount;
    profile.points_history.push(PointsEntry {
        amount,
        label: label.to_string(),
        awarded_at: Utc::now(),
    });
}
