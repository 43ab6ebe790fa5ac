use async_trait::async_trait;
use cn_core::{LocalStore, Result, UserProfile};
use tokio::sync::RwLock;

use super::LocalState;

#[derive(Default)]
pub struct MemoryLocalStore {
    state: RwLock<LocalState>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LocalState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn premium_flag(&self) -> Result<Option<String>> {
        Ok(self.state.read().await.premium_flag.clone())
    }

    async fn set_premium_flag(&self, value: Option<&str>) -> Result<()> {
        self.state.write().await.premium_flag = value.map(str::to_string);
        Ok(())
    }

    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        Ok(self.state.read().await.profile.clone())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.state.write().await.profile = Some(profile.clone());
        Ok(())
    }
}
