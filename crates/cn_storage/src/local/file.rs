use async_trait::async_trait;
use cn_core::{LocalStore, Result, UserProfile};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use super::LocalState;

const STATE_FILE: &str = "state.json";

/// Local state kept as one JSON document inside a state directory.
pub struct FileLocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLocalStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(STATE_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<LocalState> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LocalState::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, state: &LocalState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(state)?).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!("Saved local state to {}", self.path.display());
        Ok(())
    }

    async fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut LocalState) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut state = self.read().await?;
        change(&mut state);
        self.write(&state).await
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn premium_flag(&self) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.premium_flag)
    }

    async fn set_premium_flag(&self, value: Option<&str>) -> Result<()> {
        let value = value.map(str::to_string);
        self.update(move |state| state.premium_flag = value).await
    }

    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.profile)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let profile = profile.clone();
        self.update(move |state| state.profile = Some(profile)).await
    }
}
