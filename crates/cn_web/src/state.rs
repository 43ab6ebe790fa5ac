use cn_core::{ArticleBackend, Config, LocalStore};
use cn_player::PremiumStatus;
use cn_publish::SubmissionWorkflow;
use cn_storage::ArticleStore;
use std::sync::Arc;

pub struct AppState {
    pub backend: Arc<dyn ArticleBackend>,
    pub store: ArticleStore,
    pub local: Arc<dyn LocalStore>,
    pub premium: Arc<PremiumStatus>,
    pub workflow: SubmissionWorkflow,
    pub audio_base_url: String,
}

impl AppState {
    pub fn new(
        config: &Config,
        backend: Arc<dyn ArticleBackend>,
        local: Arc<dyn LocalStore>,
        premium: Arc<PremiumStatus>,
    ) -> Self {
        Self {
            workflow: SubmissionWorkflow::new(backend.clone(), local.clone()),
            backend,
            store: ArticleStore::new(),
            local,
            premium,
            audio_base_url: config.audio_base_url.clone(),
        }
    }
}
