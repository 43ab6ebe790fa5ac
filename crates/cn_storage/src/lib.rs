use cn_core::{ArticleBackend, Config, Error, Result};
use std::sync::Arc;

pub mod backends;
pub mod local;
pub mod policy;
pub mod store;

pub use backends::*;
pub use local::{FileLocalStore, LocalState, MemoryLocalStore};
pub use policy::AccessPolicy;
pub use store::ArticleStore;

/// Build a backend by name: `memory` or `rest`.
pub fn create_backend(kind: &str, config: &Config) -> Result<Arc<dyn ArticleBackend>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryBackend::new())),
        "rest" => Ok(Arc::new(RestBackend::from_config(config)?)),
        other => Err(Error::Configuration(format!(
            "Unknown backend '{}'. Available backends: memory, rest",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::{create_backend, ArticleStore, FileLocalStore, MemoryBackend, MemoryLocalStore, RestBackend};
}
