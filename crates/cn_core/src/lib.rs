pub mod config;
pub mod episode;
pub mod error;
pub mod logging;
pub mod storage;
pub mod types;

pub use config::Config;
pub use episode::Episode;
pub use error::{Error, Result, ValidationError};
pub use storage::{ArticleBackend, LocalStore};
pub use types::{Article, Category, Identity, NewArticle, PointsEntry, UserProfile};

pub mod prelude {
    pub use crate::{Article, ArticleBackend, Category, Episode, Error, Identity, LocalStore, Result};
}
