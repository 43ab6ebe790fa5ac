pub mod file;
pub mod memory;

use cn_core::UserProfile;
use serde::{Deserialize, Serialize};

pub use file::FileLocalStore;
pub use memory::MemoryLocalStore;

/// Everything the client keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub premium_flag: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}
