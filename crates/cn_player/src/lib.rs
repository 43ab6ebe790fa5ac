pub mod format;
pub mod player;
pub mod premium;
pub mod session;

pub use format::{format_time, progress_percent};
pub use player::{AudioHandle, AudioOutput, MediaPlayer, SilentOutput};
pub use premium::{PremiumSignal, PremiumStatus};
pub use session::{Effect, PlaybackSession, PlaybackState, PlayerEvent, FREE_PREVIEW_SECONDS};

pub mod prelude {
    pub use super::{MediaPlayer, PlaybackState, PlayerEvent, PremiumSignal, PremiumStatus};
    pub use cn_core::{Episode, Result};
}
