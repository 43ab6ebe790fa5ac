pub mod form;
pub mod loyalty;
pub mod workflow;

pub use form::{estimate_read_time, is_image_url, parse_tags, ArticleForm};
pub use loyalty::{LoyaltyLedger, PUBLISH_REWARD};
pub use workflow::{PointsAward, SubmissionOutcome, SubmissionWorkflow};

pub mod prelude {
    pub use super::{ArticleForm, PointsAward, SubmissionOutcome, SubmissionWorkflow};
    pub use cn_core::{Error, Identity, Result};
}
