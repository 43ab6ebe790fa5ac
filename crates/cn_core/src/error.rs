use thiserror::Error;

/// Message shown when a backend or network failure carries nothing better.
pub const GENERIC_FAILURE: &str = "Failed to publish article. Please try again.";

/// A rejected submission form. The display text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Title must be at least {0} characters long")]
    TitleTooShort(usize),
    #[error("Summary is required")]
    MissingSummary,
    #[error("Summary must be at least {0} characters long")]
    SummaryTooShort(usize),
    #[error("Content is required")]
    MissingContent,
    #[error("Content must be at least {0} characters long")]
    ContentTooShort(usize),
    #[error("Image URL is required")]
    MissingImageUrl,
    #[error("Please enter a valid image URL (jpg, jpeg, png, gif or webp)")]
    InvalidImageUrl,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("You must be signed in to publish articles")]
    Unauthenticated,

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Playback error: {0}")]
    Playback(String),
}

impl Error {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Error::Backend {
            status,
            message: message.into(),
        }
    }

    /// The single line a user gets to see for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::Backend { message, .. } if !message.trim().is_empty() => message.clone(),
            Error::Forbidden(message) if !message.trim().is_empty() => message.clone(),
            Error::Unauthenticated => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
