use cn_core::types::{DEFAULT_LANGUAGE, DEFAULT_SOURCE};
use cn_core::{Category, Identity, NewArticle, ValidationError};
use serde::{Deserialize, Serialize};
use url::Url;

pub const MIN_TITLE_CHARS: usize = 10;
pub const MIN_SUMMARY_CHARS: usize = 20;
pub const MIN_CONTENT_CHARS: usize = 100;
pub const WORDS_PER_MINUTE: usize = 200;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// What the author typed into the publish form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleForm {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: String,
    pub category: Category,
    #[serde(default)]
    pub source: Option<String>,
    /// Comma separated.
    #[serde(default)]
    pub tags: String,
}

fn check_length(
    value: &str,
    min: usize,
    missing: ValidationError,
    short: fn(usize) -> ValidationError,
) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(missing);
    }
    if value.chars().count() < min {
        return Err(short(min));
    }
    Ok(())
}

impl ArticleForm {
    /// Checks run in form order; the first failure is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length(
            &self.title,
            MIN_TITLE_CHARS,
            ValidationError::MissingTitle,
            ValidationError::TitleTooShort,
        )?;
        check_length(
            &self.summary,
            MIN_SUMMARY_CHARS,
            ValidationError::MissingSummary,
            ValidationError::SummaryTooShort,
        )?;
        check_length(
            &self.content,
            MIN_CONTENT_CHARS,
            ValidationError::MissingContent,
            ValidationError::ContentTooShort,
        )?;

        let image_url = self.image_url.trim();
        if image_url.is_empty() {
            return Err(ValidationError::MissingImageUrl);
        }
        if !is_image_url(image_url) {
            return Err(ValidationError::InvalidImageUrl);
        }
        Ok(())
    }

    pub fn read_time(&self) -> u32 {
        estimate_read_time(&self.content)
    }

    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    /// The create request for this form, authored by `identity`.
    pub fn to_new_article(&self, identity: &Identity) -> NewArticle {
        let source = self
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE);
        NewArticle {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            content: self.content.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            category: self.category,
            source: source.to_string(),
            author: identity.author_name().to_string(),
            author_id: identity.user_id.clone(),
            language: DEFAULT_LANGUAGE.to_string(),
            tags: self.tag_list(),
            is_premium: false,
            read_time: self.read_time(),
        }
    }
}

/// An absolute http(s) URL ending in a known image extension. Nothing may follow
/// the extension, so query strings and fragments are rejected.
pub fn is_image_url(value: &str) -> bool {
    let value = value.trim();
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") || url.host_str().map_or(true, str::is_empty) {
        return false;
    }
    if url.query().is_some() || url.fragment().is_some() {
        return false;
    }
    let Some((stem, extension)) = value.rsplit_once('.') else {
        return false;
    };
    !stem.ends_with('/')
        && url.path() != "/"
        && IMAGE_EXTENSIONS
            .iter()
            .any(|ext| extension.eq_ignore_ascii_case(ext))
}

/// Minutes at 200 words per minute, rounded up, at least one.
pub fn estimate_read_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
