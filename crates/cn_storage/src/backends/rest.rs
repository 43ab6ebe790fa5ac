use async_trait::async_trait;
use cn_core::{Article, ArticleBackend, Config, Error, Identity, NewArticle, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use super::memory::round_score;

const TABLE: &str = "user_articles";

#[derive(Serialize)]
struct VerificationPatch {
    is_verified: bool,
    verification_score: f64,
}

/// Client for the hosted REST interface of `user_articles`.
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let (url, key) = config.backend_credentials()?;
        Ok(Self::new(url, key))
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    /// Anonymous calls send the API key as the bearer token.
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", token.unwrap_or(&self.api_key)))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!("Backend rejected request ({}): {}", status, message);
        Err(Error::backend(status, message))
    }

    async fn rows(&self, response: Response) -> Result<Vec<Article>> {
        response
            .json::<Vec<Article>>()
            .await
            .map_err(|e| Error::backend(502, format!("Unexpected response from backend: {}", e)))
    }
}

/// Pull a readable message out of an error body, whatever shape it has.
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.trim().is_empty() {
                    return message.clone();
                }
            }
        }
    }
    body.trim().to_string()
}

impl fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestBackend")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ArticleBackend for RestBackend {
    fn name(&self) -> &str {
        "rest"
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        let request = self
            .client
            .get(self.endpoint())
            .query(&[("select", "*"), ("order", "published_at.desc")]);
        let response = self.send(self.authorize(request, None)).await?;
        let articles = self.rows(response).await?;
        debug!("Fetched {} articles", articles.len());
        Ok(articles)
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>> {
        let request = self
            .client
            .get(self.endpoint())
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let response = self.send(self.authorize(request, None)).await?;
        Ok(self.rows(response).await?.into_iter().next())
    }

    async fn insert_article(&self, article: &NewArticle, identity: &Identity) -> Result<Article> {
        let request = self
            .client
            .post(self.endpoint())
            .header("Prefer", "return=representation")
            .json(article);
        let response = self
            .send(self.authorize(request, Some(&identity.access_token)))
            .await?;
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::backend(502, "Backend did not return the created article"))
    }

    async fn update_verification(
        &self,
        id: &str,
        is_verified: bool,
        score: f64,
        identity: &Identity,
    ) -> Result<Article> {
        let patch = VerificationPatch {
            is_verified,
            verification_score: round_score(score)?,
        };
        let request = self
            .client
            .patch(self.endpoint())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self
            .send(self.authorize(request, Some(&identity.access_token)))
            .await?;
        // Rows hidden by the policy come back as an empty array.
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))
    }

    async fn delete_article(&self, id: &str, identity: &Identity) -> Result<()> {
        let request = self
            .client
            .delete(self.endpoint())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");
        let response = self
            .send(self.authorize(request, Some(&identity.access_token)))
            .await?;
        if self.rows(response).await?.is_empty() {
            return Err(Error::NotFound(format!("article {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"code":"42501","message":"permission denied"}"#),
            "permission denied"
        );
        assert_eq!(error_message(r#"{"msg":"JWT expired"}"#), "JWT expired");
        assert_eq!(error_message(" upstream timeout "), "upstream timeout");
        assert_eq!(error_message(r#"{"message":""}"#), r#"{"message":""}"#);
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let result = RestBackend::from_config(&Config::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let backend = RestBackend::new("https://db.example.com/", "secret");
        let debug = format!("{:?}", backend);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("https://db.example.com"));
        assert_eq!(backend.endpoint(), "https://db.example.com/rest/v1/user_articles");
    }
}
