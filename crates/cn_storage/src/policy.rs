//! Row-level access rules for `user_articles`, as the hosted backend enforces them.
//!
//! Reads are open to everyone. Inserting needs an authenticated identity whose id
//! is the row's `author_id`. Updates and deletes are limited to the row's author.

use cn_core::{Article, Error, Identity, NewArticle, Result};

pub struct AccessPolicy;

impl AccessPolicy {
    pub fn is_authenticated(identity: &Identity) -> bool {
        !identity.user_id.trim().is_empty() && !identity.access_token.trim().is_empty()
    }

    pub fn check_insert(article: &NewArticle, identity: &Identity) -> Result<()> {
        if !Self::is_authenticated(identity) {
            return Err(Error::Forbidden(
                "You must be signed in to publish articles".to_string(),
            ));
        }
        if article.author_id != identity.user_id {
            return Err(Error::Forbidden(
                "new row violates row-level security policy for table \"user_articles\"".to_string(),
            ));
        }
        Ok(())
    }

    pub fn check_modify(row: &Article, identity: &Identity) -> Result<()> {
        if !Self::is_authenticated(identity) || row.author_id != identity.user_id {
            return Err(Error::Forbidden(format!(
                "article {} can only be changed by its author",
                row.id
            )));
        }
        Ok(())
    }
}
