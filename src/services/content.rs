//! Content service
//!
//! FAQs, banners, legal texts and contacts. Public reads go through the
//! cache; each mutation drops the keys of the entity it touched.

use crate::cache::{keys, CacheLayer, SharedCache};
use crate::db::repositories::{BannerRepository, ContactRepository, FaqRepository, LegalRepository};
use crate::models::{
    Banner, BannerInput, ContactInfo, Faq, FaqInput, LegalContent, LegalInput, LegalKind,
    UpdateBannerInput, UpdateContactInput, UpdateFaqInput,
};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ContentServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Repositories backing the content service
pub struct ContentRepositories {
    pub faqs: Arc<dyn FaqRepository>,
    pub banners: Arc<dyn BannerRepository>,
    pub legal: Arc<dyn LegalRepository>,
    pub contacts: Arc<dyn ContactRepository>,
}

pub struct ContentService {
    repos: ContentRepositories,
    cache: SharedCache,
    cache_ttl: Duration,
}

fn list_key(prefix: &str, active_only: bool) -> String {
    format!("{}{}", prefix, if active_only { "active" } else { "all" })
}

impl ContentService {
    pub fn new(repos: ContentRepositories, cache: SharedCache) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repos,
            cache,
            cache_ttl,
        }
    }

    async fn drop_prefix(&self, prefix: &str) -> Result<(), ContentServiceError> {
        self.cache
            .delete_pattern(&format!("{}*", prefix))
            .await
            .context("Failed to invalidate content cache")?;
        Ok(())
    }

    // FAQs

    pub async fn list_faqs(&self, active_only: bool) -> Result<Vec<Faq>, ContentServiceError> {
        let cache_key = list_key(keys::FAQS, active_only);
        if let Some(faqs) = self.cache.get::<Vec<Faq>>(&cache_key).await.ok().flatten() {
            return Ok(faqs);
        }
        let faqs = self.repos.faqs.list(active_only).await.context("Failed to list FAQs")?;
        let _ = self.cache.set(&cache_key, &faqs, self.cache_ttl).await;
        Ok(faqs)
    }

    pub async fn create_faq(&self, input: FaqInput) -> Result<Faq, ContentServiceError> {
        let faq = self
            .repos
            .faqs
            .create(&input.into_faq())
            .await
            .context("Failed to create FAQ")?;
        self.drop_prefix(keys::FAQS).await?;
        Ok(faq)
    }

    pub async fn update_faq(&self, id: &str, input: UpdateFaqInput) -> Result<Faq, ContentServiceError> {
        if input.is_empty() {
            return Err(ContentServiceError::ValidationError("No fields to update".to_string()));
        }
        let mut faq = self
            .repos
            .faqs
            .get_by_id(id)
            .await
            .context("Failed to get FAQ")?
            .ok_or_else(|| ContentServiceError::NotFound("FAQ not found".to_string()))?;
        input.apply_to(&mut faq);
        let faq = self.repos.faqs.update(&faq).await.context("Failed to update FAQ")?;
        self.drop_prefix(keys::FAQS).await?;
        Ok(faq)
    }

    pub async fn delete_faq(&self, id: &str) -> Result<(), ContentServiceError> {
        if !self.repos.faqs.delete(id).await.context("Failed to delete FAQ")? {
            return Err(ContentServiceError::NotFound("FAQ not found".to_string()));
        }
        self.drop_prefix(keys::FAQS).await
    }

    // Banners

    pub async fn list_banners(&self, active_only: bool) -> Result<Vec<Banner>, ContentServiceError> {
        let cache_key = list_key(keys::BANNERS, active_only);
        if let Some(banners) = self.cache.get::<Vec<Banner>>(&cache_key).await.ok().flatten() {
            return Ok(banners);
        }
        let banners = self
            .repos
            .banners
            .list(active_only)
            .await
            .context("Failed to list banners")?;
        let _ = self.cache.set(&cache_key, &banners, self.cache_ttl).await;
        Ok(banners)
    }

    pub async fn create_banner(&self, input: BannerInput) -> Result<Banner, ContentServiceError> {
        let banner = self
            .repos
            .banners
            .create(&input.into_banner())
            .await
            .context("Failed to create banner")?;
        self.drop_prefix(keys::BANNERS).await?;
        Ok(banner)
    }

    pub async fn update_banner(
        &self,
        id: &str,
        input: UpdateBannerInput,
    ) -> Result<Banner, ContentServiceError> {
        if input.is_empty() {
            return Err(ContentServiceError::ValidationError("No fields to update".to_string()));
        }
        let mut banner = self
            .repos
            .banners
            .get_by_id(id)
            .await
            .context("Failed to get banner")?
            .ok_or_else(|| ContentServiceError::NotFound("Banner not found".to_string()))?;
        input.apply_to(&mut banner);
        let banner = self
            .repos
            .banners
            .update(&banner)
            .await
            .context("Failed to update banner")?;
        self.drop_prefix(keys::BANNERS).await?;
        Ok(banner)
    }

    pub async fn delete_banner(&self, id: &str) -> Result<(), ContentServiceError> {
        if !self.repos.banners.delete(id).await.context("Failed to delete banner")? {
            return Err(ContentServiceError::NotFound("Banner not found".to_string()));
        }
        self.drop_prefix(keys::BANNERS).await
    }

    // Legal texts

    /// Saved text for `kind`, or empty text if none was saved yet
    pub async fn get_legal(&self, kind: &str) -> Result<LegalContent, ContentServiceError> {
        let kind = parse_kind(kind)?;
        let cache_key = format!("{}{}", keys::LEGAL, kind);
        if let Some(content) = self.cache.get::<LegalContent>(&cache_key).await.ok().flatten() {
            return Ok(content);
        }
        let content = self
            .repos
            .legal
            .get(kind)
            .await
            .context("Failed to get legal content")?
            .unwrap_or_else(|| LegalContent::empty(kind));
        let _ = self.cache.set(&cache_key, &content, self.cache_ttl).await;
        Ok(content)
    }

    pub async fn save_legal(&self, kind: &str, input: LegalInput) -> Result<LegalContent, ContentServiceError> {
        let kind = parse_kind(kind)?;
        let content = LegalContent {
            kind,
            content_ro: input.content_ro,
            content_ru: input.content_ru,
            updated_at: Some(Utc::now()),
        };
        let content = self
            .repos
            .legal
            .upsert(&content)
            .await
            .context("Failed to save legal content")?;
        self.cache
            .delete(&format!("{}{}", keys::LEGAL, kind))
            .await
            .context("Failed to invalidate legal cache")?;
        Ok(content)
    }

    // Contacts

    pub async fn get_contacts(&self) -> Result<ContactInfo, ContentServiceError> {
        if let Some(contacts) = self.cache.get::<ContactInfo>(keys::CONTACTS).await.ok().flatten() {
            return Ok(contacts);
        }
        let contacts = self
            .repos
            .contacts
            .get()
            .await
            .context("Failed to get contacts")?
            .unwrap_or_default();
        let _ = self.cache.set(keys::CONTACTS, &contacts, self.cache_ttl).await;
        Ok(contacts)
    }

    /// Merge the provided fields into the stored record
    pub async fn update_contacts(&self, input: UpdateContactInput) -> Result<ContactInfo, ContentServiceError> {
        let mut contacts = self
            .repos
            .contacts
            .get()
            .await
            .context("Failed to get contacts")?
            .unwrap_or_default();
        input.apply_to(&mut contacts);
        let contacts = self
            .repos
            .contacts
            .save(&contacts)
            .await
            .context("Failed to save contacts")?;
        self.cache
            .delete(keys::CONTACTS)
            .await
            .context("Failed to invalidate contacts cache")?;
        Ok(contacts)
    }
}

fn parse_kind(value: &str) -> Result<LegalKind, ContentServiceError> {
    value
        .parse()
        .map_err(|e: anyhow::Error| ContentServiceError::ValidationError(e.to_string()))
}
