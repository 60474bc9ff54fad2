//! Content lookups behind the language switcher and the pilot gate.
//!
//! The site reads posts, guide series and pilot users through the
//! [`ContentRepository`] and [`PilotRepository`] traits, and stores sign-ups
//! through [`SubscriptionRepository`]. The bundled implementation serves a
//! JSON snapshot from memory.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::locale::Locale;
use crate::subscriptions::{Subscription, SubscriptionRepository};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read content snapshot {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid content snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Content backend unavailable: {0}")]
    Unavailable(String),
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Blog,
    Guide,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub locale: Locale,
    pub slug: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub category: PostCategory,
    #[serde(default)]
    pub series_id: Option<String>,
    pub translations: Vec<Translation>,
}

impl Post {
    pub fn slug(&self, locale: Locale) -> Option<&str> {
        find_slug(&self.translations, locale)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub translations: Vec<Translation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotUser {
    pub email: String,
    #[serde(default)]
    pub pilot_type: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A guide matched by slug, with the series it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuidePost {
    pub post_id: u64,
    pub series_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSnapshot {
    pub posts: Vec<Post>,
    pub series: Vec<Series>,
    pub pilots: Vec<PilotUser>,
    pub subscriptions: Vec<Subscription>,
}

fn find_slug(translations: &[Translation], locale: Locale) -> Option<&str> {
    translations
        .iter()
        .find(|t| t.locale == locale)
        .map(|t| t.slug.as_str())
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Id of the blog post whose `locale` slug is `slug`.
    async fn blog_post_id_by_slug(
        &self,
        locale: Locale,
        slug: &str,
    ) -> Result<Option<u64>, ContentError>;

    /// Guide whose `locale` slug is `slug`, restricted to `series_id` when given.
    async fn guide_post_by_slug(
        &self,
        locale: Locale,
        slug: &str,
        series_id: Option<&str>,
    ) -> Result<Option<GuidePost>, ContentError>;

    async fn translation_slug(
        &self,
        post_id: u64,
        locale: Locale,
    ) -> Result<Option<String>, ContentError>;

    async fn series_slug(
        &self,
        series_id: &str,
        locale: Locale,
    ) -> Result<Option<String>, ContentError>;

    async fn series_id_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<String>, ContentError>;
}

#[async_trait]
pub trait PilotRepository: Send + Sync {
    /// Pilot user by normalized (trimmed, lowercase) email.
    async fn find_pilot(&self, email: &str) -> Result<Option<PilotUser>, ContentError>;
}

/// Serves a [`ContentSnapshot`] from memory.
///
/// Subscriptions start from the snapshot and change in memory only; they are
/// not written back to the file.
#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    snapshot: ContentSnapshot,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl InMemoryContentRepository {
    pub fn new(mut snapshot: ContentSnapshot) -> Self {
        let subscriptions = std::mem::take(&mut snapshot.subscriptions);
        Self {
            snapshot,
            subscriptions: RwLock::new(subscriptions),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let repo = Self::from_json(&json)?;
        log::info!(
            "Loaded content snapshot {}: {} posts, {} series, {} pilots, {} subscriptions",
            path.display(),
            repo.snapshot.posts.len(),
            repo.snapshot.series.len(),
            repo.snapshot.pilots.len(),
            repo.subscriptions.try_read().map_or(0, |subscriptions| subscriptions.len())
        );
        Ok(repo)
    }

    pub fn snapshot(&self) -> &ContentSnapshot {
        &self.snapshot
    }

    fn post(&self, id: u64) -> Option<&Post> {
        self.snapshot.posts.iter().find(|post| post.id == id)
    }

    fn posts_by_slug<'a>(
        &'a self,
        category: PostCategory,
        locale: Locale,
        slug: &'a str,
    ) -> impl Iterator<Item = &'a Post> + 'a {
        self.snapshot
            .posts
            .iter()
            .filter(move |post| post.category == category && post.slug(locale) == Some(slug))
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn blog_post_id_by_slug(
        &self,
        locale: Locale,
        slug: &str,
    ) -> Result<Option<u64>, ContentError> {
        Ok(self
            .posts_by_slug(PostCategory::Blog, locale, slug)
            .next()
            .map(|post| post.id))
    }

    async fn guide_post_by_slug(
        &self,
        locale: Locale,
        slug: &str,
        series_id: Option<&str>,
    ) -> Result<Option<GuidePost>, ContentError> {
        Ok(self
            .posts_by_slug(PostCategory::Guide, locale, slug)
            .find(|post| series_id.is_none() || post.series_id.as_deref() == series_id)
            .map(|post| GuidePost {
                post_id: post.id,
                series_id: post.series_id.clone(),
            }))
    }

    async fn translation_slug(
        &self,
        post_id: u64,
        locale: Locale,
    ) -> Result<Option<String>, ContentError> {
        Ok(self
            .post(post_id)
            .and_then(|post| post.slug(locale))
            .map(str::to_string))
    }

    async fn series_slug(
        &self,
        series_id: &str,
        locale: Locale,
    ) -> Result<Option<String>, ContentError> {
        Ok(self
            .snapshot
            .series
            .iter()
            .find(|series| series.id == series_id)
            .and_then(|series| find_slug(&series.translations, locale))
            .map(str::to_string))
    }

    async fn series_id_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<String>, ContentError> {
        Ok(self
            .snapshot
            .series
            .iter()
            .find(|series| find_slug(&series.translations, locale) == Some(slug))
            .map(|series| series.id.clone()))
    }
}

#[async_trait]
impl PilotRepository for InMemoryContentRepository {
    async fn find_pilot(&self, email: &str) -> Result<Option<PilotUser>, ContentError> {
        Ok(self
            .snapshot
            .pilots
            .iter()
            .find(|pilot| pilot.email.trim().eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryContentRepository {
    async fn find_subscription(&self, email: &str) -> Result<Option<Subscription>, ContentError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .iter()
            .find(|subscription| subscription.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_subscription(&self, subscription: Subscription) -> Result<(), ContentError> {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&subscription.email))
        {
            return Err(ContentError::Duplicate(subscription.email));
        }
        subscriptions.push(subscription);
        Ok(())
    }

    async fn update_subscription(&self, subscription: Subscription) -> Result<bool, ContentError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions
            .iter_mut()
            .find(|existing| existing.email.eq_ignore_ascii_case(&subscription.email))
        {
            Some(existing) => {
                *existing = subscription;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn unsubscribe_by_token(
        &self,
        token: &str,
        next_token: &str,
    ) -> Result<Option<String>, ContentError> {
        let mut subscriptions = self.subscriptions.write().await;
        Ok(subscriptions
            .iter_mut()
            .find(|subscription| subscription.unsubscribe_token.as_deref() == Some(token))
            .map(|subscription| {
                subscription.subscribed = false;
                subscription.unsubscribe_token = Some(next_token.to_string());
                subscription.email.clone()
            }))
    }
}
