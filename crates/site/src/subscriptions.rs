//! Interest sign-ups and unsubscribe links.
//!
//! Sign-ups are keyed by normalized email. Signing up again updates the
//! existing entry and keeps its unsubscribe token; following an unsubscribe
//! link clears `subscribed` and rotates the token so the link works once.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::content::ContentError;
use crate::locale::Locale;
use crate::pilots::normalize_email;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// What a subscriber signed up for. The wire value is the label shown in the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestType {
    #[serde(rename = "Pilotprogram")]
    Pilot,
    #[serde(rename = "Produktoppdateringer")]
    Updates,
    #[serde(rename = "Samarbeid")]
    Partnership,
    #[serde(rename = "Annet")]
    Other,
}

impl InterestType {
    pub fn all() -> [InterestType; 4] {
        [
            InterestType::Pilot,
            InterestType::Updates,
            InterestType::Partnership,
            InterestType::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestType::Pilot => "Pilotprogram",
            InterestType::Updates => "Produktoppdateringer",
            InterestType::Partnership => "Samarbeid",
            InterestType::Other => "Annet",
        }
    }

    /// Exact match against the form labels.
    pub fn parse(value: &str) -> Option<InterestType> {
        Self::all().into_iter().find(|option| option.as_str() == value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub interest_type: InterestType,
    #[serde(default = "subscribed_by_default")]
    pub subscribed: bool,
    #[serde(default)]
    pub unsubscribe_token: Option<String>,
}

fn subscribed_by_default() -> bool {
    true
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Subscription by normalized (trimmed, lowercase) email.
    async fn find_subscription(&self, email: &str) -> Result<Option<Subscription>, ContentError>;

    async fn insert_subscription(&self, subscription: Subscription) -> Result<(), ContentError>;

    /// Replace the entry with the same email. `false` when there is none.
    async fn update_subscription(&self, subscription: Subscription) -> Result<bool, ContentError>;

    /// Unsubscribe the entry holding `token` and give it `next_token`.
    /// Returns its email, or `None` when no entry holds `token`.
    async fn unsubscribe_by_token(
        &self,
        token: &str,
        next_token: &str,
    ) -> Result<Option<String>, ContentError>;
}

/// Sign-up form fields as submitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscribeForm {
    pub email: Option<String>,
    pub name: Option<String>,
    pub interest_type: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("Vennligst oppgi en gyldig e-postadresse.")]
    InvalidEmail,
    #[error("Velg hva slags interesse du har.")]
    MissingInterest,
    #[error("Kunne ikke lagre interessen akkurat nå. Prøv igjen senere.")]
    SaveFailed,
    #[error("Kunne ikke oppdatere oppføringen. Prøv igjen eller kontakt oss.")]
    UpdateFailed,
}

pub const SUBSCRIBED_MESSAGE: &str = "Takk! Vi har registrert interessen din.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsubscribeStatus {
    Invalid,
    Error,
    Expired,
    Success,
}

impl UnsubscribeStatus {
    pub fn message(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Nb, UnsubscribeStatus::Invalid) => "Lenken er ikke gyldig.",
            (Locale::Nb, UnsubscribeStatus::Error) => "Noe gikk galt. Prøv igjen senere.",
            (Locale::Nb, UnsubscribeStatus::Expired) => {
                "Lenken har utløpt eller er allerede brukt."
            }
            (Locale::Nb, UnsubscribeStatus::Success) => {
                "Du er nå avmeldt e-poster fra Y-Link."
            }
            (Locale::En, UnsubscribeStatus::Invalid) => "The link is not valid.",
            (Locale::En, UnsubscribeStatus::Error) => {
                "Something went wrong. Please try again later."
            }
            (Locale::En, UnsubscribeStatus::Expired) => {
                "The link has expired or has already been used."
            }
            (Locale::En, UnsubscribeStatus::Success) => {
                "You have been unsubscribed from Y-Link emails."
            }
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

fn new_token() -> String {
    Uuid::new_v4().to_string()
}

fn normalize_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Record interest from the sign-up form.
///
/// A new email gets a fresh unsubscribe token. A known email is subscribed
/// again with the submitted name and interest, keeping its token.
pub async fn subscribe(
    repo: &dyn SubscriptionRepository,
    form: &SubscribeForm,
) -> Result<Subscription, SubscribeError> {
    let email = normalize_email(form.email.as_deref().unwrap_or_default());
    if email.is_empty() || !is_valid_email(&email) {
        return Err(SubscribeError::InvalidEmail);
    }
    let interest_type = form
        .interest_type
        .as_deref()
        .and_then(InterestType::parse)
        .ok_or(SubscribeError::MissingInterest)?;
    let name = normalize_name(form.name.as_deref());

    let existing = repo.find_subscription(&email).await.map_err(|e| {
        log::error!("Subscription lookup failed for {}: {}", email, e);
        SubscribeError::SaveFailed
    })?;

    match existing {
        None => {
            let subscription = Subscription {
                email,
                name,
                interest_type,
                subscribed: true,
                unsubscribe_token: Some(new_token()),
            };
            repo.insert_subscription(subscription.clone())
                .await
                .map_err(|e| {
                    log::error!("Saving subscription for {} failed: {}", subscription.email, e);
                    SubscribeError::SaveFailed
                })?;
            log::info!("New subscription ({})", interest_type.as_str());
            Ok(subscription)
        }
        Some(existing) => {
            let subscription = Subscription {
                email,
                name,
                interest_type,
                subscribed: true,
                unsubscribe_token: existing.unsubscribe_token.or_else(|| Some(new_token())),
            };
            match repo.update_subscription(subscription.clone()).await {
                Ok(true) => Ok(subscription),
                Ok(false) => {
                    log::error!("Subscription for {} vanished during update", subscription.email);
                    Err(SubscribeError::UpdateFailed)
                }
                Err(e) => {
                    log::error!("Updating subscription for {} failed: {}", subscription.email, e);
                    Err(SubscribeError::UpdateFailed)
                }
            }
        }
    }
}

/// Follow an unsubscribe link. The token is rotated on success.
pub async fn unsubscribe(repo: &dyn SubscriptionRepository, token: Option<&str>) -> UnsubscribeStatus {
    let Some(token) = token.filter(|token| !token.is_empty()) else {
        return UnsubscribeStatus::Invalid;
    };

    match repo.unsubscribe_by_token(token, &new_token()).await {
        Ok(Some(email)) => {
            log::info!("Unsubscribed {}", email);
            UnsubscribeStatus::Success
        }
        Ok(None) => UnsubscribeStatus::Expired,
        Err(e) => {
            log::error!("Unsubscribe failed: {}", e);
            UnsubscribeStatus::Error
        }
    }
}
