//! Pilot access checks for the gated download.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::content::PilotRepository;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotAccess {
    pub pilot_type: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PilotDenied {
    #[error("No email given")]
    MissingEmail,
    #[error("Not a registered pilot")]
    NotFound,
    #[error("Pilot access is inactive")]
    Inactive,
    #[error("Pilot access has expired")]
    Expired,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Whether `email` belongs to an active, unexpired pilot at `now`.
///
/// Backend failures are logged and reported as [`PilotDenied::NotFound`].
pub async fn validate_pilot_access(
    repo: &dyn PilotRepository,
    email: &str,
    now: DateTime<Utc>,
) -> Result<PilotAccess, PilotDenied> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(PilotDenied::MissingEmail);
    }

    let pilot = match repo.find_pilot(&email).await {
        Ok(Some(pilot)) => pilot,
        Ok(None) => return Err(PilotDenied::NotFound),
        Err(e) => {
            log::error!("Pilot lookup failed for {}: {}", email, e);
            return Err(PilotDenied::NotFound);
        }
    };

    if !pilot.is_active {
        return Err(PilotDenied::Inactive);
    }
    if pilot.expires_at.is_some_and(|expires| expires <= now) {
        return Err(PilotDenied::Expired);
    }

    Ok(PilotAccess {
        pilot_type: pilot.pilot_type,
        expires_at: pilot.expires_at,
    })
}
