//! Expiry policy.
//!
//! | time left until expiry | outcome                       |
//! |------------------------|-------------------------------|
//! | already past           | [`LicenseError::Expired`]     |
//! | 24 hours or less       | [`LicenseError::Blocked`]     |
//! | 7 days or less         | [`LicenseStatus::ExpiringSoon`] |
//! | more than 7 days       | [`LicenseStatus::Valid`]      |
//!
//! Expiry dates are read as 00:00:00 UTC on that day.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LicenseError, LicenseResult};
use crate::token::{parse_expiry, VerifiedToken};

/// Hours before expiry during which access is refused outright.
pub const BLOCK_WINDOW_HOURS: i64 = 24;

/// Days before expiry during which a renewal warning is raised.
pub const WARNING_WINDOW_DAYS: i64 = 7;

/// Source of "now" for expiry checks.
///
/// Only license evaluation reads this. A fixed clock exists so tests and
/// operators can check behavior at a chosen date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock UTC time.
    #[default]
    System,
    /// A pinned instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns the current instant for this clock.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    /// Parses an override value: either `YYYY-MM-DD` (midnight UTC) or RFC 3339.
    pub fn parse_override(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(date) = parse_expiry(value) {
            return Some(Self::Fixed(start_of_day(date)));
        }
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self::Fixed(dt.with_timezone(&Utc)))
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Non-blocking license outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// More than the warning window remains.
    Valid,
    /// Inside the warning window; access still granted.
    ExpiringSoon,
}

impl LicenseStatus {
    /// Returns true if callers should surface a renewal warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::ExpiringSoon)
    }
}

/// Structured result of a successful license check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseReport {
    pub company: String,
    pub email: String,
    pub expiry: NaiveDate,
    /// Whole days left until expiry.
    pub remaining_days: i64,
    pub status: LicenseStatus,
}

impl LicenseReport {
    /// Human-readable lines for terminals and UIs.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            "License Information:".to_string(),
            format!("   Company: {}", self.company),
            format!("   Email: {}", self.email),
            format!("   Expires: {}", self.expiry),
        ];
        match self.status {
            LicenseStatus::Valid => lines.push(format!(
                "Access valid for {} more days (expires {}).",
                self.remaining_days, self.expiry
            )),
            LicenseStatus::ExpiringSoon => {
                lines.push(format!(
                    "WARNING: access will expire in {} days ({}).",
                    self.remaining_days, self.expiry
                ));
                lines.push("Please contact your vendor for license renewal.".to_string());
            }
        }
        lines
    }
}

/// Applies the expiry policy to a verified token at `now`.
pub fn evaluate(token: &VerifiedToken, now: DateTime<Utc>) -> LicenseResult<LicenseReport> {
    let claims = &token.claims;
    let expires_at = start_of_day(claims.expiry);

    if now > expires_at {
        return Err(LicenseError::Expired {
            expiry: claims.expiry,
            now,
        });
    }

    let remaining = expires_at - now;
    if remaining <= TimeDelta::hours(BLOCK_WINDOW_HOURS) {
        return Err(LicenseError::Blocked {
            expiry: claims.expiry,
            hours_remaining: remaining.num_hours(),
        });
    }

    let remaining_days = remaining.num_days();
    let status = if remaining <= TimeDelta::days(WARNING_WINDOW_DAYS) {
        warn!(
            company = %claims.company,
            expiry = %claims.expiry,
            remaining_days,
            "License expires soon"
        );
        LicenseStatus::ExpiringSoon
    } else {
        info!(
            company = %claims.company,
            expiry = %claims.expiry,
            remaining_days,
            "License valid"
        );
        LicenseStatus::Valid
    };

    Ok(LicenseReport {
        company: claims.company.clone(),
        email: claims.email.clone(),
        expiry: claims.expiry,
        remaining_days,
        status,
    })
}
