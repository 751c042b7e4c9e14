//! Trust and freshness policy for cached gateway certificates.
//!
//! Two questions are answered independently:
//! - Is the certificate inside its validity window right now?
//! - Has the cached copy outlived its update interval?
//!
//! The current time and the time the certificate was fetched are always
//! passed in, never read from a global clock.

use crate::certificate::Certificate;
use crate::config::SessionCryptoConfig;
use crate::error::CryptoResult;
use chrono::{DateTime, Utc};

/// Both trust signals for one certificate at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustAssessment {
    /// `now` lies inside `[validFrom, validTo]`
    pub trusted: bool,
    /// The update interval has elapsed since the certificate was fetched
    pub interval_elapsed: bool,
}

impl TrustAssessment {
    /// Whether the caller must fetch a new certificate before encrypting
    pub fn requires_refresh(&self) -> bool {
        !self.trusted || self.interval_elapsed
    }
}

/// Evaluates certificates against the configured validity date format
#[derive(Debug, Clone)]
pub struct TrustEvaluator {
    date_format: String,
}

impl Default for TrustEvaluator {
    fn default() -> Self {
        Self {
            date_format: SessionCryptoConfig::default().validity_date_format,
        }
    }
}

impl TrustEvaluator {
    pub fn new(config: &SessionCryptoConfig) -> CryptoResult<Self> {
        config.validate()?;
        Ok(Self {
            date_format: config.validity_date_format.clone(),
        })
    }

    /// True iff `validFrom <= now <= validTo`.
    ///
    /// # Errors
    ///
    /// [`crate::CryptoError::Validation`] for unparsable or inverted windows.
    pub fn is_trusted(&self, cert: &Certificate, now: DateTime<Utc>) -> CryptoResult<bool> {
        let window = cert.validity_window(&self.date_format).map_err(|e| {
            tracing::warn!(
                fingerprint = %cert.fingerprint(),
                error = %e,
                "Rejecting certificate with malformed validity window"
            );
            e
        })?;

        Ok(window.contains(now))
    }

    /// True when the certificate is untrusted or its update interval has
    /// elapsed since `last_fetched_at`.
    ///
    /// An interval of zero always requests a refresh, as does a
    /// `last_fetched_at` later than `now`.
    pub fn should_update(
        &self,
        cert: &Certificate,
        now: DateTime<Utc>,
        last_fetched_at: DateTime<Utc>,
    ) -> CryptoResult<bool> {
        Ok(self.assess(cert, now, last_fetched_at)?.requires_refresh())
    }

    /// Compute both signals without combining them
    pub fn assess(
        &self,
        cert: &Certificate,
        now: DateTime<Utc>,
        last_fetched_at: DateTime<Utc>,
    ) -> CryptoResult<TrustAssessment> {
        let trusted = self.is_trusted(cert, now)?;
        let interval_elapsed = interval_elapsed(cert.update_interval_secs(), now, last_fetched_at);

        if !trusted {
            tracing::debug!(
                fingerprint = %cert.fingerprint(),
                valid_from = %cert.valid_from(),
                valid_to = %cert.valid_to(),
                "Certificate outside its validity window"
            );
        }

        Ok(TrustAssessment {
            trusted,
            interval_elapsed,
        })
    }
}

fn interval_elapsed(interval_secs: u64, now: DateTime<Utc>, last_fetched_at: DateTime<Utc>) -> bool {
    if interval_secs == 0 {
        return true;
    }

    // A fetch time in the future means the clocks disagree; treat as stale.
    match u64::try_from(now.signed_duration_since(last_fetched_at).num_seconds()) {
        Ok(elapsed) => elapsed >= interval_secs,
        Err(_) => true,
    }
}

/// [`TrustEvaluator::is_trusted`] with the default configuration
pub fn is_trusted(cert: &Certificate, now: DateTime<Utc>) -> CryptoResult<bool> {
    TrustEvaluator::default().is_trusted(cert, now)
}

/// [`TrustEvaluator::should_update`] with the default configuration
pub fn should_update(
    cert: &Certificate,
    now: DateTime<Utc>,
    last_fetched_at: DateTime<Utc>,
) -> CryptoResult<bool> {
    TrustEvaluator::default().should_update(cert, now, last_fetched_at)
}
