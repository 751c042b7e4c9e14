//! Gateway encryption certificate value type.

use crate::error::{CryptoError, CryptoResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway-issued encryption certificate.
///
/// Immutable once built. Validity dates are kept exactly as the issuer sent
/// them and only parsed when a trust decision is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Opaque identifier used by callers as a cache key
    fingerprint: String,
    /// Base64 DER of the certificate or its public key
    #[serde(alias = "base64Representation")]
    public_key_material: String,
    valid_from: String,
    valid_to: String,
    /// Seconds a cached copy may be reused before a refresh is due
    update_interval: u64,
}

/// Which end of the validity window a date is parsed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityBound {
    /// `validFrom`: a bare date starts at 00:00:00 UTC
    NotBefore,
    /// `validTo`: a bare date covers the whole day, up to 23:59:59.999999999 UTC
    NotAfter,
}

impl ValidityBound {
    /// Issuer field name the bound is read from
    pub fn field(self) -> &'static str {
        match self {
            ValidityBound::NotBefore => "validFrom",
            ValidityBound::NotAfter => "validTo",
        }
    }
}

/// Parsed validity window, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl ValidityWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.not_before <= instant && instant <= self.not_after
    }
}

impl Certificate {
    /// Build a certificate from issuer values.
    ///
    /// `update_interval_secs` is in whole seconds, as on the wire; zero means
    /// every check requests a refresh.
    pub fn new(
        fingerprint: impl Into<String>,
        public_key_material: impl Into<String>,
        valid_from: impl Into<String>,
        valid_to: impl Into<String>,
        update_interval_secs: u64,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            public_key_material: public_key_material.into(),
            valid_from: valid_from.into(),
            valid_to: valid_to.into(),
            update_interval: update_interval_secs,
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn public_key_material(&self) -> &str {
        &self.public_key_material
    }

    pub fn valid_from(&self) -> &str {
        &self.valid_from
    }

    pub fn valid_to(&self) -> &str {
        &self.valid_to
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    pub(crate) fn update_interval_secs(&self) -> u64 {
        self.update_interval
    }

    /// Parse the validity window using `date_format` for non RFC 3339 dates.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Validation`] when either date does not parse or when
    /// `validFrom` is after `validTo`.
    pub fn validity_window(&self, date_format: &str) -> CryptoResult<ValidityWindow> {
        let not_before =
            parse_validity_date(ValidityBound::NotBefore, &self.valid_from, date_format)?;
        let not_after = parse_validity_date(ValidityBound::NotAfter, &self.valid_to, date_format)?;

        if not_before > not_after {
            return Err(CryptoError::Validation(format!(
                "certificate {} is valid from {} but expires {}",
                self.fingerprint, self.valid_from, self.valid_to
            )));
        }

        Ok(ValidityWindow {
            not_before,
            not_after,
        })
    }

    /// Check the certificate invariants without making a trust decision
    pub fn validate(&self, date_format: &str) -> CryptoResult<()> {
        self.validity_window(date_format).map(|_| ())
    }
}

/// Parse a validity date.
///
/// RFC 3339 timestamps are accepted as-is (normalised to UTC). Anything else
/// goes through `format`. Date-only values resolve to the start of the day
/// for [`ValidityBound::NotBefore`] and to its last nanosecond for
/// [`ValidityBound::NotAfter`].
pub fn parse_validity_date(
    bound: ValidityBound,
    raw: &str,
    format: &str,
) -> CryptoResult<DateTime<Utc>> {
    let value = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
        return Ok(parsed.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
        let resolved = match bound {
            ValidityBound::NotBefore => date.and_hms_opt(0, 0, 0),
            ValidityBound::NotAfter => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
        };
        if let Some(instant) = resolved {
            return Ok(instant.and_utc());
        }
    }

    Err(CryptoError::Validation(format!(
        "{} {:?} does not match RFC 3339 or {:?}",
        bound.field(),
        raw,
        format
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VALIDITY_DATE_FORMAT;
    use chrono::TimeZone;

    fn certificate(valid_from: &str, valid_to: &str) -> Certificate {
        Certificate::new(
            "ab:cd",
            "MIIB",
            valid_from,
            valid_to,
            3600,
        )
    }

    #[test]
    fn test_accessors_preserve_raw_values() {
        let cert = certificate(" 2020-01-01", "2020-12-31T23:59:59+02:00");
        assert_eq!(cert.fingerprint(), "ab:cd");
        assert_eq!(cert.public_key_material(), "MIIB");
        assert_eq!(cert.valid_from(), " 2020-01-01");
        assert_eq!(cert.valid_to(), "2020-12-31T23:59:59+02:00");
        assert_eq!(cert.update_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_date_only_window() {
        let window = certificate("2020-01-01", "2020-12-31")
            .validity_window(DEFAULT_VALIDITY_DATE_FORMAT)
            .unwrap();

        assert_eq!(window.not_before, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            window.not_after,
            Utc.with_ymd_and_hms(2020, 12, 31, 23, 59, 59).unwrap()
                + chrono::Duration::nanoseconds(999_999_999)
        );
        assert!(window.contains(Utc.with_ymd_and_hms(2020, 12, 31, 12, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_date_only_bounds() {
        let format = DEFAULT_VALIDITY_DATE_FORMAT;
        let start = parse_validity_date(ValidityBound::NotBefore, "2020-06-15", format).unwrap();
        let end = parse_validity_date(ValidityBound::NotAfter, "2020-06-15", format).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2020, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(
            end + chrono::Duration::nanoseconds(1),
            Utc.with_ymd_and_hms(2020, 6, 16, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_timestamps_ignore_bound() {
        let raw = "2020-12-31T18:00:00Z";
        let expected = Utc.with_ymd_and_hms(2020, 12, 31, 18, 0, 0).unwrap();

        for bound in [ValidityBound::NotBefore, ValidityBound::NotAfter] {
            assert_eq!(
                parse_validity_date(bound, raw, DEFAULT_VALIDITY_DATE_FORMAT).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_unparsable_date_names_field() {
        let err = parse_validity_date(ValidityBound::NotAfter, "soon", DEFAULT_VALIDITY_DATE_FORMAT)
            .unwrap_err();
        assert!(err.to_string().contains("validTo"));
    }

    #[test]
    fn test_rfc3339_window_normalised_to_utc() {
        let window = certificate("2020-01-01T00:00:00Z", "2020-12-31T23:59:59+02:00")
            .validity_window(DEFAULT_VALIDITY_DATE_FORMAT)
            .unwrap();

        assert_eq!(
            window.not_after,
            Utc.with_ymd_and_hms(2020, 12, 31, 21, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_custom_format_with_time() {
        let window = certificate("01/02/2020 08:30:00", "31/12/2020 18:00:00")
            .validity_window("%d/%m/%Y %H:%M:%S")
            .unwrap();

        assert_eq!(window.not_before, Utc.with_ymd_and_hms(2020, 2, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let result = certificate("2021-01-01", "2020-01-01").validate(DEFAULT_VALIDITY_DATE_FORMAT);
        assert!(matches!(result, Err(CryptoError::Validation(_))));
    }

    #[test]
    fn test_single_day_window_accepted() {
        let cert = certificate("2020-06-15", "2020-06-15");
        assert!(cert.validate(DEFAULT_VALIDITY_DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_update_interval_is_whole_seconds() {
        let cert = Certificate::new("f1", "MIIB", "2020-01-01", "2020-12-31", 1);
        assert_eq!(cert.update_interval(), Duration::from_secs(1));
        assert_eq!(cert.update_interval_secs(), 1);

        let value = serde_json::to_value(&cert).unwrap();
        assert_eq!(value["updateInterval"], 1);
    }

    #[test]
    fn test_unparsable_dates_rejected() {
        for (from, to) in [("yesterday", "2020-12-31"), ("2020-01-01", ""), ("2020-13-01", "2020-12-31")] {
            let result = certificate(from, to).validate(DEFAULT_VALIDITY_DATE_FORMAT);
            assert!(
                matches!(result, Err(CryptoError::Validation(_))),
                "{from:?}..{to:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_json_round_trip_uses_issuer_field_names() {
        let json = r#"{
            "fingerprint": "f1",
            "base64Representation": "MIIB",
            "validFrom": "2020-01-01",
            "validTo": "2020-12-31",
            "updateInterval": 86400
        }"#;
        let cert: Certificate = serde_json::from_str(json).unwrap();
        assert_eq!(cert.public_key_material(), "MIIB");
        assert_eq!(cert.update_interval(), Duration::from_secs(86_400));

        let value = serde_json::to_value(&cert).unwrap();
        assert_eq!(value["publicKeyMaterial"], "MIIB");
        assert_eq!(value["validTo"], "2020-12-31");
    }

    #[test]
    fn test_negative_interval_does_not_deserialize() {
        let json = r#"{
            "fingerprint": "f1",
            "publicKeyMaterial": "MIIB",
            "validFrom": "2020-01-01",
            "validTo": "2020-12-31",
            "updateInterval": -5
        }"#;
        assert!(serde_json::from_str::<Certificate>(json).is_err());
    }
}
