use chrono::{NaiveDate, TimeZone, Utc};
use secpack_crypto::CryptoError;
use secpack_license::LicenseError;

#[test]
fn display_token_format() {
    let err = LicenseError::TokenFormat("expected 5 fields, found 3".into());
    assert!(err.to_string().contains("invalid license token format"));
    assert!(err.to_string().contains("5 fields"));
}

#[test]
fn display_signature() {
    assert_eq!(
        LicenseError::TokenSignature.to_string(),
        "license token signature invalid"
    );
}

#[test]
fn display_expired_has_both_dates() {
    let err = LicenseError::Expired {
        expiry: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        now: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
    };
    let msg = err.to_string();
    assert!(msg.contains("2024-03-01"));
    assert!(msg.contains("2024-03-05"));
}

#[test]
fn display_blocked() {
    let err = LicenseError::Blocked {
        expiry: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        hours_remaining: 5,
    };
    assert!(err.to_string().contains("within 24 hours"));
}

#[test]
fn key_errors_pass_through() {
    let err: LicenseError = CryptoError::KeyFormat("vendor public key: no PEM block found".into()).into();
    assert!(err.to_string().contains("vendor public key"));
}
