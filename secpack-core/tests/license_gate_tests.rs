mod common;

use std::fs;

use common::{rewrite_archive, Fixture};
use pretty_assertions::assert_eq;
use secpack_core::{issue_token, pack, unpack, Clock, ErrorKind, LicenseStatus, PackagerError};

#[test]
fn licensed_roundtrip_reports_license() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.token("vendor_private.pem", "2030-06-30");

    let outcome = unpack(&fx.unpack_options().license_token(&token)).unwrap();
    let report = outcome.license.clone().expect("license report");
    assert_eq!(report.company, "Acme Corp");
    assert_eq!(report.email, "ops@acme.test");
    assert_eq!(report.status, LicenseStatus::Valid);
    assert_eq!(
        Fixture::listing(&fx.decrypted()),
        vec!["data.bin", "empty.txt", "hello.txt"]
    );

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["license"]["status"], "valid");
    assert_eq!(json["license"]["expiry"], "2030-06-30");
}

#[test]
fn missing_token_fails_before_key_unwrap() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();

    // The wrong private key would fail unwrap; the license gate must trip first.
    let mut options = fx.unpack_options();
    options.recipient_private_key = fx.key("stranger_private.pem");
    let err = unpack(&options).unwrap_err();
    assert!(matches!(err, PackagerError::Configuration(_)), "{err}");
    assert!(!fx.decrypted().exists());
}

#[test]
fn expiring_soon_warns_but_decrypts() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.token("vendor_private.pem", "2030-01-05");

    let outcome = unpack(&fx.unpack_options().license_token(&token)).unwrap();
    let report = outcome.license.unwrap();
    assert_eq!(report.status, LicenseStatus::ExpiringSoon);
    assert_eq!(report.remaining_days, 4);
    assert!(fx.decrypted().join("hello.txt").is_file());
}

#[test]
fn within_a_day_of_expiry_is_blocked() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.token("vendor_private.pem", "2030-01-01");

    let err = unpack(&fx.unpack_options().license_token(&token)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LicenseBlocked);
    assert!(!fx.decrypted().exists());
}

#[test]
fn expired_license_is_rejected() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.token("vendor_private.pem", "2029-12-01");

    let err = unpack(&fx.unpack_options().license_token(&token)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LicenseExpired);
    assert!(!fx.decrypted().exists());
}

#[test]
fn token_from_another_signer_is_rejected() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.token("stranger_private.pem", "2030-06-30");

    let err = unpack(&fx.unpack_options().license_token(&token)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenSignature);
}

#[test]
fn garbage_token_is_token_format() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.path("garbage.txt");
    fs::write(&token, "!!! not base64 !!!").unwrap();

    let err = unpack(&fx.unpack_options().license_token(&token)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenFormat);
}

#[test]
fn explicit_vendor_key_overrides_bundled_key() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.token("stranger_private.pem", "2030-06-30");

    let outcome = unpack(
        &fx.unpack_options()
            .license_token(&token)
            .vendor_public_key(fx.key("stranger_public.pem")),
    )
    .unwrap();
    assert!(outcome.license.is_some());
}

#[test]
fn token_alone_enforces_license_on_unlicensed_package() {
    let fx = Fixture::new();
    pack(&fx.pack_options()).unwrap();
    let token = fx.token("vendor_private.pem", "2030-06-30");

    // No vendor key anywhere: the check cannot run.
    let err = unpack(&fx.unpack_options().license_token(&token)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let outcome = unpack(
        &fx.unpack_options()
            .license_token(&token)
            .vendor_public_key(fx.key("vendor_public.pem")),
    )
    .unwrap();
    assert_eq!(outcome.license.unwrap().status, LicenseStatus::Valid);
}

#[test]
fn vendor_key_alone_requires_token() {
    let fx = Fixture::new();
    pack(&fx.pack_options()).unwrap();
    let err = unpack(&fx.unpack_options().vendor_public_key(fx.key("vendor_public.pem")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn stripping_the_manifest_does_not_bypass_explicit_token() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    rewrite_archive(&fx.archive(), |name, data| {
        (name != "manifest.json").then_some(data)
    });
    let token = fx.token("stranger_private.pem", "2030-06-30");

    let err = unpack(
        &fx.unpack_options()
            .license_token(&token)
            .vendor_public_key(fx.key("vendor_public.pem")),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenSignature);
}

#[test]
fn issue_token_validates_claims() {
    let fx = Fixture::new();
    let out = fx.path("t.txt");
    let err = issue_token(
        &fx.key("vendor_private.pem"),
        "2030-02-30",
        "Acme",
        "a@b",
        &out,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = issue_token(&fx.key("vendor_private.pem"), "2030-02-01", "Ac:me", "a@b", &out)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!out.exists());
}

#[test]
fn issued_token_is_single_line() {
    let fx = Fixture::new();
    let token = fx.token("vendor_private.pem", "2030-06-30");
    let text = fs::read_to_string(token).unwrap();
    assert!(!text.contains('\n'));
    assert!(!text.is_empty());
}

#[test]
fn issue_with_public_key_is_key_format() {
    let fx = Fixture::new();
    let err = issue_token(
        &fx.key("vendor_public.pem"),
        "2030-06-30",
        "Acme",
        "a@b",
        &fx.path("t.txt"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyFormat);
}

#[test]
fn missing_explicit_vendor_key_is_configuration() {
    let fx = Fixture::new();
    pack(&fx.licensed_pack_options()).unwrap();
    let token = fx.token("vendor_private.pem", "2030-06-30");

    let err = unpack(
        &fx.unpack_options()
            .license_token(&token)
            .vendor_public_key(fx.key("no_such_vendor.pem")),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!fx.decrypted().exists());
}

#[test]
fn licensed_package_unpacks_against_the_system_clock() {
    use rand::RngCore;

    let fx = Fixture::new();
    let input = fx.path("scenario-input");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a.txt"), b"hello").unwrap();
    let mut random = vec![0u8; 32 * 1024];
    rand::thread_rng().fill_bytes(&mut random);
    fs::write(input.join("b.bin"), &random).unwrap();

    let mut options = fx.licensed_pack_options();
    options.input_dir = input;
    pack(&options).unwrap();

    // Without a token the gate trips before the (wrong) private key is tried.
    let mut no_token = fx.unpack_options().clock(Clock::System);
    no_token.recipient_private_key = fx.key("stranger_private.pem");
    let err = unpack(&no_token).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!fx.decrypted().exists());

    let token = fx.token("vendor_private.pem", "2099-12-31");
    let outcome = unpack(&fx.unpack_options().clock(Clock::System).license_token(&token)).unwrap();
    let report = outcome.license.expect("license report");
    assert_eq!(report.company, "Acme Corp");
    assert_eq!(report.email, "ops@acme.test");
    assert_eq!(report.expiry.to_string(), "2099-12-31");
    assert_eq!(report.status, LicenseStatus::Valid);
    assert_eq!(fs::read(fx.decrypted().join("a.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(fx.decrypted().join("b.bin")).unwrap(), random);
}
