//! Shared fixtures for workflow tests.

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{TimeZone, Utc};
use secpack_core::{Clock, PackOptions, UnpackOptions};
use secpack_crypto::pem::{private_key_to_pem, public_key_to_pem};
use secpack_crypto::{RsaPrivateKey, RsaPublicKey};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

type KeyPair = (RsaPrivateKey, RsaPublicKey);

fn generate() -> KeyPair {
    let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("generate RSA key");
    let public = private.to_public_key();
    (private, public)
}

pub fn recipient_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(generate)
}

pub fn vendor_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// Unrelated key pair for wrong-key and impostor cases.
pub fn stranger_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// The pinned "now" used by license tests: 2030-01-01T00:00:00Z.
pub fn fixed_clock() -> Clock {
    Clock::Fixed(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
}

/// A scratch workspace with keys on disk and a small input directory.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let fx = Self { dir };

        fs::create_dir(fx.input()).unwrap();
        fs::write(fx.input().join("hello.txt"), b"hello, recipient\n").unwrap();
        let blob: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        fs::write(fx.input().join("data.bin"), blob).unwrap();
        fs::write(fx.input().join("empty.txt"), b"").unwrap();

        fs::create_dir(fx.path("keys")).unwrap();
        fx.write_public("recipient_public.pem", &recipient_keypair().1);
        fx.write_private("recipient_private.pem", &recipient_keypair().0);
        fx.write_public("vendor_public.pem", &vendor_keypair().1);
        fx.write_private("vendor_private.pem", &vendor_keypair().0);
        fx.write_public("stranger_public.pem", &stranger_keypair().1);
        fx.write_private("stranger_private.pem", &stranger_keypair().0);
        fx
    }

    fn write_public(&self, name: &str, key: &RsaPublicKey) {
        fs::write(self.key(name), public_key_to_pem(key).unwrap()).unwrap();
    }

    fn write_private(&self, name: &str, key: &RsaPrivateKey) {
        fs::write(self.key(name), private_key_to_pem(key).unwrap().as_bytes()).unwrap();
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn key(&self, name: &str) -> PathBuf {
        self.path("keys").join(name)
    }

    pub fn input(&self) -> PathBuf {
        self.path("input")
    }

    pub fn packed(&self) -> PathBuf {
        self.path("packed")
    }

    pub fn decrypted(&self) -> PathBuf {
        self.path("decrypted")
    }

    pub fn archive(&self) -> PathBuf {
        self.packed().join("encrypted_files.zip")
    }

    pub fn pack_options(&self) -> PackOptions {
        PackOptions::new(
            self.input(),
            self.packed(),
            self.key("recipient_public.pem"),
        )
    }

    pub fn licensed_pack_options(&self) -> PackOptions {
        self.pack_options().license(self.key("vendor_public.pem"))
    }

    pub fn unpack_options(&self) -> UnpackOptions {
        UnpackOptions::new(self.archive(), self.key("recipient_private.pem"))
            .output_dir(self.decrypted())
            .clock(fixed_clock())
    }

    /// Issues a token signed with the named private key file.
    pub fn token(&self, signer_private: &str, expiry: &str) -> PathBuf {
        let out = self.path(&format!("token-{signer_private}-{expiry}.txt"));
        secpack_core::issue_token(
            &self.key(signer_private),
            expiry,
            "Acme Corp",
            "ops@acme.test",
            &out,
        )
        .unwrap()
    }

    /// Names of the files currently in `dir`, sorted. Missing dir reads as empty.
    pub fn listing(dir: &Path) -> Vec<String> {
        let Ok(read) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = read
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

/// Rewrites `archive` with `edit` applied to every entry. Returning `None` drops it.
pub fn rewrite_archive(archive: &Path, edit: impl FnMut(&str, Vec<u8>) -> Option<Vec<u8>>) {
    rebuild(archive, edit, &[]);
}

/// Appends a raw entry, bypassing every name check the packer applies.
pub fn append_entry(archive: &Path, name: &str, data: &[u8]) {
    rebuild(archive, |_, d| Some(d), &[(name, data)]);
}

fn rebuild(
    archive: &Path,
    mut edit: impl FnMut(&str, Vec<u8>) -> Option<Vec<u8>>,
    extra: &[(&str, &[u8])],
) {
    let bytes = fs::read(archive).unwrap();
    let mut source = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..source.len() {
        let mut entry = source.by_index(i).unwrap();
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        if let Some(data) = edit(&name, data) {
            writer
                .start_file(name.as_str(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(&data).unwrap();
        }
    }
    for (name, data) in extra {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    let out = writer.finish().unwrap().into_inner();
    fs::write(archive, out).unwrap();
}
