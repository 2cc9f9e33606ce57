//! Verifies the license (if any), unwraps the package key and decrypts.
//!
//! Every path can also come from the environment, matching the container
//! deployment: `ENCRYPTED_ZIP_PATH`, `PRIVATE_KEY_PATH`, `TOKEN_FILE_PATH`,
//! `DECRYPT_OUTPUT_DIR`.
//!
//! Usage:
//!   unpack --zip encrypted_files.zip --priv customer_private.pem
//!   unpack --zip encrypted_files.zip --priv customer_private.pem \
//!       --license-token token.txt --out ./decrypted

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use secpack_core::{entry_names, unpack, PackagerError, UnpackOptions, DEFAULT_DECRYPT_DIR};

#[derive(Parser, Debug)]
#[command(name = "unpack")]
#[command(about = "Decrypt a package produced by packager")]
struct Args {
    /// Encrypted zip produced by packager
    #[arg(long, env = "ENCRYPTED_ZIP_PATH")]
    zip: PathBuf,

    /// Recipient RSA private key (PEM)
    #[arg(long = "priv", env = "PRIVATE_KEY_PATH")]
    private_key: Option<PathBuf>,

    /// Output directory for decrypted files
    #[arg(long, env = "DECRYPT_OUTPUT_DIR", default_value = DEFAULT_DECRYPT_DIR)]
    out: PathBuf,

    /// Vendor license token file
    #[arg(long = "license-token", env = "TOKEN_FILE_PATH")]
    license_token: Option<PathBuf>,

    /// Vendor public key (PEM); overrides the key bundled in the archive
    #[arg(long = "vendor-pub")]
    vendor_pub: Option<PathBuf>,

    /// Pin the license clock (YYYY-MM-DD or RFC 3339). Flag only, never read
    /// from the environment.
    #[arg(long, hide = true)]
    fake_now: Option<String>,

    /// List archive entries and exit
    #[arg(long)]
    list: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    secpack_cli::init_tracing(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => secpack_cli::fail(&e),
    }
}

fn run(args: &Args) -> Result<()> {
    if args.list {
        let names = entry_names(&args.zip).context("reading archive")?;
        if args.json {
            return secpack_cli::print_json(&names);
        }
        for name in names {
            println!("{name}");
        }
        return Ok(());
    }

    let private_key = args
        .private_key
        .as_ref()
        .ok_or_else(|| PackagerError::Configuration("--priv is required".into()))?;
    let clock = secpack_cli::clock_from_override(args.fake_now.as_deref())?;

    let mut options = UnpackOptions::new(&args.zip, private_key)
        .output_dir(&args.out)
        .clock(clock);
    if let Some(token) = &args.license_token {
        options = options.license_token(token);
    }
    if let Some(vendor) = &args.vendor_pub {
        options = options.vendor_public_key(vendor);
    }

    let outcome = unpack(&options).context("unpack failed")?;

    if args.json {
        return secpack_cli::print_json(&outcome);
    }
    if let Some(report) = &outcome.license {
        for line in report.summary() {
            println!("{line}");
        }
    }
    for file in &outcome.files {
        println!("Decrypted {}", file.display());
    }
    println!("Done. Decrypted files are in {}", args.out.display());
    Ok(())
}
