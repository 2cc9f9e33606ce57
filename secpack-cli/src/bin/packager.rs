//! Encrypts a directory of files for one recipient.
//!
//! Usage:
//!   packager --in ./payload --out ./dist --pub customer_public.pem
//!   packager --in ./payload --out ./dist --pub customer_public.pem \
//!       --license --vendor-pub vendor_public.pem

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use secpack_core::{pack, PackOptions, PackagerError};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "packager")]
#[command(about = "Encrypt a directory for a recipient's RSA public key")]
struct Args {
    /// Input directory with files to encrypt
    #[arg(long = "in")]
    input: PathBuf,

    /// Output directory for the encrypted payload
    #[arg(long)]
    out: PathBuf,

    /// Recipient RSA public key (PEM)
    #[arg(long = "pub")]
    public_key: PathBuf,

    /// Create encrypted_files.zip in the output directory
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    zip: bool,

    /// After zipping, remove the loose .enc files and helper artifacts
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    cleanup: bool,

    /// Require a vendor license token to unpack
    #[arg(long)]
    license: bool,

    /// Vendor public key (PEM) embedded for license verification
    #[arg(long = "vendor-pub")]
    vendor_pub: Option<PathBuf>,

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
    let mut options = PackOptions::new(&args.input, &args.out, &args.public_key)
        .zip(args.zip)
        .cleanup(args.cleanup);
    if args.license {
        let vendor = args.vendor_pub.as_ref().ok_or_else(|| {
            PackagerError::Configuration("--license requires --vendor-pub".into())
        })?;
        options = options.license(vendor);
    }

    let outcome = pack(&options).context("packing failed")?;

    if args.json {
        return secpack_cli::print_json(&outcome);
    }
    for file in &outcome.files {
        println!("Encrypted {file}");
    }
    match &outcome.archive {
        Some(archive) => println!("Archive: {}", archive.display()),
        None => println!("Artifacts written to {}", args.out.display()),
    }
    if args.license {
        println!("License required to unpack");
    }
    info!(files = outcome.files.len(), "Done");
    Ok(())
}
