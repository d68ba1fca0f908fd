use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;

use pkgverify::config::AppConfig;
use pkgverify::{digest, sigfile, TrustedKey};

// Indicates version of the pkgverify source code for every ".rs" file
pub const VERSION: &str = "v0.1.0";

/// info
#[derive(Parser)]
#[command(name = "pkgverify")]
#[command(about = "Signify/Ed25519 release artifact verifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verifies a detached signify signature over an artifact
    Verify {
        /// Path of the artifact to verify
        message: PathBuf,

        /// Path of the signature file (defaults to <message>.sig)
        #[arg(short = 'x', long = "sig")]
        sig: Option<PathBuf>,

        /// Path of the signify public key file (overrides config)
        #[arg(short = 'p', long = "pubkey")]
        pubkey: Option<PathBuf>,

        /// Base64 signify public key given inline (overrides everything)
        #[arg(long = "pubkey-b64")]
        pubkey_b64: Option<String>,
    },
    /// Prints or checks the SHA-256 checksum of an artifact
    Checksum {
        /// Path of the artifact
        file: PathBuf,

        /// Expected SHA-256 in hex; exits nonzero on mismatch
        #[arg(short = 'e', long = "expected")]
        expected: Option<String>,
    },
    /// Prints the key id of a signify public key
    Keyid {
        /// Path of the signify public key file (overrides config)
        #[arg(short = 'p', long = "pubkey")]
        pubkey: Option<PathBuf>,
    },
    // Show about of pkgverify
    About,

    // Show version of pkgverify
    Version,
}

/// Resolves the trusted public key: explicit flags first, then config.
fn resolve_pubkey_b64(
    cfg: &AppConfig,
    pubkey: Option<&PathBuf>,
    pubkey_b64: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(b64) = pubkey_b64 {
        return Ok(b64);
    }
    if let Some(path) = pubkey {
        return sigfile::read_base64_file(path);
    }
    if let Some(b64) = &cfg.pubkey_b64 {
        return Ok(b64.clone());
    }
    sigfile::read_base64_file(&cfg.pubkey_path)
}

fn main() {
    let cfg = AppConfig::load();
    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            message,
            sig,
            pubkey,
            pubkey_b64,
        } => {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(std::time::Duration::from_millis(120));
            pb.set_style(ProgressStyle::with_template("{spinner:.blue} {msg}").unwrap());
            pb.set_message(format!("Verifying '{}'...", message.display()));

            let key_b64 = match resolve_pubkey_b64(&cfg, pubkey.as_ref(), pubkey_b64) {
                Ok(b64) => b64,
                Err(e) => {
                    pb.finish_with_message(format!("No public key: {}", e).red().to_string());
                    process::exit(1);
                }
            };
            let key = match TrustedKey::from_base64(&key_b64) {
                Ok(k) => k,
                Err(e) => {
                    pb.finish_with_message(format!("Bad public key: {}", e).red().to_string());
                    process::exit(1);
                }
            };

            let message_bytes = match std::fs::read(&message) {
                Ok(b) => b,
                Err(e) => {
                    pb.finish_with_message(
                        format!("Failed to read {}: {}", message.display(), e)
                            .red()
                            .to_string(),
                    );
                    process::exit(1);
                }
            };

            let sig_path = sig.unwrap_or_else(|| {
                let mut p = message.clone().into_os_string();
                p.push(".sig");
                PathBuf::from(p)
            });
            let sig_b64 = match sigfile::read_base64_file(&sig_path) {
                Ok(s) => s,
                Err(e) => {
                    pb.finish_with_message(format!("No signature: {}", e).red().to_string());
                    process::exit(1);
                }
            };

            match key.verify_signature(&message_bytes, &sig_b64) {
                Ok(()) => {
                    pb.finish_with_message(
                        format!("Signature verified (key {})", key.key_id())
                            .green()
                            .to_string(),
                    );
                }
                Err(e) => {
                    pb.finish_with_message(
                        format!("Verification failed: {}", e).red().to_string(),
                    );
                    process::exit(1);
                }
            }
        }
        Commands::Checksum { file, expected } => {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(std::time::Duration::from_millis(120));
            pb.set_style(ProgressStyle::with_template("{spinner:.blue} {msg}").unwrap());
            pb.set_message(format!("Hashing '{}'...", file.display()));

            match expected {
                Some(expected) => match digest::matches_sha256(&file, &expected) {
                    Ok(true) => {
                        pb.finish_with_message("Checksum OK".green().to_string());
                    }
                    Ok(false) => {
                        pb.finish_with_message(
                            format!("Checksum mismatch for {}", file.display())
                                .red()
                                .to_string(),
                        );
                        process::exit(1);
                    }
                    Err(e) => {
                        pb.finish_with_message(format!("Checksum failed: {}", e).red().to_string());
                        process::exit(1);
                    }
                },
                None => match digest::sha256_file(&file) {
                    Ok(hash) => {
                        pb.finish_and_clear();
                        println!("{}  {}", hash, file.display());
                    }
                    Err(e) => {
                        pb.finish_with_message(format!("Checksum failed: {}", e).red().to_string());
                        process::exit(1);
                    }
                },
            }
        }
        Commands::Keyid { pubkey } => {
            let key_b64 = match resolve_pubkey_b64(&cfg, pubkey.as_ref(), None) {
                Ok(b64) => b64,
                Err(e) => {
                    eprintln!("{}", format!("No public key: {}", e).red());
                    process::exit(1);
                }
            };
            match TrustedKey::from_base64(&key_b64) {
                Ok(key) => {
                    println!("algorithm: Ed25519");
                    println!("key id:    {}", key.key_id().to_string().cyan());
                }
                Err(e) => {
                    eprintln!("{}", format!("Bad public key: {}", e).red());
                    process::exit(1);
                }
            }
        }
        Commands::About => {
            println!("{}", "pkgverify - release artifact verifier".blue());
            println!(
                "{}",
                "Checks signify-format Ed25519 signatures and SHA-256 checksums before anything gets installed."
                    .yellow()
            );
        }
        Commands::Version => {
            println!("pkgverify {} ({})", VERSION, std::env::consts::ARCH);
        }
    }
}
