//! Compute and publish the next semantic version of a GitHub repository.
//!
//! - `next`: calculate the next version from existing tags
//! - `release`: publish it as a release or tag and move the alias tags
//!
//! Designed to run as a GitHub Actions step: inputs come from flags or the
//! `INPUT_*` environment, outputs go to `GITHUB_OUTPUT`.

use std::fs;

use anyhow::Result;
use clap::{
    Parser,
    Subcommand,
};
use version_tagger::commands;
use version_tagger::commands::{
    NextArgs,
    ReleaseArgs,
};

#[derive(Parser, Debug)]
#[command(name = "version-tagger", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate the next version from existing tags
    #[command(name = "next")]
    Next(NextArgs),
    /// Publish the next version as a release or tag and move alias tags
    #[command(name = "release")]
    Release(ReleaseArgs),
}

/// Check if any .env* files exist in the current directory.
fn has_env_files() -> bool {
    let current_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(_) => return false,
    };

    let patterns = [".env", ".env.local", ".env.prod", ".env.dev", ".env.test"];
    if patterns.iter().any(|pattern| {
        fs::metadata(current_dir.join(pattern))
            .map(|m| m.is_file())
            .unwrap_or(false)
    }) {
        return true;
    }

    // Also check for .env.{USER} pattern
    std::env::var("USER").is_ok_and(|user| {
        fs::metadata(current_dir.join(format!(".env.{}", user)))
            .map(|m| m.is_file())
            .unwrap_or(false)
    })
}

fn main() -> Result<()> {
    // A local GITHUB_TOKEN may live in an encrypted .env.local file.
    if has_env_files()
        && let Err(e) = dotenvage::EnvLoader::new().and_then(|loader| loader.load())
    {
        eprintln!("Warning: Failed to load/decrypt env files: {}", e);
        eprintln!("Continuing with existing environment variables...");
    }

    match Cli::parse().command {
        Command::Next(args) => commands::next(args),
        Command::Release(args) => commands::release(args),
    }
}
