// Declare modules
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod copier;
pub mod css;
pub mod error;
pub mod files;
pub mod html;
pub mod js;
pub mod models;
pub mod patterns;
pub mod pipeline;
pub mod purge;
pub mod sass;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::time::Instant;

use self::cli::Cli;
use self::config::resolve_config;
use self::models::BuildPaths;

/// Parses flags, loads configuration and runs the build in the current directory.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let options = Cli::parse().options();

    // 2. Project root is the working directory
    let root = env::current_dir().context("Failed to get current directory")?;
    let paths = BuildPaths::new(&root);

    // 3. Resolve Configuration
    let config = resolve_config(&root);

    if options.clean_only {
        pipeline::build(&paths, &config, &options).context("Clean failed")?;
        return Ok(());
    }

    // 4. Build
    log::info!("🚀 Starting build process...");
    let started = Instant::now();
    let report = pipeline::build(&paths, &config, &options)?;

    log::info!(
        "⌛ Build completed in {:.2?} ({} files written)",
        started.elapsed(),
        report.written.len()
    );
    log::debug!("Final phase: {:?}", report.phase());
    log::info!("✨ Build successful!");

    Ok(())
}
