#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

use anyhow::Result;
use clap::Parser;
use log::{error, warn};
use std::env;
use std::future::{self, Future};
use std::io;
use std::process::ExitCode;

mod app;
mod cli;
pub mod classify;
pub mod discover;
pub mod error;
pub mod location;
mod logging;
pub mod providers;
pub mod render;
mod steps;
pub mod theme;
mod user_config;

/// Runs the main application logic.
///
/// Parses the command line, merges it with the environment and the optional
/// config file, then performs one lookup and prints the result. Every
/// [`error::LocateError`] is reported here and turned into exit code 1.
///
/// # Errors
///
/// Returns an error only if the HTTP client cannot be built.
pub async fn run() -> Result<ExitCode> {
  let cli = cli::Cli::parse();
  logging::init(cli.verbose);

  let settings = user_config::Settings::resolve(
    &cli,
    &user_config::load(),
    |key| env::var(key).ok(),
  );

  if cli.config_show {
    println!("{}", settings.describe());
    return Ok(ExitCode::SUCCESS);
  }

  let app = app::App::new(settings)?;
  let theme = app.theme();

  Ok(match app.run().await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{e:?}");
      eprintln!("{}", theme.error(&format!("Error: {e}")));
      ExitCode::from(e.exit_code())
    }
  })
}

/// Completes when `signal` reports a user interrupt.
///
/// If the signal handler could not be installed this never completes, so
/// the lookup runs to its own end instead of being reported as cancelled.
pub async fn interrupted<F>(signal: F)
where
  F: Future<Output = io::Result<()>>,
{
  match signal.await {
    Ok(()) => {}
    Err(e) => {
      warn!("Failed to listen for Ctrl+C: {e}");
      future::pending::<()>().await;
    }
  }
}
