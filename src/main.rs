#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use iploc::{interrupted, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
  // Install the default crypto provider for rustls
  let _ = rustls::crypto::ring::default_provider().install_default();

  tokio::select! {
    result = run() => match result {
      Ok(code) => code,
      Err(e) => {
        eprintln!("Unexpected error: {e:#}");
        ExitCode::FAILURE
      }
    },
    () = interrupted(tokio::signal::ctrl_c()) => {
      eprintln!("\nOperation cancelled by user");
      ExitCode::SUCCESS
    }
  }
}
