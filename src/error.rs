//! Error kinds surfaced by a single lookup.
//!
//! Every variant is recovered in [`crate::run`], printed once and mapped to
//! exit code 1.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateError {
  /// The target does not parse as an IPv4 or IPv6 address.
  #[error("Invalid IP address format: {0}")]
  InvalidIpFormat(String),

  /// Every public-IP echo endpoint failed or returned garbage.
  #[error("Could not detect public IP address")]
  PublicIpDiscoveryFailed,

  /// A provider that needs credentials was selected without any.
  #[error("{provider} requires an API token (use -t TOKEN or set {env_var})")]
  MissingRequiredToken {
    provider: &'static str,
    env_var: &'static str,
  },

  /// The provider answered with its own failure payload.
  #[error("{provider} reported an error: {message}")]
  ProviderApi {
    provider: &'static str,
    message: String,
  },

  /// Transport level failure: DNS, connect, TLS or timeout.
  #[error("Network error while contacting {provider}: {source}")]
  Network {
    provider: &'static str,
    #[source]
    source: reqwest::Error,
  },

  /// Non-2xx answer that carried no provider error payload.
  #[error("{provider} request failed with status: {status}")]
  HttpStatus {
    provider: &'static str,
    status: StatusCode,
  },

  /// Body was not JSON or did not have the expected shape.
  #[error("Invalid JSON response from {provider}: {detail}")]
  MalformedResponse {
    provider: &'static str,
    detail: String,
  },

  /// A valid, non-public address outside every known local range
  /// (multicast, documentation, reserved blocks).
  #[error(
    "{0} is a reserved or special-purpose address and cannot be located"
  )]
  UnsupportedAddress(String),

  #[error("Unexpected error: {0:#}")]
  Unexpected(#[from] anyhow::Error),
}

impl LocateError {
  pub(crate) fn network(provider: &'static str, source: reqwest::Error) -> Self {
    Self::Network { provider, source }
  }

  pub(crate) fn api(provider: &'static str, message: impl Into<String>) -> Self {
    Self::ProviderApi {
      provider,
      message: message.into(),
    }
  }

  /// Process exit code for this failure.
  #[must_use]
  pub const fn exit_code(&self) -> u8 {
    1
  }
}
