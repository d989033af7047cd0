use crate::{
  classify,
  discover,
  error::LocateError,
  location::LocationData,
  providers::{
    ip_api::IpApi, ipinfo::IpInfo, ipstack::IpStack, Endpoints, GeoProvider,
    ProviderKind,
  },
};
use log::debug;
use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;

/// What to do with a validated address.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
  /// Send to a remote provider.
  Public(IpAddr),
  /// Describe locally, no network call.
  Local(LocationData),
}

/// Uses the requested address or asks the echo endpoints for ours.
pub async fn resolve_target<S: AsRef<str>>(
  requested: Option<&str>,
  client: &Client,
  endpoints: &[S],
  timeout: Duration,
) -> Result<String, LocateError> {
  if let Some(ip) = requested {
    return Ok(ip.to_string());
  }
  discover::discover_public_ip(client, endpoints, timeout)
    .await
    .map(|ip| ip.to_string())
}

/// Validates `target` and decides between a remote lookup and a local
/// description.
///
/// # Errors
/// [`LocateError::InvalidIpFormat`] for unparseable input,
/// [`LocateError::UnsupportedAddress`] for non-public addresses that are not
/// private, loopback or link-local either.
pub fn classify_target(target: &str) -> Result<Target, LocateError> {
  if !classify::is_syntactically_valid(target) {
    return Err(LocateError::InvalidIpFormat(target.to_string()));
  }

  if classify::is_publicly_routable(target) {
    let ip = target
      .parse()
      .map_err(|_| LocateError::InvalidIpFormat(target.to_string()))?;
    return Ok(Target::Public(ip));
  }

  classify::classify_private(target).map_or_else(
    || Err(LocateError::UnsupportedAddress(target.to_string())),
    |class| {
      debug!("{target} classified locally as {}", class.network_type);
      Ok(Target::Local(LocationData::local(target, class)))
    },
  )
}

/// Builds the chosen provider. A token-requiring provider without a token
/// fails here, before any request is made.
///
/// # Errors
/// [`LocateError::MissingRequiredToken`].
pub fn select_provider(
  kind: ProviderKind,
  token: Option<&str>,
  client: &Client,
  endpoints: &Endpoints,
  timeout: Duration,
) -> Result<Box<dyn GeoProvider>, LocateError> {
  let token = token.filter(|t| !t.is_empty()).map(str::to_owned);
  if token.is_none() && kind.requires_token() {
    return Err(LocateError::MissingRequiredToken {
      provider: kind.name(),
      env_var: kind.token_env_var().unwrap_or_default(),
    });
  }

  let provider: Box<dyn GeoProvider> = match kind {
    ProviderKind::IpApi => {
      Box::new(IpApi::new(client.clone(), &endpoints.ip_api, timeout))
    }
    ProviderKind::IpInfo => Box::new(IpInfo::new(
      client.clone(),
      &endpoints.ipinfo,
      token,
      timeout,
    )),
    ProviderKind::IpStack => Box::new(IpStack::new(
      client.clone(),
      &endpoints.ipstack,
      token.unwrap_or_default(),
      timeout,
    )),
  };
  Ok(provider)
}
