//! Detects the caller's public IP through plain-text echo services.

use crate::classify;
use crate::error::LocateError;
use log::debug;
use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;

/// Echo endpoints, tried in order.
pub const DEFAULT_ENDPOINTS: [&str; 4] = [
  "https://api.ipify.org?format=text",
  "https://ipinfo.io/ip",
  "https://icanhazip.com",
  "https://ident.me",
];

/// Upper bound for each probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

async fn probe(
  client: &Client,
  endpoint: &str,
  timeout: Duration,
) -> Result<IpAddr, String> {
  let body = client
    .get(endpoint)
    .timeout(timeout)
    .send()
    .await
    .and_then(reqwest::Response::error_for_status)
    .map_err(|e| e.to_string())?
    .text()
    .await
    .map_err(|e| e.to_string())?;

  let candidate = body.trim();
  if !classify::is_syntactically_valid(candidate) {
    return Err(format!("not an IP address: {candidate:?}"));
  }
  candidate.parse().map_err(|_| format!("not an IP address: {candidate:?}"))
}

/// Returns the first syntactically valid address any endpoint reports.
///
/// Endpoints are tried strictly in sequence; a failing one is logged and
/// skipped. Public vs. private is not judged here.
///
/// # Errors
/// [`LocateError::PublicIpDiscoveryFailed`] when every endpoint fails.
pub async fn discover_public_ip<S: AsRef<str>>(
  client: &Client,
  endpoints: &[S],
  timeout: Duration,
) -> Result<IpAddr, LocateError> {
  for endpoint in endpoints {
    let endpoint = endpoint.as_ref();
    match probe(client, endpoint, timeout).await {
      Ok(ip) => {
        debug!("public IP {ip} reported by {endpoint}");
        return Ok(ip);
      }
      Err(e) => debug!("public IP probe {endpoint} failed: {e}"),
    }
  }
  Err(LocateError::PublicIpDiscoveryFailed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::providers::testing;

  #[tokio::test]
  async fn test_first_valid_answer_wins() {
    let dead = testing::dead_url().await;
    let garbage = testing::serve(200, "text/plain", "<html>hi</html>").await;
    let good = testing::serve(200, "text/plain", "203.0.113.7\n").await;
    let never = testing::serve(200, "text/plain", "198.51.100.1").await;

    let endpoints = [
      dead,
      garbage.base_url.clone(),
      good.base_url.clone(),
      never.base_url.clone(),
    ];
    let ip = discover_public_ip(&testing::client(), &endpoints, PROBE_TIMEOUT)
      .await
      .unwrap();

    assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    assert_eq!(garbage.hits(), 1);
    assert_eq!(never.hits(), 0);
  }

  #[tokio::test]
  async fn test_private_answer_is_accepted() {
    let server = testing::serve(200, "text/plain", "10.0.0.5").await;
    let ip = discover_public_ip(&testing::client(), &[&server.base_url], PROBE_TIMEOUT)
      .await
      .unwrap();
    assert_eq!(ip.to_string(), "10.0.0.5");
  }

  #[tokio::test]
  async fn test_error_status_is_skipped() {
    let server = testing::serve(500, "text/plain", "8.8.8.8").await;
    let err = discover_public_ip(&testing::client(), &[&server.base_url], PROBE_TIMEOUT)
      .await
      .unwrap_err();
    assert!(matches!(err, LocateError::PublicIpDiscoveryFailed));
  }

  #[tokio::test]
  async fn test_all_failing_is_discovery_failure() {
    let endpoints: [&str; 0] = [];
    let err = discover_public_ip(&testing::client(), &endpoints, PROBE_TIMEOUT)
      .await
      .unwrap_err();
    assert!(matches!(err, LocateError::PublicIpDiscoveryFailed));
  }
}
