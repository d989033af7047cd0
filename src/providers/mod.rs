//! Remote geolocation providers.
//!
//! Each provider turns one IP address into a [`LocationData`] or a
//! [`LocateError`]. Transport and decoding problems never escape as panics.

pub mod ip_api;
pub mod ipinfo;
pub mod ipstack;

use crate::error::LocateError;
use crate::location::LocationData;
use async_trait::async_trait;
use clap::ValueEnum;
use log::debug;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;

/// Upper bound for a single geolocation request.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait GeoProvider: Send + Sync {
  /// Short name used in messages and logs.
  fn name(&self) -> &'static str;

  /// Looks up `ip` and normalizes the provider's answer.
  async fn resolve(&self, ip: IpAddr) -> Result<LocationData, LocateError>;
}

/// The providers selectable on the command line.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  ValueEnum,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
  /// ip-api.com, free tier, no token.
  #[default]
  #[value(name = "ipapi")]
  IpApi,
  /// ipinfo.io, token optional.
  #[value(name = "ipinfo")]
  IpInfo,
  /// ipstack.com, token required.
  #[value(name = "ipstack")]
  IpStack,
}

impl ProviderKind {
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::IpApi => ip_api::NAME,
      Self::IpInfo => ipinfo::NAME,
      Self::IpStack => ipstack::NAME,
    }
  }

  /// Environment variable consulted for a token when `--token` is absent.
  #[must_use]
  pub const fn token_env_var(self) -> Option<&'static str> {
    match self {
      Self::IpApi => None,
      Self::IpInfo => Some("IPINFO_TOKEN"),
      Self::IpStack => Some("IPSTACK_TOKEN"),
    }
  }

  #[must_use]
  pub const fn requires_token(self) -> bool {
    matches!(self, Self::IpStack)
  }
}

/// Base URLs for every provider. Overridable from the user config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
  pub ip_api: String,
  pub ipinfo: String,
  pub ipstack: String,
}

impl Default for Endpoints {
  fn default() -> Self {
    Self {
      ip_api: ip_api::DEFAULT_BASE_URL.to_string(),
      ipinfo: ipinfo::DEFAULT_BASE_URL.to_string(),
      ipstack: ipstack::DEFAULT_BASE_URL.to_string(),
    }
  }
}

/// Sends `request` and decodes the body as JSON.
///
/// The status code is returned alongside the body because some providers
/// describe failures in a JSON payload on a 4xx response. A body that does
/// not decode is reported as [`LocateError::HttpStatus`] on a non-2xx answer
/// and as [`LocateError::MalformedResponse`] otherwise.
pub(crate) async fn get_json<T: DeserializeOwned>(
  provider: &'static str,
  request: RequestBuilder,
  timeout: Duration,
) -> Result<(StatusCode, T), LocateError> {
  let response = request
    .timeout(timeout)
    .send()
    .await
    .map_err(|e| LocateError::network(provider, e))?;

  let status = response.status();
  let body = response
    .text()
    .await
    .map_err(|e| LocateError::network(provider, e))?;
  debug!("{provider}: HTTP {status}, {} bytes", body.len());

  match serde_json::from_str::<T>(&body) {
    Ok(parsed) => Ok((status, parsed)),
    Err(_) if !status.is_success() => {
      Err(LocateError::HttpStatus { provider, status })
    }
    Err(e) => Err(LocateError::MalformedResponse {
      provider,
      detail: e.to_string(),
    }),
  }
}

/// Pulls a human-readable message out of a provider `error` value.
///
/// Accepts a bare string or an object, trying `keys` in order.
pub(crate) fn error_message(error: &Value, keys: &[&str]) -> String {
  match error {
    Value::String(s) => s.clone(),
    Value::Object(map) => keys
      .iter()
      .find_map(|k| map.get(*k).and_then(Value::as_str))
      .map_or_else(|| error.to_string(), str::to_owned),
    other => other.to_string(),
  }
}

/// `null` and missing become an empty string.
pub(crate) fn string_or_empty<'de, D>(de: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(de).map(Option::unwrap_or_default)
}

/// Accepts a JSON number or a numeric string; `null` becomes `0.0`.
pub(crate) fn coordinate<'de, D>(de: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(de)? {
    None | Some(Value::Null) => Ok(0.0),
    Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(0.0)),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
    Some(Value::String(s)) => s
      .trim()
      .parse()
      .map_err(|_| D::Error::custom(format!("invalid coordinate: {s:?}"))),
    Some(other) => Err(D::Error::custom(format!(
      "invalid coordinate: {other}"
    ))),
  }
}

#[cfg(test)]
pub(crate) mod testing {
  //! A one-response-fits-all HTTP server on localhost.

  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  pub struct CannedServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
  }

  impl CannedServer {
    pub fn hits(&self) -> usize {
      self.hits.load(Ordering::SeqCst)
    }

    /// Request line of the first request received, e.g. `GET /x HTTP/1.1`.
    pub fn first_request_line(&self) -> String {
      self
        .requests
        .lock()
        .unwrap()
        .first()
        .and_then(|r| r.lines().next().map(str::to_owned))
        .unwrap_or_default()
    }
  }

  /// Answers every connection with `status` and `body`.
  pub async fn serve(status: u16, content_type: &str, body: &str) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let response = format!(
      "HTTP/1.1 {status} Canned\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
      body.len()
    );
    let (task_hits, task_requests) = (hits.clone(), requests.clone());
    tokio::spawn(async move {
      while let Ok((mut socket, _)) = listener.accept().await {
        task_hits.fetch_add(1, Ordering::SeqCst);
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap_or(0);
        task_requests
          .lock()
          .unwrap()
          .push(String::from_utf8_lossy(&buf[..n]).into_owned());
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
      }
    });

    CannedServer {
      base_url: format!("http://{addr}"),
      hits,
      requests,
    }
  }

  /// HTTP client for tests: rustls provider installed as in `main`, and no
  /// proxy between us and localhost.
  pub fn client() -> reqwest::Client {
    let _ = rustls::crypto::ring::default_provider().install_default();
    reqwest::Client::builder().no_proxy().build().unwrap()
  }

  pub async fn serve_json(status: u16, body: &str) -> CannedServer {
    serve(status, "application/json", body).await
  }

  /// A base URL on which nothing listens.
  pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
  }
}
