//! IP geolocation using ipinfo.io. Works anonymously, a token raises the
//! rate limit.

use super::{error_message, get_json, string_or_empty, GeoProvider};
use crate::error::LocateError;
use crate::location::LocationData;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;

pub const NAME: &str = "ipinfo";
pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Response {
  #[serde(default, deserialize_with = "string_or_empty")]
  pub ip: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub city: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub region: String,
  /// Two-letter country code.
  #[serde(default, deserialize_with = "string_or_empty")]
  pub country: String,
  /// "lat,lon"
  #[serde(default, deserialize_with = "string_or_empty")]
  pub loc: String,
  /// AS number followed by the operator name.
  #[serde(default, deserialize_with = "string_or_empty")]
  pub org: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub timezone: String,
  pub error: Option<Value>,
}

/// Splits "lat,lon". Anything else yields `(0.0, 0.0)`.
#[must_use]
pub fn parse_loc(loc: &str) -> (f64, f64) {
  let mut parts = loc.split(',');
  match (parts.next(), parts.next(), parts.next()) {
    (Some(lat), Some(lon), None) => {
      match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
        (Ok(lat), Ok(lon)) => (lat, lon),
        _ => (0.0, 0.0),
      }
    }
    _ => (0.0, 0.0),
  }
}

/// The leading "AS<digits>" token of an `org` string, if present.
fn asn_prefix(org: &str) -> Option<&str> {
  let token = org.split_whitespace().next()?;
  let digits = token.strip_prefix("AS")?;
  (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    .then_some(token)
}

impl Response {
  /// # Errors
  /// [`LocateError::ProviderApi`] for an `error` payload,
  /// [`LocateError::HttpStatus`] for any other non-2xx answer.
  pub fn into_location(
    self,
    ip: IpAddr,
    status: StatusCode,
  ) -> Result<LocationData, LocateError> {
    if let Some(error) = &self.error {
      return Err(LocateError::api(
        NAME,
        error_message(error, &["message", "title"]),
      ));
    }
    if !status.is_success() {
      return Err(LocateError::HttpStatus {
        provider: NAME,
        status,
      });
    }

    let (latitude, longitude) = parse_loc(&self.loc);
    let asn = asn_prefix(&self.org).unwrap_or_default().to_string();
    let ip = if self.ip.is_empty() {
      ip.to_string()
    } else {
      self.ip
    };

    Ok(LocationData {
      country: self.country,
      city: self.city,
      region: self.region,
      latitude,
      longitude,
      organization: self.org,
      asn,
      timezone: self.timezone,
      ..LocationData::new(ip)
    })
  }
}

pub struct IpInfo {
  client: Client,
  base_url: String,
  token: Option<String>,
  timeout: Duration,
}

impl IpInfo {
  pub fn new(
    client: Client,
    base_url: impl Into<String>,
    token: Option<String>,
    timeout: Duration,
  ) -> Self {
    Self {
      client,
      base_url: base_url.into(),
      token: token.filter(|t| !t.is_empty()),
      timeout,
    }
  }
}

#[async_trait]
impl GeoProvider for IpInfo {
  fn name(&self) -> &'static str {
    NAME
  }

  async fn resolve(&self, ip: IpAddr) -> Result<LocationData, LocateError> {
    let url = format!("{}/{ip}/json", self.base_url.trim_end_matches('/'));
    debug!(
      "{NAME}: GET {url} ({})",
      if self.token.is_some() {
        "with token"
      } else {
        "anonymous"
      }
    );

    let mut request = self.client.get(&url);
    if let Some(token) = &self.token {
      request = request.query(&[("token", token)]);
    }

    let (status, response) =
      get_json::<Response>(NAME, request, self.timeout).await?;
    response.into_location(ip, status)
  }
}
