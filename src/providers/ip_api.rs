//! IP geolocation using ip-api.com (free tier, no key).

use super::{coordinate, get_json, string_or_empty, GeoProvider};
use crate::error::LocateError;
use crate::location::LocationData;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

pub const NAME: &str = "ipapi";
pub const DEFAULT_BASE_URL: &str = "http://ip-api.com/json";

/// Geolocation data from ip-api.com
///
/// Fields follow the `ip-api.com` JSON response structure. Anything not
/// provided decodes as empty.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Response {
  /// Request status ("success" or "fail")
  #[serde(default, deserialize_with = "string_or_empty")]
  pub status: String,

  /// Failure message (if status is "fail")
  pub message: Option<String>,

  /// Resolved IP address
  #[serde(default, deserialize_with = "string_or_empty")]
  pub query: String,

  #[serde(default, deserialize_with = "string_or_empty")]
  pub country: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub country_code: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub city: String,

  /// Region/State name
  #[serde(default, deserialize_with = "string_or_empty")]
  pub region_name: String,

  /// Region/State short code
  #[serde(default, deserialize_with = "string_or_empty")]
  pub region: String,

  #[serde(default, deserialize_with = "coordinate")]
  pub lat: f64,
  #[serde(default, deserialize_with = "coordinate")]
  pub lon: f64,

  /// Internet Service Provider
  #[serde(default, deserialize_with = "string_or_empty")]
  pub isp: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub org: String,

  /// AS number and name, e.g. "AS15169 Google LLC"
  #[serde(default, rename = "as", deserialize_with = "string_or_empty")]
  pub asn: String,

  #[serde(default, deserialize_with = "string_or_empty")]
  pub timezone: String,
}

impl Response {
  /// Maps a decoded answer into a record, or the provider's failure.
  ///
  /// # Errors
  /// Returns [`LocateError::ProviderApi`] when `status` is "fail". Any other
  /// status, or none at all, is mapped as a result.
  pub fn into_location(self, ip: IpAddr) -> Result<LocationData, LocateError> {
    if self.status == "fail" {
      let message = self
        .message
        .unwrap_or_else(|| "API request failed".to_string());
      return Err(LocateError::api(NAME, message));
    }

    let ip = if self.query.is_empty() {
      ip.to_string()
    } else {
      self.query
    };

    Ok(LocationData {
      country: self.country,
      country_code: self.country_code,
      city: self.city,
      region: self.region_name,
      region_code: self.region,
      latitude: self.lat,
      longitude: self.lon,
      isp: self.isp,
      organization: self.org,
      asn: self.asn,
      timezone: self.timezone,
      ..LocationData::new(ip)
    })
  }
}

pub struct IpApi {
  client: Client,
  base_url: String,
  timeout: Duration,
}

impl IpApi {
  pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
    Self {
      client,
      base_url: base_url.into(),
      timeout,
    }
  }
}

#[async_trait]
impl GeoProvider for IpApi {
  fn name(&self) -> &'static str {
    NAME
  }

  async fn resolve(&self, ip: IpAddr) -> Result<LocationData, LocateError> {
    let url = format!("{}/{ip}", self.base_url.trim_end_matches('/'));
    debug!("{NAME}: GET {url}");

    // ip-api answers with a JSON "fail" payload, so the status code is only
    // consulted when the body could not be decoded.
    let (_, response) =
      get_json::<Response>(NAME, self.client.get(&url), self.timeout).await?;
    response.into_location(ip)
  }
}
