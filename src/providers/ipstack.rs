//! IP geolocation using ipstack.com. Needs an access key.

use super::{coordinate, error_message, get_json, string_or_empty, GeoProvider};
use crate::error::LocateError;
use crate::location::LocationData;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;

pub const NAME: &str = "ipstack";
pub const DEFAULT_BASE_URL: &str = "http://api.ipstack.com";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TimeZone {
  #[serde(default, deserialize_with = "string_or_empty")]
  pub id: String,
}

/// Only returned on paid plans.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Connection {
  pub asn: Option<Value>,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub isp: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Response {
  #[serde(default, deserialize_with = "string_or_empty")]
  pub ip: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub country_name: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub country_code: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub region_name: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub region_code: String,
  #[serde(default, deserialize_with = "string_or_empty")]
  pub city: String,
  #[serde(default, deserialize_with = "coordinate")]
  pub latitude: f64,
  #[serde(default, deserialize_with = "coordinate")]
  pub longitude: f64,
  pub time_zone: Option<TimeZone>,
  pub connection: Option<Connection>,
  pub error: Option<Value>,
}

fn format_asn(asn: &Value) -> String {
  match asn {
    Value::Number(n) => format!("AS{n}"),
    Value::String(s) => s.clone(),
    _ => String::new(),
  }
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
      return Err(LocateError::api(NAME, error_message(error, &["info", "type"])));
    }
    if !status.is_success() {
      return Err(LocateError::HttpStatus {
        provider: NAME,
        status,
      });
    }

    let connection = self.connection.unwrap_or_default();
    let ip = if self.ip.is_empty() {
      ip.to_string()
    } else {
      self.ip
    };

    Ok(LocationData {
      country: self.country_name,
      country_code: self.country_code,
      city: self.city,
      region: self.region_name,
      region_code: self.region_code,
      latitude: self.latitude,
      longitude: self.longitude,
      isp: connection.isp,
      asn: connection.asn.as_ref().map(format_asn).unwrap_or_default(),
      timezone: self.time_zone.map(|tz| tz.id).unwrap_or_default(),
      ..LocationData::new(ip)
    })
  }
}

pub struct IpStack {
  client: Client,
  base_url: String,
  access_key: String,
  timeout: Duration,
}

impl IpStack {
  /// `access_key` must be non-empty; the caller checks before building.
  pub fn new(
    client: Client,
    base_url: impl Into<String>,
    access_key: String,
    timeout: Duration,
  ) -> Self {
    Self {
      client,
      base_url: base_url.into(),
      access_key,
      timeout,
    }
  }
}

#[async_trait]
impl GeoProvider for IpStack {
  fn name(&self) -> &'static str {
    NAME
  }

  async fn resolve(&self, ip: IpAddr) -> Result<LocationData, LocateError> {
    let url = format!("{}/{ip}", self.base_url.trim_end_matches('/'));
    debug!("{NAME}: GET {url}?access_key=***");

    let request = self
      .client
      .get(&url)
      .query(&[("access_key", self.access_key.as_str())]);
    let (status, response) =
      get_json::<Response>(NAME, request, self.timeout).await?;
    response.into_location(ip, status)
  }
}
