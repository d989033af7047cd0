use crate::discover::{DEFAULT_ENDPOINTS, PROBE_TIMEOUT};
use crate::error::LocateError;
use crate::location::LocationData;
use crate::providers::LOOKUP_TIMEOUT;
use crate::render::{self, OutputFormat};
use crate::steps::{self, Target};
use crate::theme::Theme;
use crate::user_config::Settings;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::debug;
use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;

pub struct App {
  settings: Settings,
  theme: Theme,
  client: Client,
  discovery_endpoints: Vec<String>,
}

impl App {
  pub fn new(settings: Settings) -> Result<Self> {
    let client = Client::builder()
      .user_agent(format!("iploc/{}", env!("CARGO_PKG_VERSION")))
      .build()
      .context("Failed to build HTTP client")?;
    Ok(Self::with_client(settings, client))
  }

  pub fn with_client(settings: Settings, client: Client) -> Self {
    Self {
      theme: Theme::from_flags(settings.no_color),
      settings,
      client,
      discovery_endpoints: DEFAULT_ENDPOINTS
        .iter()
        .map(ToString::to_string)
        .collect(),
    }
  }

  #[cfg(test)]
  #[must_use]
  pub fn with_discovery_endpoints(mut self, endpoints: Vec<String>) -> Self {
    self.discovery_endpoints = endpoints;
    self
  }

  pub const fn theme(&self) -> Theme {
    self.theme
  }

  /// One full lookup: target, classification, provider, rendering.
  pub async fn run(&self) -> Result<(), LocateError> {
    let target = self.resolve_target().await?;

    match steps::classify_target(&target)? {
      Target::Local(record) => self.print_local(&record),
      Target::Public(ip) => {
        let provider = steps::select_provider(
          self.settings.provider,
          self.settings.token.as_deref(),
          &self.client,
          &self.settings.endpoints,
          LOOKUP_TIMEOUT,
        )?;

        let message = locating_notice(ip, provider.name());
        debug!("{message}");
        eprintln!("{}", self.theme.info(&message));
        let spinner = ProgressBar::new_spinner().with_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        let result = provider.resolve(ip).await;
        spinner.finish_and_clear();

        self.print_remote(&result?)
      }
    }
  }

  async fn resolve_target(&self) -> Result<String, LocateError> {
    if self.settings.ip_address.is_none() {
      eprintln!(
        "{}",
        self
          .theme
          .info("No IP provided, detecting your public IP...")
      );
    }

    let target = steps::resolve_target(
      self.settings.ip_address.as_deref(),
      &self.client,
      &self.discovery_endpoints,
      PROBE_TIMEOUT,
    )
    .await?;

    if self.settings.ip_address.is_none() {
      eprintln!(
        "{}\n",
        self.theme.success(&format!("Your public IP: {target}"))
      );
    }
    Ok(target)
  }

  fn print_local(&self, record: &LocationData) -> Result<(), LocateError> {
    eprintln!(
      "{}",
      self
        .theme
        .warn(&format!("Private/Local IP detected: {}", record.ip))
    );
    eprintln!(
      "{}\n",
      self.theme.info("Analyzing local network information...")
    );

    println!(
      "{}",
      render::render(record, self.settings.format, self.theme)?
    );

    eprintln!(
      "\n{}",
      self
        .theme
        .warn("Note: Private IPs cannot be geolocated using external APIs")
    );
    eprintln!(
      "{}",
      self
        .theme
        .label("This analysis is based on RFC 1918 private network ranges")
    );
    Ok(())
  }

  fn print_remote(&self, record: &LocationData) -> Result<(), LocateError> {
    println!(
      "{}",
      render::render(record, self.settings.format, self.theme)?
    );
    if self.settings.format == OutputFormat::Simple {
      println!("\n{}", render::accuracy_footer(self.theme));
    }
    Ok(())
  }
}

fn locating_notice(ip: IpAddr, provider: &str) -> String {
  format!("Locating IP {ip} using {provider}...")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::providers::{testing, Endpoints, ProviderKind};

  fn settings(ip: Option<&str>, provider: ProviderKind) -> Settings {
    Settings {
      ip_address: ip.map(str::to_owned),
      provider,
      format: OutputFormat::Json,
      token: None,
      no_color: true,
      endpoints: Endpoints::default(),
    }
  }

  fn endpoints_at(base_url: &str) -> Endpoints {
    Endpoints {
      ip_api: base_url.to_string(),
      ipinfo: base_url.to_string(),
      ipstack: base_url.to_string(),
    }
  }

  fn app(settings: Settings, discovery: &str) -> App {
    App::with_client(settings, testing::client())
      .with_discovery_endpoints(vec![discovery.to_string()])
  }

  #[test]
  fn test_locating_notice_names_ip_and_provider() {
    let ip: IpAddr = "8.8.8.8".parse().unwrap();
    assert_eq!(
      locating_notice(ip, "ipinfo"),
      "Locating IP 8.8.8.8 using ipinfo..."
    );
  }

  #[tokio::test]
  async fn test_invalid_ip_makes_no_request() {
    let server = testing::serve(200, "text/plain", "8.8.8.8").await;
    let mut s = settings(Some("not-an-ip"), ProviderKind::IpApi);
    s.endpoints = endpoints_at(&server.base_url);

    let err = app(s, &server.base_url).run().await.unwrap_err();
    assert!(matches!(err, LocateError::InvalidIpFormat(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(server.hits(), 0);
  }

  #[tokio::test]
  async fn test_ipstack_without_token_makes_no_request() {
    let server = testing::serve_json(200, "{}").await;
    let mut s = settings(Some("8.8.8.8"), ProviderKind::IpStack);
    s.endpoints = endpoints_at(&server.base_url);

    let err = app(s, &server.base_url).run().await.unwrap_err();
    assert!(matches!(err, LocateError::MissingRequiredToken { .. }));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(server.hits(), 0);
  }

  #[tokio::test]
  async fn test_private_ip_is_answered_locally() {
    let server = testing::serve_json(200, "{}").await;
    let mut s = settings(Some("192.168.1.1"), ProviderKind::IpApi);
    s.endpoints = endpoints_at(&server.base_url);

    app(s, &server.base_url).run().await.unwrap();
    assert_eq!(server.hits(), 0);
  }

  #[tokio::test]
  async fn test_documentation_ip_is_answered_locally() {
    let server = testing::serve_json(200, "{}").await;
    let mut s = settings(Some("198.51.100.1"), ProviderKind::IpApi);
    s.endpoints = endpoints_at(&server.base_url);

    app(s, &server.base_url).run().await.unwrap();
    assert_eq!(server.hits(), 0);
  }

  #[tokio::test]
  async fn test_reserved_ip_fails() {
    let s = settings(Some("239.255.255.250"), ProviderKind::IpApi);
    let err = app(s, "http://unused.invalid").run().await.unwrap_err();
    assert!(matches!(err, LocateError::UnsupportedAddress(_)));
  }

  #[tokio::test]
  async fn test_public_ip_goes_to_provider() {
    let server = testing::serve_json(
      200,
      r#"{"status":"success","query":"8.8.8.8","country":"United States","lat":37.4,"lon":-122.08}"#,
    )
    .await;
    let mut s = settings(Some("8.8.8.8"), ProviderKind::IpApi);
    s.endpoints = endpoints_at(&server.base_url);

    app(s, "http://unused.invalid").run().await.unwrap();
    assert_eq!(server.hits(), 1);
  }

  #[tokio::test]
  async fn test_provider_failure_is_reported() {
    let server =
      testing::serve_json(200, r#"{"status":"fail","message":"invalid query"}"#)
        .await;
    let mut s = settings(Some("8.8.8.8"), ProviderKind::IpApi);
    s.endpoints = endpoints_at(&server.base_url);

    let err = app(s, "http://unused.invalid").run().await.unwrap_err();
    assert!(matches!(err, LocateError::ProviderApi { .. }));
  }

  #[tokio::test]
  async fn test_discovered_private_ip_is_answered_locally() {
    let echo = testing::serve(200, "text/plain", "10.0.0.7\n").await;
    let s = settings(None, ProviderKind::IpApi);

    app(s, &echo.base_url).run().await.unwrap();
    assert_eq!(echo.hits(), 1);
  }

  #[tokio::test]
  async fn test_discovery_failure() {
    let dead = testing::dead_url().await;
    let s = settings(None, ProviderKind::IpApi);

    let err = app(s, &dead).run().await.unwrap_err();
    assert!(matches!(err, LocateError::PublicIpDiscoveryFailed));
  }
}
