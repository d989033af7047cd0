//! Optional user configuration and the merged run settings.
//!
//! The config file is only ever read. A missing or unreadable file means
//! built-in defaults.

use crate::cli::Cli;
use crate::providers::{Endpoints, ProviderKind};
use crate::render::OutputFormat;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "iploc";
const FILE_NAME: Option<&str> = None;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UserConfig {
  pub provider: Option<ProviderKind>,
  pub format: Option<OutputFormat>,
  pub ipinfo_token: Option<String>,
  pub ipstack_token: Option<String>,
  pub endpoints: Option<Endpoints>,
}

impl UserConfig {
  fn token_for(&self, provider: ProviderKind) -> Option<&str> {
    match provider {
      ProviderKind::IpApi => None,
      ProviderKind::IpInfo => self.ipinfo_token.as_deref(),
      ProviderKind::IpStack => self.ipstack_token.as_deref(),
    }
  }
}

/// Location of the config file, e.g. `~/.config/iploc/default-config.toml`.
pub fn path() -> Option<PathBuf> {
  confy::get_configuration_file_path(APP_NAME, FILE_NAME).ok()
}

/// Reads the config file if it exists.
pub fn load() -> UserConfig {
  let Some(path) = path().filter(|p| p.exists()) else {
    return UserConfig::default();
  };
  match confy::load_path(&path) {
    Ok(cfg) => {
      debug!("loaded config from {}", path.display());
      cfg
    }
    Err(e) => {
      warn!("ignoring unreadable config {}: {e}", path.display());
      UserConfig::default()
    }
  }
}

/// Everything one run needs, after merging flags, environment and file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub ip_address: Option<String>,
  pub provider: ProviderKind,
  pub format: OutputFormat,
  pub token: Option<String>,
  pub no_color: bool,
  pub endpoints: Endpoints,
}

impl Settings {
  /// Precedence: command line, then environment, then config file, then
  /// defaults. Empty tokens count as absent.
  pub fn resolve<F>(cli: &Cli, file: &UserConfig, env: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let provider = cli.provider.or(file.provider).unwrap_or_default();
    let token = cli
      .token
      .clone()
      .filter(|t| !t.is_empty())
      .or_else(|| {
        provider
          .token_env_var()
          .and_then(&env)
          .filter(|t| !t.is_empty())
      })
      .or_else(|| {
        file
          .token_for(provider)
          .filter(|t| !t.is_empty())
          .map(str::to_owned)
      });

    Self {
      ip_address: cli.ip_address.clone(),
      provider,
      format: cli.format.or(file.format).unwrap_or_default(),
      token,
      no_color: cli.no_color,
      endpoints: file.endpoints.clone().unwrap_or_default(),
    }
  }

  /// Human-readable dump with the token masked.
  pub fn describe(&self) -> String {
    let token = self.token.as_deref().map_or_else(
      || "(none)".to_string(),
      |t| {
        let shown = t.chars().count().saturating_sub(8).min(4);
        let tail: String = t.chars().skip(t.chars().count() - shown).collect();
        format!("****{tail}")
      },
    );
    let config_path = path().map_or_else(
      || "(unavailable)".to_string(),
      |p| p.display().to_string(),
    );

    [
      format!("config file: {config_path}"),
      format!("provider:    {}", self.provider.name()),
      format!("format:      {}", self.format.name()),
      format!("token:       {token}"),
      format!("ipapi url:   {}", self.endpoints.ip_api),
      format!("ipinfo url:  {}", self.endpoints.ipinfo),
      format!("ipstack url: {}", self.endpoints.ipstack),
    ]
    .join("\n")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("iploc").chain(args.iter().copied()))
      .unwrap()
  }

  fn no_env(_: &str) -> Option<String> {
    None
  }

  #[test]
  fn test_defaults() {
    let s = Settings::resolve(&cli(&[]), &UserConfig::default(), no_env);
    assert_eq!(s.provider, ProviderKind::IpApi);
    assert_eq!(s.format, OutputFormat::Simple);
    assert!(s.token.is_none());
    assert_eq!(s.endpoints, Endpoints::default());
  }

  #[test]
  fn test_file_supplies_defaults_cli_overrides() {
    let file = UserConfig {
      provider: Some(ProviderKind::IpInfo),
      format: Some(OutputFormat::Table),
      ..UserConfig::default()
    };
    let s = Settings::resolve(&cli(&[]), &file, no_env);
    assert_eq!(s.provider, ProviderKind::IpInfo);
    assert_eq!(s.format, OutputFormat::Table);

    let s = Settings::resolve(&cli(&["-p", "ipapi", "-f", "json"]), &file, no_env);
    assert_eq!(s.provider, ProviderKind::IpApi);
    assert_eq!(s.format, OutputFormat::Json);
  }

  #[test]
  fn test_token_precedence() {
    let file = UserConfig {
      ipstack_token: Some("from-file".to_string()),
      ..UserConfig::default()
    };
    let env = |key: &str| (key == "IPSTACK_TOKEN").then(|| "from-env".to_string());

    let s = Settings::resolve(&cli(&["-p", "ipstack", "-t", "from-flag"]), &file, env);
    assert_eq!(s.token.as_deref(), Some("from-flag"));

    let s = Settings::resolve(&cli(&["-p", "ipstack"]), &file, env);
    assert_eq!(s.token.as_deref(), Some("from-env"));

    let s = Settings::resolve(&cli(&["-p", "ipstack"]), &file, no_env);
    assert_eq!(s.token.as_deref(), Some("from-file"));
  }

  #[test]
  fn test_token_is_per_provider() {
    let file = UserConfig {
      ipstack_token: Some("stack".to_string()),
      ..UserConfig::default()
    };
    let s = Settings::resolve(&cli(&["-p", "ipinfo"]), &file, no_env);
    assert!(s.token.is_none());
  }

  #[test]
  fn test_empty_token_counts_as_absent() {
    let env = |_: &str| Some(String::new());
    let s = Settings::resolve(&cli(&["-p", "ipstack", "-t", ""]), &UserConfig::default(), env);
    assert!(s.token.is_none());
  }

  #[test]
  fn test_describe_masks_token() {
    let s = Settings::resolve(
      &cli(&["-p", "ipinfo", "-t", "abcdef123456"]),
      &UserConfig::default(),
      no_env,
    );
    let text = s.describe();
    assert!(text.contains("****3456"));
    assert!(!text.contains("abcdef"));
    assert!(text.contains("provider:    ipinfo"));
  }

  #[test]
  fn test_config_file_shape() {
    let cfg: UserConfig = serde_json::from_str(
      r#"{"provider":"ipstack","format":"table","ipstack_token":"k",
          "endpoints":{"ipstack":"https://api.ipstack.com"}}"#,
    )
    .unwrap();
    assert_eq!(cfg.provider, Some(ProviderKind::IpStack));
    assert_eq!(cfg.format, Some(OutputFormat::Table));
    let endpoints = cfg.endpoints.unwrap();
    assert_eq!(endpoints.ipstack, "https://api.ipstack.com");
    assert_eq!(endpoints.ip_api, Endpoints::default().ip_api);
  }
}
