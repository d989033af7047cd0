//! Text, JSON and table views of a [`LocationData`].

use crate::location::LocationData;
use crate::theme::Theme;
use anyhow::{Context, Result};
use clap::ValueEnum;
use console::{measure_text_width, pad_str, Alignment};
use serde::{Deserialize, Serialize};

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
pub enum OutputFormat {
  /// Labeled lines, empty fields omitted.
  #[default]
  Simple,
  /// Every field, machine readable.
  Json,
  /// Boxed two-column table.
  Table,
}

impl OutputFormat {
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Simple => "simple",
      Self::Json => "json",
      Self::Table => "table",
    }
  }
}

const NOT_AVAILABLE: &str = "N/A";

/// Renders `data` in `format`, followed by the Maps link when coordinates
/// are known.
///
/// # Errors
/// Only the JSON view can fail, if serialization does.
pub fn render(
  data: &LocationData,
  format: OutputFormat,
  theme: Theme,
) -> Result<String> {
  let mut out = match format {
    OutputFormat::Simple => render_simple(data, theme),
    OutputFormat::Json => render_json(data)?,
    OutputFormat::Table => render_table(data),
  };

  if let Some(url) = data.maps_url() {
    out.push_str("\n\n");
    out.push_str(&format!("{} {url}", theme.success("Google Maps:")));
  }
  Ok(out)
}

/// Only shown once the provider named a country.
fn location_line(data: &LocationData) -> Option<String> {
  if data.country.is_empty() {
    return None;
  }
  let parts: Vec<&str> = [&data.city, &data.region, &data.country]
    .into_iter()
    .map(String::as_str)
    .filter(|part| !part.is_empty())
    .collect();

  let mut line = parts.join(", ");
  if !data.country_code.is_empty() {
    line.push_str(&format!(" ({})", data.country_code));
  }
  Some(line)
}

fn coordinates_text(data: &LocationData) -> Option<String> {
  data
    .coordinates()
    .map(|(lat, lon)| format!("{lat:.6}, {lon:.6}"))
}

pub fn render_simple(data: &LocationData, theme: Theme) -> String {
  let mut lines = vec![
    theme.heading("IP Location Information"),
    "=".repeat(50),
    format!("{} {}", theme.label("IP Address:"), data.ip),
  ];

  if let Some(location) = location_line(data) {
    lines.push(format!("{} {location}", theme.label("Location:")));
  }
  if let Some(coords) = coordinates_text(data) {
    lines.push(format!("{} {coords}", theme.label("Coordinates:")));
  }

  for (label, value) in [
    ("ISP:", &data.isp),
    ("Organization:", &data.organization),
    ("ASN:", &data.asn),
    ("Timezone:", &data.timezone),
  ] {
    if !value.is_empty() {
      lines.push(format!("{} {value}", theme.label(label)));
    }
  }

  lines.push(format!("{} {}", theme.warn("Accuracy:"), data.accuracy));
  lines.join("\n")
}

/// Pretty JSON with every field, empty or not.
///
/// # Errors
/// Fails only if serialization fails.
pub fn render_json(data: &LocationData) -> Result<String> {
  serde_json::to_string_pretty(data)
    .context("Failed to serialize location to JSON")
}

fn with_code(name: &str, code: &str) -> String {
  if code.is_empty() {
    name.to_string()
  } else {
    format!("{name} ({code})")
  }
}

/// Rows shown by the table view, empty and `N/A` values already dropped.
fn table_rows(data: &LocationData) -> Vec<(&'static str, String)> {
  let rows = [
    ("IP Address", data.ip.clone()),
    ("Country", with_code(&data.country, &data.country_code)),
    ("Region", with_code(&data.region, &data.region_code)),
    ("City", data.city.clone()),
    (
      "Coordinates",
      coordinates_text(data).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    ),
    ("ISP", data.isp.clone()),
    ("Organization", data.organization.clone()),
    ("ASN", data.asn.clone()),
    ("Timezone", data.timezone.clone()),
    ("Accuracy", data.accuracy.clone()),
  ];

  rows
    .into_iter()
    .filter(|(_, value)| !value.is_empty() && value != NOT_AVAILABLE)
    .collect()
}

pub fn render_table(data: &LocationData) -> String {
  let rows = table_rows(data);
  if rows.is_empty() {
    return "No data available".to_string();
  }

  let field_width = rows
    .iter()
    .map(|(field, _)| measure_text_width(field))
    .chain(std::iter::once(measure_text_width("Field")))
    .max()
    .unwrap_or(0);
  let value_width = rows
    .iter()
    .map(|(_, value)| measure_text_width(value))
    .chain(std::iter::once(measure_text_width("Value")))
    .max()
    .unwrap_or(0);

  let rule = |left: &str, mid: &str, right: &str| {
    format!(
      "{left}{}{mid}{}{right}",
      "─".repeat(field_width + 2),
      "─".repeat(value_width + 2)
    )
  };
  let row = |field: &str, value: &str| {
    format!(
      "│ {} │ {} │",
      pad_str(field, field_width, Alignment::Left, None),
      pad_str(value, value_width, Alignment::Left, None)
    )
  };

  let mut lines = Vec::with_capacity(rows.len() + 4);
  lines.push(rule("┌", "┬", "┐"));
  lines.push(row("Field", "Value"));
  lines.push(rule("├", "┼", "┤"));
  lines.extend(rows.iter().map(|(field, value)| row(field, value)));
  lines.push(rule("└", "┴", "┘"));
  lines.join("\n")
}

/// Footer printed after a remote lookup in the simple format.
pub fn accuracy_footer(theme: Theme) -> String {
  [
    theme.warn("IP Geolocation Accuracy Information:"),
    "• Country level: 95-99% accurate".to_string(),
    "• City level: 55-80% accurate".to_string(),
    "• Precise location: Not reliable due to privacy protections".to_string(),
    "• VPNs/Proxies: Show server location, not user location".to_string(),
  ]
  .join("\n")
}
