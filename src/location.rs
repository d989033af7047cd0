use crate::classify::Classification;
use serde::{Deserialize, Serialize};

/// Accuracy note attached to every remote lookup.
pub const CITY_LEVEL_ACCURACY: &str = "City-level (±50km typical)";

/// Accuracy note attached to locally classified addresses.
pub const NETWORK_LEVEL_ACCURACY: &str = "Network-level identification only";

/// The normalized location record every provider produces.
///
/// Empty strings and `0.0` coordinates mean "unknown". A `0.0, 0.0` pair is
/// treated as absent by the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
  pub ip: String,
  pub country: String,
  pub country_code: String,
  pub city: String,
  pub region: String,
  pub region_code: String,
  pub latitude: f64,
  pub longitude: f64,
  pub isp: String,
  pub organization: String,
  pub asn: String,
  pub timezone: String,
  pub accuracy: String,
}

impl LocationData {
  /// An otherwise empty record for `ip` with the city-level accuracy note.
  pub fn new(ip: impl Into<String>) -> Self {
    Self {
      ip: ip.into(),
      country: String::new(),
      country_code: String::new(),
      city: String::new(),
      region: String::new(),
      region_code: String::new(),
      latitude: 0.0,
      longitude: 0.0,
      isp: String::new(),
      organization: String::new(),
      asn: String::new(),
      timezone: String::new(),
      accuracy: CITY_LEVEL_ACCURACY.to_string(),
    }
  }

  /// Record describing a private, loopback or link-local address.
  pub fn local(ip: impl Into<String>, class: Classification) -> Self {
    Self {
      country: "Local Network".to_string(),
      city: class.network_type.to_string(),
      region: class.description.to_string(),
      organization: "Private/Local Network".to_string(),
      timezone: "System timezone".to_string(),
      accuracy: NETWORK_LEVEL_ACCURACY.to_string(),
      ..Self::new(ip)
    }
  }

  /// Coordinates, unless both are zero.
  #[must_use]
  #[allow(clippy::float_cmp)]
  pub fn coordinates(&self) -> Option<(f64, f64)> {
    if self.latitude != 0.0 && self.longitude != 0.0 {
      Some((self.latitude, self.longitude))
    } else {
      None
    }
  }

  /// Google Maps deep link for the coordinates, if any.
  #[must_use]
  pub fn maps_url(&self) -> Option<String> {
    self
      .coordinates()
      .map(|(lat, lon)| format!("https://maps.google.com/?q={lat:.6},{lon:.6}"))
  }
}
