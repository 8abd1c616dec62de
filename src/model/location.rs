//! Geographic positions reported by messages and forms.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair, kept as the strings the sender wrote.
///
/// Values are validated but never reformatted, so downstream reports show
/// exactly what was transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatLongPair {
    pub latitude: String,
    pub longitude: String,
}

impl LatLongPair {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into().trim().to_string(),
            longitude: longitude.into().trim().to_string(),
        }
    }

    /// Split a combined `"lat, lon"` field.
    ///
    /// Accepts comma, semicolon or whitespace separators. Returns `None` when
    /// the text has no separator or more than two parts.
    pub fn from_combined(text: &str) -> Option<Self> {
        let text = text.trim();
        let parts: Vec<&str> = if text.contains(',') {
            text.split(',').map(str::trim).collect()
        } else if text.contains(';') {
            text.split(';').map(str::trim).collect()
        } else {
            text.split_whitespace().collect()
        };
        match parts.as_slice() {
            [lat, lon] if !lat.is_empty() && !lon.is_empty() => Some(Self::new(*lat, *lon)),
            _ => None,
        }
    }

    /// Parse hemisphere notation as used by the `X-Location` header:
    /// `"47.603000N, 122.330000W"`.
    pub fn from_hemisphere(text: &str) -> Option<Self> {
        let (lat_raw, lon_raw) = text.split_once(',')?;
        let lat = signed_coordinate(lat_raw.trim(), 'N', 'S')?;
        let lon = signed_coordinate(lon_raw.trim(), 'E', 'W')?;
        Some(Self::new(lat, lon))
    }

    pub fn latitude_value(&self) -> Option<f64> {
        self.latitude.parse::<f64>().ok()
    }

    pub fn longitude_value(&self) -> Option<f64> {
        self.longitude.parse::<f64>().ok()
    }

    /// A pair is valid when both parts are numbers within geodetic range and
    /// the pair is not the `0, 0` placeholder that clients send without a fix.
    pub fn is_valid(&self) -> bool {
        match (self.latitude_value(), self.longitude_value()) {
            (Some(lat), Some(lon)) => {
                lat.is_finite()
                    && lon.is_finite()
                    && (-90.0..=90.0).contains(&lat)
                    && (-180.0..=180.0).contains(&lon)
                    && !(lat == 0.0 && lon == 0.0)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for LatLongPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Turn `"122.33W"` into `"-122.33"`.
fn signed_coordinate(raw: &str, positive: char, negative: char) -> Option<String> {
    let last = raw.chars().last()?.to_ascii_uppercase();
    let number = raw[..raw.len() - last.len_utf8()].trim();
    number.parse::<f64>().ok()?;
    if last == positive {
        Some(number.to_string())
    } else if last == negative {
        Some(format!("-{number}"))
    } else {
        None
    }
}

/// Where a message-level position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationSource {
    /// Fix from a GPS receiver attached to the client.
    Gps,
    /// Centre of a Maidenhead grid square.
    Grid,
    /// Entered by hand in the client.
    Manual,
    /// Supplied by an operator after the fact.
    Override,
    /// No position, or one of unknown origin.
    #[default]
    Unknown,
}

impl LocationSource {
    /// Parse the parenthesised tag of an `X-Location` header (`"(GPS)"`).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().trim_start_matches('(').trim_end_matches(')');
        match tag.to_ascii_uppercase().as_str() {
            "GPS" => Self::Gps,
            "GRID SQUARE" | "GRID" => Self::Grid,
            "SPECIFIED" | "MANUAL" => Self::Manual,
            _ => Self::Unknown,
        }
    }
}
