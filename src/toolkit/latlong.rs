//! Ordered search for a latitude/longitude pair across candidate fields.

use super::FieldSource;
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::reject::RejectReason;

/// Candidate base names tried after any type-specific ones.
pub const DEFAULT_CANDIDATES: [&str; 4] = ["map", "gps2", "gps", "location"];

/// Outcome of a lat/long search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatLongSearch {
    Found(LatLongPair),
    /// No candidate held a valid pair; `searched` lists every field name tried.
    NotFound { searched: Vec<String> },
}

impl LatLongSearch {
    pub fn found(self) -> Option<LatLongPair> {
        match self {
            Self::Found(pair) => Some(pair),
            Self::NotFound { .. } => None,
        }
    }

    /// Turn a failed search into a `CANT_PARSE_LATLONG` rejection whose
    /// context names every field that was looked at.
    pub fn require(self) -> Result<LatLongPair, ExtractError> {
        match self {
            Self::Found(pair) => Ok(pair),
            Self::NotFound { searched } => Err(ExtractError::reject(
                RejectReason::CantParseLatLong,
                format!("couldn't find lat/long within tags: {}", searched.join(", ")),
            )),
        }
    }
}

/// Try `overrides` then [`DEFAULT_CANDIDATES`].
///
/// For each base name the combined field (`map`) is tried first, then the
/// pair `maplat`/`maplon`. The first pair that passes
/// [`LatLongPair::is_valid`] wins.
pub fn resolve_lat_long(source: &impl FieldSource, overrides: &[&str]) -> LatLongSearch {
    let mut searched = Vec::new();
    let mut bases: Vec<&str> = Vec::with_capacity(overrides.len() + DEFAULT_CANDIDATES.len());
    for base in overrides.iter().chain(DEFAULT_CANDIDATES.iter()) {
        if !bases.contains(base) {
            bases.push(*base);
        }
    }

    for base in bases {
        searched.push(base.to_string());
        let combined = source.value(base);
        if !combined.is_empty() {
            if let Some(pair) = LatLongPair::from_combined(&combined).filter(LatLongPair::is_valid) {
                return LatLongSearch::Found(pair);
            }
        }

        let lat_name = format!("{base}lat");
        let lon_name = format!("{base}lon");
        let lat = source.value(&lat_name);
        let lon = source.value(&lon_name);
        searched.push(lat_name);
        searched.push(lon_name);
        if !lat.is_empty() && !lon.is_empty() {
            let pair = LatLongPair::new(lat, lon);
            if pair.is_valid() {
                return LatLongSearch::Found(pair);
            }
        }
    }

    LatLongSearch::NotFound { searched }
}
