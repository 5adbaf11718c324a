//! Request DTOs for the weather API
//!
//! Query-string parameters and their resolution into provider parameters.

use serde::Deserialize;

use crate::error::{Result, WeatherError};
use crate::upstream::{FetchParams, Location, Units};

/// Query string of `GET /api/weather/current` and `GET /api/weather/forecast`.
///
/// # Fields
/// - `city`: City name, takes precedence over coordinates
/// - `lat` / `lon`: Decimal degrees, both required
/// - `units`: `metric`, `imperial` or `standard`; configured default when absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
}

impl WeatherQuery {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }

    pub fn coordinates(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: Some(lat.into()),
            lon: Some(lon.into()),
            ..Self::default()
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Resolves the query into provider parameters.
    ///
    /// Blank values count as absent. A city wins over coordinates.
    ///
    /// # Errors
    /// - `MissingLocation` when there is neither a city nor both coordinates
    /// - `InvalidQuery` for unparseable or out-of-range coordinates, or unknown units
    pub fn resolve(&self, default_units: Units) -> Result<FetchParams> {
        let location = self.location()?;
        let units = match present(&self.units) {
            Some(raw) => raw.parse::<Units>().map_err(WeatherError::InvalidQuery)?,
            None => default_units,
        };
        Ok(FetchParams::new(location, units))
    }

    fn location(&self) -> Result<Location> {
        if let Some(city) = present(&self.city) {
            return Ok(Location::City(city.to_string()));
        }

        match (present(&self.lat), present(&self.lon)) {
            (Some(lat), Some(lon)) => Ok(Location::Coordinates {
                lat: parse_degrees("lat", lat, 90.0)?,
                lon: parse_degrees("lon", lon, 180.0)?,
            }),
            _ => Err(WeatherError::MissingLocation),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_degrees(name: &str, raw: &str, limit: f64) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| WeatherError::InvalidQuery(format!("Invalid {}: '{}'", name, raw)))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(WeatherError::InvalidQuery(format!(
            "{} must be between -{} and {}",
            name, limit, limit
        )));
    }
    // -0 and 0 name the same place
    Ok(value + 0.0)
}
