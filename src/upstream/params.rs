//! Upstream Parameters Module
//!
//! Endpoint kinds, unit systems, locations and the query parameters sent to
//! the provider.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

// == Endpoint ==
/// Provider endpoint kinds served by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Current conditions
    Current,
    /// Multi-day forecast
    Forecast,
}

impl Endpoint {
    /// Cache key prefix for this endpoint.
    pub fn kind(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Provider path segment appended to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Generic client-facing failure message.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Endpoint::Current => "Failed to fetch weather data",
            Endpoint::Forecast => "Failed to fetch forecast data",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

// == Units ==
/// Unit system understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, metres/second
    #[default]
    Metric,
    /// Fahrenheit, miles/hour
    Imperial,
    /// Kelvin
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            other => Err(format!(
                "Unsupported units '{}' (expected metric, imperial or standard)",
                other
            )),
        }
    }
}

// == Location ==
/// Where to look up weather.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// City name as given by the client (trimmed)
    City(String),
    /// Decimal degree coordinate pair
    Coordinates { lat: f64, lon: f64 },
}

impl Location {
    /// Token used inside cache keys: the city, or `<lat>_<lon>`.
    ///
    /// `%` and `_` in a city are percent-encoded, so a city token never
    /// contains the separator a coordinate token always has.
    pub fn token(&self) -> String {
        match self {
            Location::City(name) => name.replace('%', "%25").replace('_', "%5F"),
            Location::Coordinates { lat, lon } => format!("{}_{}", lat + 0.0, lon + 0.0),
        }
    }
}

// == Fetch Params ==
/// Parameters for one provider request, minus the credential.
///
/// The fetcher appends the credential at send time so it never lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    pub location: Location,
    pub units: Units,
}

impl FetchParams {
    pub fn new(location: Location, units: Units) -> Self {
        Self { location, units }
    }

    /// Query pairs in provider format: `{q, units}` or `{lat, lon, units}`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = match &self.location {
            Location::City(name) => vec![("q", name.clone())],
            Location::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        pairs.push(("units", self.units.to_string()));
        pairs
    }
}
