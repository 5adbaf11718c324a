//! Cache Key Module

use std::fmt;

use crate::upstream::{Endpoint, Location, Units};

// == Cache Key ==
/// `<endpoint>_<location>_<units>`, e.g. `current_Gaya_metric` or
/// `forecast_24.7955_84.9994_metric`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(endpoint: Endpoint, location: &Location, units: Units) -> Self {
        Self(format!("{}_{}_{}", endpoint.kind(), location.token(), units))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
