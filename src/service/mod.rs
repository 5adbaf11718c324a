//! Service Module
//!
//! Ties the cache store and the upstream fetcher together per request.

mod singleflight;
mod weather;

pub use singleflight::SingleFlight;
pub use weather::WeatherService;
