//! WeatherWise - Weather API proxy
//!
//! Serves current conditions and forecasts from OpenWeatherMap behind a
//! short-lived cache, with retrying upstream fetches and request coalescing.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{Result, WeatherError};
pub use service::WeatherService;
pub use tasks::spawn_cleanup_task;
