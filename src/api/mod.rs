//! API Module
//!
//! HTTP handlers and routing for the weather service REST API.
//!
//! # Endpoints
//! - `GET /api/weather/current` - Current conditions for a city or coordinates
//! - `GET /api/weather/forecast` - Forecast for a city or coordinates
//! - `GET /api/config` - Dashboard defaults
//! - `GET /api/stats` - Cache statistics
//! - `GET /api/health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
