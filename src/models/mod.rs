//! Request and Response models for the weather API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! query-string parsing and JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::WeatherQuery;
pub use responses::{ConfigResponse, ErrorResponse, HealthResponse, StatsResponse};
