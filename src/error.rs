//! Error types for the weather service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::upstream::Endpoint;

/// Client-facing message when neither a city nor coordinates were supplied.
pub const MISSING_LOCATION_MESSAGE: &str = "City name or coordinates required";

// == Weather Error Enum ==
/// Unified error type for the weather service.
///
/// Cloneable so a single fetch outcome can be handed to every coalesced waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// Client sent neither a city nor a coordinate pair
    #[error("{}", MISSING_LOCATION_MESSAGE)]
    MissingLocation,

    /// Client sent a location or units value that cannot be used
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Provider credential is not configured
    #[error("OpenWeatherMap API key not configured ({endpoint})")]
    Configuration { endpoint: Endpoint },

    /// Every upstream attempt failed
    #[error("Failed to fetch {endpoint} data after {attempts} attempts: {reason}")]
    Upstream {
        endpoint: Endpoint,
        attempts: u32,
        reason: String,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WeatherError {
    /// Message safe to show to the client.
    ///
    /// Fetch failures collapse to one generic message per endpoint.
    pub fn client_message(&self) -> String {
        match self {
            WeatherError::MissingLocation => MISSING_LOCATION_MESSAGE.to_string(),
            WeatherError::InvalidQuery(msg) => msg.clone(),
            WeatherError::Configuration { endpoint } | WeatherError::Upstream { endpoint, .. } => {
                endpoint.failure_message().to_string()
            }
            WeatherError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            WeatherError::MissingLocation | WeatherError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            WeatherError::Configuration { .. }
            | WeatherError::Upstream { .. }
            | WeatherError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.client_message()));

        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the weather service.
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_location_is_bad_request() {
        let err = WeatherError::MissingLocation;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "City name or coordinates required");
    }

    #[test]
    fn test_upstream_detail_is_hidden_from_client() {
        let err = WeatherError::Upstream {
            endpoint: Endpoint::Current,
            attempts: 3,
            reason: "upstream returned 503 Service Unavailable".to_string(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Failed to fetch weather data");
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_configuration_error_uses_endpoint_message() {
        let err = WeatherError::Configuration {
            endpoint: Endpoint::Forecast,
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Failed to fetch forecast data");
    }

    #[test]
    fn test_internal_error_message_is_generic() {
        let err = WeatherError::Internal("lock poisoned".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
