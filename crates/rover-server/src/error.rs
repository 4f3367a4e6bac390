//! Error types for the Rover API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can
//! be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! status taxonomy is deliberately small: bad request (malformed or
//! out-of-range configuration), not found (missing map), conflict
//! (session preconditions), internal (everything else).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use rover_session::{ConfigError, ControlError, LaunchError};
use rover_sim::SimError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Configuration loading, validation, or scenario persistence failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A state-machine or registry precondition was violated.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// A map, engine, or renderer operation failed.
    #[error(transparent)]
    Sim(#[from] SimError),
}

impl From<LaunchError> for ApiError {
    fn from(err: LaunchError) -> Self {
        match err {
            LaunchError::Control(e) => Self::Control(e),
            LaunchError::Sim(e) => Self::Sim(e),
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    fn status(&self) -> StatusCode {
        match self {
            // Scenario persistence failures are server-side; every
            // other config error is the caller's request.
            Self::Config(ConfigError::Io { .. } | ConfigError::Yaml { .. })
            | Self::Sim(
                SimError::MapIo { .. }
                | SimError::InvalidStepTime { .. }
                | SimError::NumericDivergence { .. }
                | SimError::FrameEncode { .. },
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_)
            | Self::Sim(
                SimError::InvalidMapName { .. }
                | SimError::MapDecode { .. }
                | SimError::MapDimensionMismatch { .. },
            ) => StatusCode::BAD_REQUEST,
            Self::Sim(SimError::MapNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Control(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_errors_are_conflicts() {
        assert_eq!(
            ApiError::Control(ControlError::AlreadyRunning).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Control(ControlError::NoActiveSession).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = ApiError::Config(ConfigError::RobotCountOutOfRange {
            requested: 0,
            max: 10,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_map_is_not_found() {
        let err = ApiError::Sim(SimError::MapNotFound {
            name: String::from("x.png"),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
