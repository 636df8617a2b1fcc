use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::claims::{
    ChecklistImportError, ClaimServiceError, ConfigurationError, EstimateError, SettlementError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Pricing(ConfigurationError),
    Checklist(ChecklistImportError),
    Estimate(EstimateError),
    Settlement(SettlementError),
    Claims(ClaimServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Pricing(err) => write!(f, "pricing configuration error: {}", err),
            AppError::Checklist(err) => write!(f, "checklist import error: {}", err),
            AppError::Estimate(err) => write!(f, "estimate error: {}", err),
            AppError::Settlement(err) => write!(f, "settlement error: {}", err),
            AppError::Claims(err) => write!(f, "claim error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Pricing(err) => Some(err),
            AppError::Checklist(err) => Some(err),
            AppError::Estimate(err) => Some(err),
            AppError::Settlement(err) => Some(err),
            AppError::Claims(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Checklist(_) => StatusCode::BAD_REQUEST,
            AppError::Estimate(_) | AppError::Settlement(_) | AppError::Pricing(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Claims(_) | AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(value: ConfigurationError) -> Self {
        Self::Pricing(value)
    }
}

impl From<ChecklistImportError> for AppError {
    fn from(value: ChecklistImportError) -> Self {
        Self::Checklist(value)
    }
}

impl From<EstimateError> for AppError {
    fn from(value: EstimateError) -> Self {
        Self::Estimate(value)
    }
}

impl From<SettlementError> for AppError {
    fn from(value: SettlementError) -> Self {
        Self::Settlement(value)
    }
}

impl From<ClaimServiceError> for AppError {
    fn from(value: ClaimServiceError) -> Self {
        Self::Claims(value)
    }
}
