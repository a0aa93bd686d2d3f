use crate::{
    db,
    pipeline::{PipelineError, ValidationError},
    render::RenderError,
    utils::ConfigError,
};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use log::error;
use serde_json::json;
use tokio::task::JoinError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Failed to render view: {0}")]
    Render(#[from] RenderError),
    #[error("Pipeline worker stopped: {0}")]
    Worker(#[from] JoinError),
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::Pipeline(PipelineError::Validation(value))
    }
}

impl From<db::Error> for AppError {
    fn from(value: db::Error) -> Self {
        AppError::Pipeline(PipelineError::Warehouse(value))
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Pipeline(PipelineError::Warehouse(e)) if e.is_connection() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Pipeline(PipelineError::Validation(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Heading of the error box on a page
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "Configuration error",
            AppError::Pipeline(PipelineError::Warehouse(e)) if e.is_connection() => {
                "Weather warehouse unavailable"
            }
            AppError::Pipeline(PipelineError::Warehouse(_)) => "Query failed",
            AppError::Pipeline(PipelineError::Validation(_)) => "Invalid selection",
            AppError::Pipeline(PipelineError::Join(_)) => "Stations without location data",
            AppError::Render(RenderError::Geometry(_)) => "County boundaries unavailable",
            AppError::Render(_) | AppError::Worker(_) => "Something went wrong",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("error handling request: {}", self);

        let body = Json(json!({
            "error": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}
