use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::render::RenderError;

#[derive(Debug)]
pub enum AppError {
    NotFoundError(String),
    Template(RenderError),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFoundError(path) => {
                tracing::info!("Client error: {} not found", path);
                (StatusCode::NOT_FOUND, "Not Found")
            }
            AppError::Template(err) => {
                tracing::error!("Error rendering template: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            AppError::Anyhow(err) => {
                // {:?} prints the whole cause chain, plus a backtrace when enabled
                tracing::error!("Internal Server Error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (status, error_message).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
