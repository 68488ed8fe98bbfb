use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use thiserror::Error;
use crate::types::error::PortfolioError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Portfolio(PortfolioError::CredentialMissing) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Portfolio(PortfolioError::NetworkOrAuth(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Portfolio(PortfolioError::MalformedResponse(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Portfolio(PortfolioError::InvalidAddress(_)) => StatusCode::BAD_REQUEST,
            ApiError::Portfolio(PortfolioError::EmptyPortfolio) => StatusCode::NOT_FOUND,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
