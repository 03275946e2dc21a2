use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use todoism_types::api::ErrorBody;

use crate::token::TokenError;

/// Every failure a handler or the auth gate can report to a client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Either the username or password was invalid.")]
    BadCredentials,

    #[error("The grant type must be password.")]
    UnsupportedGrantType,

    #[error("Token missing.")]
    MissingToken,

    #[error("The token type must be bearer.")]
    BadTokenType,

    #[error("Invalid or expired token.")]
    InvalidToken,

    #[error("You are not allowed to access this resource.")]
    Forbidden,

    #[error("The requested resource was not found.")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadCredentials
            | Self::UnsupportedGrantType
            | Self::MissingToken
            | Self::BadTokenType
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadCredentials => "bad_credentials",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::MissingToken => "missing_token",
            Self::BadTokenType => "bad_token_type",
            Self::InvalidToken => "invalid_token",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        debug!(reason = %e, "Rejecting bearer token");
        Self::InvalidToken
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!("Internal error: {:?}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.code().to_string(),
            message,
            status: status.as_u16(),
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::InvalidToken) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
