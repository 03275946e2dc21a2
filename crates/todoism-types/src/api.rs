use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// -- Token claims --

/// Claims carried by a bearer token. `id` is the user's primary key;
/// `iat`/`exp` are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub iat: i64,
    pub exp: i64,
}

// -- Auth --

/// Form body of `POST /oauth/token`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[schema(example = "password")]
    pub grant_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub locale: Option<String>,
}

// -- Items --

/// JSON body for creating or editing an item.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ItemBodyRequest {
    pub body: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub status: u16,
}
