use std::sync::OnceLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::SaltString,
};
use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use rand_core::OsRng;
use tracing::info;

use todoism_types::api::{ErrorBody, RegisterRequest, TokenRequest, TokenResponse};
use todoism_types::models::UserResource;

use crate::error::ApiError;
use crate::extract::{ValidatedForm, ValidatedJson};
use crate::schemas::{Links, user_schema};
use crate::state::{AppState, run_blocking};
use crate::version::ApiVersion;

/// Hash a password with Argon2id and a fresh salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Stored hash unreadable: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash checked in place of a missing user's, so an unknown username costs
/// the same Argon2 work as a wrong password.
fn dummy_hash() -> anyhow::Result<&'static str> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash);
    }
    let hash = hash_password("todoism-unknown-user")?;
    Ok(DUMMY.get_or_init(|| hash))
}

/// POST /oauth/token: exchange username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/oauth/token",
    tag = "auth",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Bearer token", body = TokenResponse),
        (status = 400, description = "Bad credentials or unsupported grant type", body = ErrorBody),
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    ValidatedForm(req): ValidatedForm<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(grant_type) = &req.grant_type {
        if !grant_type.eq_ignore_ascii_case("password") {
            return Err(ApiError::UnsupportedGrantType);
        }
    }

    let issued = run_blocking(&state, move |s| {
        let user = s.db.get_user_by_username(&req.username)?;
        let hash = match &user {
            Some(user) => user.password_hash.as_str(),
            None => dummy_hash()?,
        };
        let matches = verify_password(&req.password, hash)?;

        let user = match user {
            Some(user) if matches => user,
            _ => return Err(ApiError::BadCredentials),
        };

        info!("Issued token for user {}", user.id);
        Ok(s.tokens.issue(user.id)?)
    })
    .await?;

    Ok((
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(TokenResponse {
            access_token: issued.token,
            token_type: "Bearer".into(),
            expires_in: issued.expires_in,
        }),
    ))
}

/// POST /register: create an account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResource),
        (status = 400, description = "Invalid username, password or locale", body = ErrorBody),
        (status = 409, description = "Username already taken", body = ErrorBody),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(locale) = &req.locale {
        if !state.config.locales.iter().any(|l| l == locale) {
            return Err(ApiError::Validation(format!(
                "Locale must be one of: {}.",
                state.config.locales.join(", ")
            )));
        }
    }

    let links = Links::new(&state.config.public_url, version);

    let resource = run_blocking(&state, move |s| {
        let password_hash = hash_password(&req.password)?;
        let id = s
            .db
            .create_user(&req.username, &password_hash, req.locale.as_deref())
            .map_err(|e| {
                if todoism_db::is_constraint_violation(&e) {
                    ApiError::Conflict("Username already taken.".into())
                } else {
                    ApiError::Internal(e)
                }
            })?;
        let user = s
            .db
            .get_user_by_id(id)?
            .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user_schema(&links, &user, Default::default()))
    })
    .await?;

    let location = resource.self_url.clone();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(resource),
    ))
}
