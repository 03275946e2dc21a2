use axum::{Extension, Json, extract::State, response::IntoResponse};

use todoism_types::api::ErrorBody;
use todoism_types::models::{ApiInfo, UserResource};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::schemas::{Links, api_info, user_schema};
use crate::state::{AppState, run_blocking};
use crate::version::ApiVersion;

/// GET the public entry document of an API generation.
#[utoipa::path(
    get,
    path = "/info",
    tag = "info",
    responses((status = 200, description = "URLs of this API generation", body = ApiInfo))
)]
pub async fn info(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
) -> impl IntoResponse {
    let links = Links::new(&state.config.public_url, version);
    Json(api_info(&links, version))
}

/// GET /user: profile of the caller with live item counts.
#[utoipa::path(
    get,
    path = "/user",
    tag = "user",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's profile", body = UserResource),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let links = Links::new(&state.config.public_url, version);

    let resource = run_blocking(&state, move |s| {
        let user = s.db.get_user_by_id(caller.id)?.ok_or(ApiError::InvalidToken)?;
        let counts = s.db.item_counts(user.id)?;
        Ok(user_schema(&links, &user, counts))
    })
    .await?;

    Ok(Json(resource))
}
