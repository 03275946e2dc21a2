//! OpenAPI 3 description of API v2, served at `/api/v2/openapi.json`.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi};

use todoism_types::api::{ErrorBody, ItemBodyRequest, RegisterRequest, TokenRequest, TokenResponse};
use todoism_types::models::{ApiInfo, AuthorSummary, ItemCollection, ItemResource, UserResource};

use crate::schemas::Links;
use crate::state::AppState;
use crate::version::ApiVersion;
use crate::{auth, items, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TODOISM API",
        version = "2.0",
        description = "Personal todo lists behind bearer tokens."
    ),
    paths(
        users::info,
        users::current_user,
        auth::issue_token,
        auth::register,
        items::list_all,
        items::create_item,
        items::list_active,
        items::list_completed,
        items::delete_completed,
        items::get_item,
        items::edit_item,
        items::toggle_item,
        items::delete_item,
    ),
    components(schemas(
        ApiInfo,
        UserResource,
        AuthorSummary,
        ItemResource,
        ItemCollection,
        TokenRequest,
        TokenResponse,
        RegisterRequest,
        ItemBodyRequest,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "info", description = "Entry document"),
        (name = "auth", description = "Accounts and tokens"),
        (name = "user", description = "The caller"),
        (name = "items", description = "The caller's todo items"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// GET /openapi.json
pub async fn document(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
) -> impl IntoResponse {
    let links = Links::new(&state.config.public_url, version);
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(links.base())]);
    Json(doc)
}
