use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::info;

use todoism_db::models::{ItemFilter, ItemRow};
use todoism_types::api::{ErrorBody, ItemBodyRequest};
use todoism_types::models::{ItemCollection, ItemResource};

use crate::error::ApiError;
use crate::extract::{PageQuery, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::ownership::authorize;
use crate::schemas::{Links, item_schema, items_schema};
use crate::state::{AppState, AppStateInner, run_blocking};
use crate::version::ApiVersion;

/// Load an item and make sure the caller wrote it. Unknown ids are 404
/// before ownership is looked at.
fn owned_item(s: &AppStateInner, caller: &CurrentUser, raw_id: &str) -> Result<ItemRow, ApiError> {
    let id: i64 = raw_id.parse().map_err(|_| ApiError::NotFound)?;
    let item = s.db.get_item(id)?.ok_or(ApiError::NotFound)?;
    authorize(caller, &item)?;
    Ok(item)
}

async fn list(
    state: AppState,
    version: ApiVersion,
    caller: CurrentUser,
    query: PageQuery,
    filter: ItemFilter,
) -> Result<impl IntoResponse, ApiError> {
    let links = Links::new(&state.config.public_url, version);
    let page = query.page();

    let collection = run_blocking(&state, move |s| {
        let page = s.paginator.items(&s.db, caller.id, filter, page)?;
        Ok(items_schema(&links, filter, &page))
    })
    .await?;

    Ok(Json(collection))
}

/// GET items: every item of the caller.
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One page of the caller's items", body = ItemCollection),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 404, description = "Page out of range", body = ErrorBody),
    )
)]
pub async fn list_all(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Extension(caller): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list(state, version, caller, query, ItemFilter::All).await
}

/// GET items/active
#[utoipa::path(
    get,
    path = "/items/active",
    tag = "items",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One page of the caller's unfinished items", body = ItemCollection),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 404, description = "Page out of range", body = ErrorBody),
    )
)]
pub async fn list_active(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Extension(caller): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list(state, version, caller, query, ItemFilter::Active).await
}

/// GET items/completed
#[utoipa::path(
    get,
    path = "/items/completed",
    tag = "items",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One page of the caller's finished items", body = ItemCollection),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 404, description = "Page out of range", body = ErrorBody),
    )
)]
pub async fn list_completed(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Extension(caller): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list(state, version, caller, query, ItemFilter::Completed).await
}

/// POST items: returns 201 with the new item and its `Location`.
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = ItemBodyRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Item created", body = ItemResource),
        (status = 400, description = "Missing or blank body", body = ErrorBody),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Extension(caller): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<ItemBodyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let links = Links::new(&state.config.public_url, version);

    let resource = run_blocking(&state, move |s| {
        let item = s.db.create_item(caller.id, &req.body)?;
        info!("User {} created item {}", caller.id, item.id);
        Ok(item_schema(&links, &item))
    })
    .await?;

    let location = resource.self_url.clone();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(resource),
    ))
}

#[utoipa::path(
    get,
    path = "/item/{item_id}",
    tag = "items",
    params(("item_id" = i64, Path, description = "Item id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The item", body = ItemResource),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 403, description = "Item belongs to another user", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Extension(caller): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let links = Links::new(&state.config.public_url, version);

    let resource = run_blocking(&state, move |s| {
        let item = owned_item(s, &caller, &item_id)?;
        Ok(item_schema(&links, &item))
    })
    .await?;

    Ok(Json(resource))
}

/// PUT item: replace the body. A bad body is only reported to the author;
/// anyone else gets the same 404 or 403 as for a valid one.
#[utoipa::path(
    put,
    path = "/item/{item_id}",
    tag = "items",
    params(("item_id" = i64, Path, description = "Item id")),
    security(("bearer" = [])),
    request_body = ItemBodyRequest,
    responses(
        (status = 204, description = "Body replaced"),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 403, description = "Item belongs to another user", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
    )
)]
pub async fn edit_item(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(item_id): Path<String>,
    payload: Result<ValidatedJson<ItemBodyRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    run_blocking(&state, move |s| {
        let item = owned_item(s, &caller, &item_id)?;
        let ValidatedJson(req) = payload?;
        if !s.db.update_item_body(item.id, &req.body)? {
            return Err(ApiError::NotFound);
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH item: flip `done`.
#[utoipa::path(
    patch,
    path = "/item/{item_id}",
    tag = "items",
    params(("item_id" = i64, Path, description = "Item id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Done flag flipped"),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 403, description = "Item belongs to another user", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
    )
)]
pub async fn toggle_item(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    run_blocking(&state, move |s| {
        let item = owned_item(s, &caller, &item_id)?;
        s.db.toggle_item(item.id)?.ok_or(ApiError::NotFound)?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/item/{item_id}",
    tag = "items",
    params(("item_id" = i64, Path, description = "Item id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 403, description = "Item belongs to another user", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    run_blocking(&state, move |s| {
        let item = owned_item(s, &caller, &item_id)?;
        s.db.delete_item(item.id)?;
        info!("User {} deleted item {}", caller.id, item.id);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE items/completed: clear every done item of the caller.
#[utoipa::path(
    delete,
    path = "/items/completed",
    tag = "items",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Every finished item of the caller deleted"),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
    )
)]
pub async fn delete_completed(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    let author_id = caller.id;
    let deleted =
        run_blocking(&state, move |s| Ok(s.db.delete_completed_items(author_id)?)).await?;
    info!("User {} cleared {} completed items", author_id, deleted);

    Ok(StatusCode::NO_CONTENT)
}
