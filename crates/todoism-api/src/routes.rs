use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use todoism_db::models::ItemFilter;

use crate::middleware::{cors, preflight, request_id, require_auth};
use crate::state::AppState;
use crate::version::ApiVersion;
use crate::{auth, items, openapi, users};

/// Both API generations, mounted under `/api/v1` and `/api/v2`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(ApiVersion::V1.prefix(), api(ApiVersion::V1, state.clone()))
        .nest(ApiVersion::V2.prefix(), api(ApiVersion::V2, state))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
}

fn api(version: ApiVersion, state: AppState) -> Router {
    let mut public_routes = Router::new()
        .route(version.index_path(), get(users::info))
        .route("/register", post(auth::register))
        .route("/oauth/token", post(auth::issue_token));
    if version == ApiVersion::V2 {
        public_routes = public_routes.route("/openapi.json", get(openapi::document));
    }

    let protected_routes = Router::new()
        .route("/user", get(users::current_user).options(preflight))
        .route(
            version.items_path(ItemFilter::All),
            get(items::list_all).post(items::create_item).options(preflight),
        )
        .route(
            &version.item_route(),
            get(items::get_item)
                .put(items::edit_item)
                .patch(items::toggle_item)
                .delete(items::delete_item)
                .options(preflight),
        )
        .route(
            version.items_path(ItemFilter::Active),
            get(items::list_active).options(preflight),
        )
        .route(
            version.items_path(ItemFilter::Completed),
            get(items::list_completed)
                .delete(items::delete_completed)
                .options(preflight),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public_routes
        .merge(protected_routes)
        .layer(Extension(version))
        .with_state(state)
}
