//! Hypermedia representations returned by both API generations.
//! Every URL field is absolute.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResource {
    pub id: i64,
    #[serde(rename = "self")]
    pub self_url: String,
    pub kind: String,
    pub username: String,
    pub all_items_url: String,
    pub active_items_url: String,
    pub completed_items_url: String,
    pub all_items_count: i64,
    pub active_items_count: i64,
    pub completed_items_count: i64,
}

/// Short form of the author embedded in every item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorSummary {
    pub id: i64,
    pub url: String,
    pub username: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemResource {
    pub id: i64,
    #[serde(rename = "self")]
    pub self_url: String,
    #[schema(example = "Item")]
    pub kind: String,
    pub body: String,
    pub done: bool,
    pub author: AuthorSummary,
}

/// Pagination envelope. `prev` and `next` serialize as `null` when the
/// page has no neighbour on that side.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemCollection {
    #[serde(rename = "self")]
    pub self_url: String,
    pub kind: String,
    pub items: Vec<ItemResource>,
    pub first: String,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: String,
    pub count: i64,
}

/// Entry point document listing the URLs of an API generation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiInfo {
    pub api_version: String,
    pub api_base_url: String,
    pub current_user_url: String,
    pub authentication_url: String,
    pub item_url: String,
    pub current_user_items_url: String,
    pub current_user_active_items_url: String,
    pub current_user_completed_items_url: String,
}
