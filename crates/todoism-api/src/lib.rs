pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod items;
pub mod middleware;
pub mod openapi;
pub mod ownership;
pub mod pagination;
pub mod routes;
pub mod schemas;
pub mod state;
pub mod token;
pub mod users;
pub mod version;

pub use routes::router;
pub use state::{AppState, AppStateInner};
