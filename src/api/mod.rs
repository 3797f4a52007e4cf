//! Web API module for Strata
//!
//! Provides endpoints for:
//! - Health and component listing
//! - Batch and streamed chat
//! - Tool listing
//! - Configuration view
//!
//! Handlers read shared components from `Extension` layers added in
//! `server::init::build_router`.

pub mod chat;
pub mod config;
pub mod health;
pub mod tools;

use axum::Router;

pub use chat::chat_routes;
pub use config::{config_routes, AppConfigView};
pub use health::health_routes;
pub use tools::tools_routes;

/// Create the router with every endpoint
pub fn api_router() -> Router {
    Router::new()
        .merge(health_routes())
        .merge(chat_routes())
        .merge(tools_routes())
        .merge(config_routes())
}
