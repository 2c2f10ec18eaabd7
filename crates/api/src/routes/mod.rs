//! Route definitions. Each submodule exposes a `router()`; the
//! management tree is assembled by [`api_routes`].

pub mod devices;
pub mod gallery;
pub mod health;
pub mod image;
pub mod settings;
pub mod tokens;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree (management surface).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(devices::router())
        .merge(gallery::router())
        .merge(tokens::router())
        .merge(settings::router())
}
