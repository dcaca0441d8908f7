//! Axum HTTP server: the tool page, the JSON API, routing and middleware.

pub mod handlers;
pub mod middleware;
pub mod page;
pub mod router;
pub mod state;
