//! HTTP API layer for notifyd.
//!
//! REST endpoints over the dispatch, notification, preference and inbox
//! services, built on Axum with a Tower middleware stack.

pub mod endpoints;
pub mod response;
pub mod state;

pub use endpoints::router;
pub use state::AppState;
