//! Core business logic for notifyd.

pub mod routing;
pub mod services;

pub use services::*;
