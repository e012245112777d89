//! Web layer for the transit finder.
//!
//! Provides JSON endpoints for nearby stops, fares, route search and the
//! contact form, behind a per-client rate limit.

mod dto;
mod extract;
mod middleware;
mod routes;
mod state;

pub use dto::*;
pub use extract::{Path, Query};
pub use routes::{AppError, create_router};
pub use state::AppState;
