//! Web layer for the trip routing server.
//!
//! JSON endpoints for trip routing, path geometry and the transit-only
//! operations. Answers use the `{"ok": ...} | {"error": ...}` envelope.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
