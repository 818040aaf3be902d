//! HTTP surface built on axum.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use error::{ApiError, ImageFailure};
pub use router::build_router;
pub use state::AppState;
