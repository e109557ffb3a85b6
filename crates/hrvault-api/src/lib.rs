//! HR Vault API Library
//!
//! HTTP handlers, extractors and application setup for the document storage
//! service.

mod api_doc;
mod handlers;
mod telemetry;

pub mod error;
pub mod extract;
pub mod response;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use setup::routes::api_router;
pub use state::AppState;
