//! # Meteion API
//!
//! Local HTTP control server. Each exchange names an action in the path and
//! carries its payload in the body (or the `payload` query parameter); the
//! response body is whatever the action returns.
//!
//! ```text
//! POST /{action}            body = payload
//! GET  /{action}?payload=   payload in the query string
//! GET  /  and  GET /health  JSON status document
//! ```

pub mod error;
mod listener;
pub mod routes;
pub mod server;

pub use error::ServerError;
pub use routes::{create_router, HealthDocument, RouterState};
pub use server::{ControlConfig, ControlServer, ExceptionCallback, ServerState};
