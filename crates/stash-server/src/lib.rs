//! # Stash Server
//!
//! Thin HTTP wiring around [`stash_gateway`]: routes inbound requests to
//! gateway operations and serializes their results. All real decisions live
//! in the gateway crate; this layer is glue.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::run_server;
pub use state::AppState;
