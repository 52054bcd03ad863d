//! HTTP surface
//!
//! REST routes over the gateway: key management, model browsing and record
//! CRUD, tool calls, audit log queries and health.

pub mod middleware;
pub mod routes;

pub mod builder;
pub mod server;
pub mod state;
mod utils;


pub use builder::{ServerBuilder, run_server};
pub use server::HttpServer;
pub use state::AppState;
