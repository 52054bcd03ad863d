// Module declarations
mod api_key_ops;
mod connection;
mod model_ops;
mod request_log_ops;
#[cfg(test)]
mod tests;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};
