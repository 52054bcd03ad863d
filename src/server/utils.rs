//! HTTP server utility methods

use crate::server::server::HttpServer;
use crate::utils::error::GatewayError;
use std::io;

impl HttpServer {
    /// Turn a bind failure into an actionable startup error
    pub(crate) fn format_bind_error(error: io::Error, bind_addr: &str, port: u16) -> GatewayError {
        let error_str = error.to_string();

        let message = if error.kind() == io::ErrorKind::AddrInUse
            || error_str.contains("os error 48")
            || error_str.contains("os error 98")
        {
            format!(
                "Port {} is already in use; stop the other process or set GATEWAY_PORT={}",
                port,
                port.saturating_add(1)
            )
        } else if error.kind() == io::ErrorKind::PermissionDenied
            || error_str.contains("os error 13")
        {
            format!(
                "Permission denied for port {}; use a port >= 1024 such as GATEWAY_PORT=3000",
                port
            )
        } else {
            format!("Failed to bind to {}: {}", bind_addr, error)
        };

        GatewayError::Io(io::Error::new(error.kind(), message))
    }
}
