//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::core::gateway::Gateway;
use crate::server::middleware::RequestIdMiddleware;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_cors::Cors;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
    /// Background housekeeping, stopped with the server
    maintenance: Option<JoinHandle<()>>,
}

impl HttpServer {
    /// Create a new HTTP server around an assembled gateway
    pub fn new(config: Config, gateway: Arc<Gateway>) -> Self {
        Self {
            config: config.gateway.server.clone(),
            state: AppState::new(config, gateway),
            maintenance: None,
        }
    }

    /// Attach the maintenance task so it stops when the server does
    pub fn with_maintenance(mut self, handle: JoinHandle<()>) -> Self {
        self.maintenance = Some(handle);
        self
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let cors = Self::cors(&state.config.gateway.server);

        App::new()
            .app_data(state)
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %Dms request_id=%{x-request-id}o"#,
            ))
            .wrap(cors)
            .wrap(DefaultHeaders::new().add(("Server", "odoo-gateway")))
            .configure(routes::configure_routes)
    }

    /// Any origin when none are configured, otherwise exactly the listed ones
    fn cors(config: &ServerConfig) -> Cors {
        let cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .expose_headers(["x-request-id", "retry-after"])
            .max_age(3600usize);

        if config.cors_origins.is_empty() {
            return cors.allow_any_origin();
        }
        config
            .cors_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }

    /// Start the HTTP server and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let port = self.config.port;

        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let mut server = ActixHttpServer::new(move || Self::create_app(state.clone()));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr, port))?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        let result = server.await;

        if let Some(maintenance) = self.maintenance {
            maintenance.abort();
        }
        if let Err(e) = &result {
            warn!("HTTP server exited with error: {}", e);
        }
        result?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
