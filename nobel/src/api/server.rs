use crate::config::{CorsConfig, ServerConfig};
use crate::error::{Error, Result};
use crate::gateway::SearchGateway;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn SearchGateway>,
}

pub struct ApiServer {
    gateway: Arc<dyn SearchGateway>,
    config: ServerConfig,
    extra_routes: Option<Router>,
}

impl ApiServer {
    pub fn new(gateway: Arc<dyn SearchGateway>) -> Self {
        Self::with_config(gateway, ServerConfig::default())
    }

    pub fn with_config(gateway: Arc<dyn SearchGateway>, config: ServerConfig) -> Self {
        Self {
            gateway,
            config,
            extra_routes: None,
        }
    }

    /// Merge additional routes (e.g. `/metrics`) into the served router
    pub fn with_routes(mut self, routes: Router) -> Self {
        self.extra_routes = Some(match self.extra_routes.take() {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Build CORS layer from configuration
    fn build_cors_layer(cors_config: &CorsConfig) -> CorsLayer {
        if !cors_config.enabled {
            return CorsLayer::new();
        }

        let origins: Vec<HeaderValue> = cors_config
            .origins
            .iter()
            .filter(|o| *o != "*")
            .filter_map(|o| o.parse().ok())
            .collect();

        let has_wildcard = cors_config.origins.iter().any(|o| o == "*");

        let cors = if has_wildcard {
            CorsLayer::new().allow_origin(tower_http::cors::Any)
        } else if origins.is_empty() {
            CorsLayer::new()
        } else {
            CorsLayer::new().allow_origin(origins)
        };

        cors.allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers(tower_http::cors::Any)
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            gateway: self.gateway.clone(),
        };

        let mut router = Router::new()
            .route("/", get(routes::root))
            .route("/health", get(routes::health))
            .route("/prize", post(routes::create_prize))
            .route("/prize/bulk", post(routes::bulk_prizes))
            .route("/prize/:year/:category", put(routes::update_prize))
            .route("/search", get(routes::search))
            .with_state(state);

        if let Some(extra) = &self.extra_routes {
            router = router.merge(extra.clone());
        }

        router
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(Self::build_cors_layer(&self.config.cors))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, self.router())
            .await
            .map_err(Error::Io)?;

        Ok(())
    }
}
