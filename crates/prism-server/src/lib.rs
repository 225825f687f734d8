//! HTTP server assembly
//!
//! Builds the gateway router from configuration and layers the shared
//! middleware: request context, tracing, and caller identity.

mod auth;
mod health;
pub mod identity;
mod request_context;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use prism_config::Config;
use prism_llm::{GatewayState, ProviderRegistry};
use prism_tools::{HttpToolDirectory, ToolDirectory};
use tower_http::trace::TraceLayer;

pub use identity::IdentityResolver;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Builds the server from configuration.
    ///
    /// # Errors
    ///
    /// Fails when provider registry or identity resolver construction
    /// fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let registry = ProviderRegistry::from_config(&config.llm)?;

        let directory: Option<Arc<dyn ToolDirectory>> = if config.tools.directory_url.is_some() {
            Some(Arc::new(HttpToolDirectory::from_config(&config.tools)?))
        } else {
            None
        };

        let state = GatewayState::new(registry, directory)
            .with_tool_icon_base(config.tools.directory_url.clone());

        let mut app = Router::new();

        if config.server.health_enabled {
            app = app.route(&config.server.health_path, axum::routing::get(health::health_handler));
        }

        app = app.merge(prism_llm::llm_router(state));

        // Middleware layers, innermost first

        // Request context runs just before the handlers
        app = app.layer(axum::middleware::from_fn(request_context::request_context_middleware));

        app = app.layer(TraceLayer::new_for_http());

        if let Some(identity_config) = &config.identity
            && identity_config.enabled
        {
            let resolver = IdentityResolver::from_config(identity_config)?;
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let resolver = resolver.clone();
                async move { auth::identity_middleware(resolver, req, next).await }
            }));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consumes the server and returns the inner router.
    ///
    /// Useful in tests where the caller manages the listener.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serves requests until the cancellation token fires.
    ///
    /// # Errors
    ///
    /// Fails when binding the listener or serving fails.
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn health_route_responds() {
        let server = Server::new(&Config::default()).unwrap();
        let response = server
            .into_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
