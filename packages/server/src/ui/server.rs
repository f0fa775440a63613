//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::ServerConfig,
    usecase::{Broadcaster, StreamConnectionUseCase, SubmitMessageUseCase},
};

use super::{
    error::ServerError,
    handler::{debug_state, health_check, ignore_method, stream_timeline, submit_message},
    signal::shutdown_signal,
    state::AppState,
};

/// Streaming chat server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     config,
///     submit_message_usecase,
///     stream_connection_usecase,
///     broadcaster,
/// );
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address, static directory and limits
    /// * `submit_message_usecase` - UseCase for admitting posts
    /// * `stream_connection_usecase` - UseCase for the long-lived responses
    /// * `broadcaster` - Shared broadcaster (closed on shutdown)
    pub fn new(
        config: ServerConfig,
        submit_message_usecase: Arc<SubmitMessageUseCase>,
        stream_connection_usecase: Arc<StreamConnectionUseCase>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        let state = Arc::new(AppState {
            submit_message_usecase,
            stream_connection_usecase,
            broadcaster,
        });
        Self { config, state }
    }

    /// Build the router: `/` is method-dispatched between streaming and posting
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(stream_timeline)
                    .post(submit_message)
                    .fallback(ignore_method),
            )
            .route("/api/health", get(health_check))
            .route("/debug/state", get(debug_state))
            .nest_service("/static", ServeDir::new(&self.config.static_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to the configured address and serve until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), ServerError> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Open: http://{}/", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// On shutdown the registry is closed so every open stream finishes,
    /// which lets the graceful shutdown complete.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let registry = self.state.broadcaster.registry().clone();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                registry.close_all();
            })
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
