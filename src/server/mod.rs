//! HTTP surface.
//!
//! All handlers share one read-only [`AppContext`] built at startup; there
//! is no mutable shared state, so requests never lock.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SamplingConfig;
use crate::engine::NeuralEngine;
use crate::lang::{LanguageDetector, Translator};
use crate::markov::MarkovChain;

pub use handlers::{
    ErrorResponse, GenerateRequest, GenerateResponse, HealthResponse, MarkovResponse,
    TranslateRequest, TranslateResponse, NO_CONTINUATION,
};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything the request handlers read.
#[derive(Debug)]
pub struct AppContext {
    /// Trained or loaded neural engine.
    pub engine: NeuralEngine,
    /// Markov chain over the same corpus.
    pub markov: MarkovChain,
    /// Default length and RNG seeding for requests.
    pub sampling: SamplingConfig,
    /// Upper bound on the requested length.
    pub max_length: usize,
    pub detector: LanguageDetector,
    pub translator: Translator,
}

impl AppContext {
    /// Creates a context with the default language tables.
    pub fn new(
        engine: NeuralEngine,
        markov: MarkovChain,
        sampling: SamplingConfig,
        max_length: usize,
    ) -> Self {
        Self {
            engine,
            markov,
            sampling,
            max_length,
            detector: LanguageDetector::default(),
            translator: Translator::default(),
        }
    }

    /// Requested length, defaulted and capped.
    pub fn clamp_length(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.sampling.max_tokens)
            .min(self.max_length)
    }
}

/// Create the application router with all routes and middleware.
pub fn create_app(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handlers::frontend))
        .route("/frontend.html", get(handlers::frontend))
        .route("/health", get(handlers::health))
        .route("/generate", post(handlers::generate))
        .route("/markov", post(handlers::markov))
        .route("/translate", post(handlers::translate))
        .fallback(handlers::not_found)
        .with_state(context)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `config.addr()` and serves until a shutdown signal arrives.
pub async fn serve(config: &ServerConfig, context: Arc<AppContext>) -> std::io::Result<()> {
    let addr = config.addr();
    let app = create_app(context);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
