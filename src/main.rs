mod auth;
mod config;
mod db;
mod docs;
mod handlers;
mod live;
mod models;
mod routes;
mod services;
mod state;

use axum::{http::HeaderValue, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use routes::create_api_routes;
use docs::ApiDoc;
use config::Config;
use db::{ClassroomStore, DbClassroom, MemoryStore};
use state::AppState;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use std::panic;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "classroom_diff=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    if config.auth_jwt_secret.is_none() {
        warn!("No JWT secret configured - authenticated routes will fail");
    }

    // Initialize the store
    let store = open_store(&config).await;

    let address = config.server_address();
    let cors = cors_layer(config.cors_origins.as_deref());
    let state = AppState::new(config, store);

    // Create API routes
    let api_routes = create_api_routes(state);

    // Combine all routes
    let app_routes = Router::new()
        // Mount API routes
        .nest("/api", api_routes)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Add tracing layer
        .layer(TraceLayer::new_for_http());

    // Start the HTTP/API server
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", address));

    info!("🚀 Server running on http://{}", address);
    info!("📚 Swagger UI available at http://{}/swagger", address);

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}

/// Postgres when configured and reachable, otherwise the in-memory store
async fn open_store(config: &Config) -> Arc<dyn ClassroomStore> {
    let Some(db_url) = &config.db_url else {
        warn!("No database URL configured - data is kept in memory only");
        return Arc::new(MemoryStore::new());
    };

    match DbClassroom::new(db_url).await {
        Ok(db) => match db.init_schema().await {
            Ok(()) => {
                info!("Database initialized successfully");
                Arc::new(db)
            }
            Err(e) => {
                error!("Failed to initialize database schema: {}", e);
                warn!("Falling back to the in-memory store");
                Arc::new(MemoryStore::new())
            }
        },
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            warn!("Falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins.map(str::trim) {
        None | Some("") | Some("*") => CorsLayer::permissive(),
        Some(list) => {
            let origins: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}
