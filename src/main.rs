use loopmeet::api::handlers::api_routes;
use loopmeet::api::openapi::ApiDoc;
use loopmeet::config::CONFIG;
use loopmeet::core::password_policy::PasswordPolicy;
use loopmeet::{InMemoryCache, InMemoryStorage, LoopMeetService, SupabaseIdentityProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter(CONFIG.log_level.as_str()).init();

    // Wire the in-memory infrastructure behind the service seams
    let storage = InMemoryStorage::new();
    let cache = InMemoryCache::new();
    let identity = SupabaseIdentityProvider::from_config();
    let service = Arc::new(LoopMeetService::new(
        storage,
        cache,
        identity,
        CONFIG.jwt_secret.clone(),
        PasswordPolicy::from_config(&CONFIG),
    ));

    let app = api_routes(service)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::PATCH])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
