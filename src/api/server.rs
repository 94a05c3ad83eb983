use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::core::{AppConfig, db::async_db, db::initialize_db};

const DEVELOPMENT_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:4173"];

fn development_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(DEVELOPMENT_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true)
}

pub fn app(shared_state: SharedState) -> Router {
    let development = shared_state.config.environment.is_development();

    let router = routes::router().layer(TraceLayer::new_for_http());
    let router = if development {
        router.layer(development_cors())
    } else {
        router
    };

    router.with_state(Arc::clone(&shared_state))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    init_tracing();

    let db = async_db(&config.database_url).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .context("Failed to initialize database schema")?;
    tracing::info!("Connected to database");

    if config.environment.is_development() {
        tracing::info!("Running in development mode");
    } else {
        tracing::info!("Running in production mode");
        tracing::info!("Using Kratos public at: {}", config.kratos_public_url);
        tracing::info!("Using Kratos admin at: {}", config.kratos_admin_url);
    }

    let app_state = AppState::from_config(db, config)?;
    let app = app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::info!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
