//! Dealership API server.
//!
//! Run from the repo root: `cargo run -p dealership-server`

use dealership::{
    app, apply_migrations, connect, ensure_database_exists, load_from_env, AppState, S3Store, SupabaseAuth,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dealership=info,tower_http=info")),
        )
        .init();

    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings).await?;
    apply_migrations(&pool).await?;

    let auth = Arc::new(SupabaseAuth::new(&settings.auth));
    let storage = Arc::new(S3Store::new(&settings.storage));
    let bind_addr = settings.bind_addr;
    let body_limit = settings.max_upload_bytes;
    let state = AppState::new(pool, settings, auth, storage);

    let router = app(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http());
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("dealership API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
