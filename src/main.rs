use restshop::{apply_migrations, build_app, ensure_database_exists, AppState, MediaUrl, PgStore, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("restshop=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool, &settings.schema).await?;

    let store = PgStore::new(pool, settings.schema.clone());
    let state = AppState::new(Arc::new(store), MediaUrl::new(settings.media_url.clone()));
    let app = build_app(state, &settings)?;

    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!("restshop listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
