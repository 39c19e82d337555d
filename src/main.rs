use bazaar_admin_api::{app, config, db, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_admin_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Bazaar Admin API in {:?} mode", config.environment);

    let pool = match db::connect().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("failed to connect database: {}", e);
            std::process::exit(1);
        }
    };

    let app = app::app(AppState::new(pool));

    // Allow tests or deployments to override port via env
    let port = std::env::var("ADMIN_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Bazaar Admin API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
