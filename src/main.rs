mod app;
mod config;
mod error;
mod state;
mod students;

const DEFAULT_LOG_FILTER: &str = "estudiantes=debug,axum=info,tower_http=info";

/// `RUST_LOG` picks the filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => subscriber.with_target(false).json().init(),
        _ => subscriber.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let (app_state, pool) = state::AppState::init().await?;

    if let Some(pool) = &pool {
        sqlx::migrate!("./migrations").run(pool).await?;
        tracing::info!("migrations applied");
    }

    tracing::info!(list_profile = ?app_state.config.list_profile, "starting estudiantes api");
    let server = app_state.config.server.clone();
    app::serve(app::build_app(app_state), &server).await
}
