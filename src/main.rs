use hbp::{make_router, run_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hbp=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            std::process::exit(1);
        }
    };
    let addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::error!(%error, "invalid listen address");
            std::process::exit(1);
        }
    };

    let router = make_router();
    tracing::info!(%addr, "server started");
    if let Err(error) = run_app(router, addr, &config.database_url).await {
        tracing::error!(%error, "server exited");
    }
}
