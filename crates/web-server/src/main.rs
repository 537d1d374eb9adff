use tracing_subscriber::EnvFilter;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads settings, sets up console logging and serves the API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = configuration::load_settings(None)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    web_server::run_server(settings).await
}
