use clap::Parser;
use configuration::cli::ConfigArgs;
use configuration::load_config;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the students API service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.resolve()?;
    let config = load_config(&config_path)?;
    tracing::info!(env = %config.env, path = %config_path.display(), "configuration loaded");

    if let Err(e) = web_server::run_server(&config).await {
        tracing::error!(error = %e, "server failed");
        return Err(e);
    }
    Ok(())
}

/// HTTP service for creating, reading, updating and deleting student records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}
