use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tributary::app::AppContext;
use tributary::cli::{commands, Cli, Commands};
use tributary::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Run { overrides } => {
            commands::apply_overrides(&mut config, overrides);
            let ctx = AppContext::new(config)?;
            commands::run(&ctx).await?;
        }
        Commands::Topics { topics } => {
            let path = topics.unwrap_or_else(|| config.topics_path.clone());
            commands::list_topics(&path)?;
        }
        Commands::Probe { title } => {
            commands::probe(&config, &title)?;
        }
    }

    Ok(())
}
