use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use udx3::{
    AppState, DatabaseProvider, Udx3ConfigManager,
    api::routes::app,
    cli::{Cli, Commands, init, show_config},
    db::seed_sample_data,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = cli.output();

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let result = init::run(
                init::InitConfig {
                    path,
                    force,
                    host,
                    port,
                },
                &output,
            );
            return match result {
                init::InitResult::Error(e) => Err(anyhow::anyhow!(e)),
                _ => Ok(()),
            };
        }
        Some(Commands::Config { full, validate }) => {
            if !show_config(&cli.config, full, validate, &output) {
                std::process::exit(1);
            }
            return Ok(());
        }
        None => {}
    }

    let config_manager = Arc::new(
        Udx3ConfigManager::load_or_default(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config.display()))?,
    );
    let config = config_manager.config();

    logging::init(&config.server, cli.verbose);

    if config_manager.config_path().exists() {
        info!("Loaded configuration from {}", cli.config.display());
    } else {
        warn!(
            "Configuration file {} not found; using built-in defaults",
            cli.config.display()
        );
    }

    for warning in config.validate_with_warnings()? {
        warn!(kind = %warning.kind, "{}", warning.message);
    }

    let provider = DatabaseProvider::from_config(&config.database);
    let store: Arc<dyn udx3::DashboardStore> = provider
        .create_store()
        .await
        .with_context(|| format!("Failed to open {} store", provider.name()))?
        .into();
    info!(backend = provider.name(), "Dashboard store ready");

    if config.database.seed_sample_data {
        seed_sample_data(store.as_ref()).await?;
    }

    if cli.config.exists()
        && let Err(e) = config_manager.start_watching()
    {
        warn!("Config hot-reload disabled: {}", e);
    }

    let state = AppState::new(Arc::clone(&config_manager), store)?;
    let router = app(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("UDX3 server listening on http://{}", addr);
    info!("Chat endpoint: POST http://{}/api/chat", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    config_manager.stop_watching();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
