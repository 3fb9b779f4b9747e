//! BMO backend CLI and REST API entry point.
//!
//! Binary name: `bmo`
//!
//! Parses CLI arguments, loads settings, wires the conversation services,
//! then either starts the REST API server or runs a one-off command.

mod cli;
mod http;
mod state;

use clap::Parser;

use bmo_infra::config::load_settings;
use bmo_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = load_settings(&cli.config).await;
    if let Some(model) = cli.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        settings.model.primary = model.to_string();
    }

    match &cli.command {
        Commands::Models { json } => {
            cli::models::list_models(&settings, *json)?;
        }

        Commands::Ask {
            transcript,
            json,
            save_audio,
        } => {
            let state = AppState::init(settings, cli.require_api_key()?).await?;
            cli::ask::ask(&state, transcript, *json, save_audio.as_deref()).await?;
        }

        Commands::Serve { host, port } => {
            let state = AppState::init(settings, cli.require_api_key()?).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "BMO API listening");

            if !cli.quiet {
                println!(
                    "  {} BMO API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Server stopped");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
