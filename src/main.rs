use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bindery::config::Config;
use bindery::db::{AppState, init_db, open_pool, queries};
use bindery::email::EmailSender;
use bindery::handlers::app;
use bindery::licensing::extension::finalize_due_claims;
use bindery::payments::StripeTransfers;

#[derive(Parser)]
#[command(name = "bindery", version, about = "License and partner payout backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Finalize due extension claims once, then exit.
    Sweep,
    /// Create the database schema, then exit.
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let pool = open_pool(&config.database_path)?;
    {
        let conn = pool.get()?;
        init_db(&conn)?;
    }

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::InitDb => {
            tracing::info!(path = %config.database_path, "schema ready");
        }
        Command::Sweep => {
            let mut conn = pool.get()?;
            let approved = finalize_due_claims(&mut conn, queries::now())?;
            tracing::info!(approved, "sweep complete");
        }
        Command::Serve => {
            let state = AppState {
                db: pool.clone(),
                base_url: config.base_url.clone(),
                admin_token: config.admin_token.clone(),
                email: EmailSender::new(config.resend_api_key.clone(), config.email_from.clone()),
                transfers: StripeTransfers::new(config.stripe_secret_key.clone()),
            };
            if !state.transfers.is_configured() {
                tracing::warn!(
                    "STRIPE_SECRET_KEY not set; withdrawal approvals will fail their transfers"
                );
            }

            let sweep_pool = pool.clone();
            let interval = Duration::from_secs(config.sweep_interval_secs);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    ticker.tick().await;
                    let result = sweep_pool
                        .get()
                        .map_err(bindery::error::AppError::from)
                        .and_then(|mut conn| finalize_due_claims(&mut conn, queries::now()));
                    match result {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(approved = n, "auto-approved extension claims"),
                        Err(e) => tracing::error!(error = %e, "extension sweep failed"),
                    }
                }
            });

            let addr = config.addr();
            tracing::info!(%addr, dev_mode = config.dev_mode, "starting server");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app(state)).await?;
        }
    }

    Ok(())
}
