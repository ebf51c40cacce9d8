// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallio - fortune-telling platform backend.
//!
//! Binary entry point: serves the HTTP gateway or runs the scheduled
//! jobs (queue drain, horoscope batch, horoscope push) as one-shots for
//! external schedulers.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fallio_config::FallioConfig;
use fallio_core::{FallioError, HoroscopeScope};
use fallio_engine::consumer::QueueOptions;
use fallio_engine::horoscope::HoroscopeOptions;
use fallio_engine::{
    HttpObjectStore, Orchestrator, PushClient, daily_horoscope_push, model_catalog,
    process_queue, run_batch, scopes_for,
};
use fallio_storage::Database;
use fallio_storage::queries::settings;

/// Fallio - fortune-telling platform backend.
#[derive(Parser, Debug)]
#[command(name = "fallio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Drain one batch of pending AI fortunes and exit.
    ProcessFortunes,
    /// Run the horoscope batch generator and exit.
    Horoscopes {
        /// Limit to one scope (daily, weekly, monthly). Defaults to
        /// whatever today's date calls for.
        #[arg(long)]
        scope: Option<HoroscopeScope>,
    },
    /// Send the daily horoscope push and exit.
    HoroscopePush {
        /// Language to push. Defaults to the configured default language.
        #[arg(long)]
        lang: Option<String>,
    },
    /// Print the provider model catalog as JSON and exit.
    Models,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match fallio_config::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fallio: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    if let Err(e) = run(cli.command, config).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: FallioConfig) -> Result<(), FallioError> {
    let db = Database::open(&config.storage.database_path).await?;
    let config = Arc::new(config);

    match command {
        Commands::Serve => {
            fallio_gateway::start_server(db.clone(), config).await?;
        }
        Commands::ProcessFortunes => {
            let provider_settings = settings::load_settings(&db).await?;
            let orchestrator = Orchestrator::from_settings(&provider_settings)?;
            let store = HttpObjectStore::new(
                &config.storage.object_store_url,
                &config.storage.image_bucket,
            )?;
            let push = PushClient::new(&config.push.endpoint, config.push.chunk_size)?;
            let options = QueueOptions::from_config(&config);

            let report = process_queue(
                &db,
                &store,
                &push,
                &orchestrator,
                &provider_settings,
                &options,
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
        Commands::Horoscopes { scope } => {
            let provider_settings = settings::load_settings(&db).await?;
            let orchestrator = Orchestrator::from_settings(&provider_settings)?;
            let active = provider_settings.active_kind();
            let provider = orchestrator.provider(active).ok_or_else(|| {
                FallioError::Internal(format!("{active} adapter is not registered"))
            })?;

            let scopes = match scope {
                Some(scope) => vec![scope],
                None => scopes_for(chrono::Utc::now().date_naive()),
            };
            let options =
                HoroscopeOptions::from_config(&config.horoscope, config.generation.max_tokens);

            let outcomes = run_batch(
                &db,
                provider,
                &scopes,
                chrono::Utc::now().date_naive(),
                &options,
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&outcomes).unwrap_or_default());
        }
        Commands::HoroscopePush { lang } => {
            let lang = lang.unwrap_or_else(|| config.generation.default_language.clone());
            let push = PushClient::new(&config.push.endpoint, config.push.chunk_size)?;
            let count = daily_horoscope_push(&db, &push, &lang).await?;
            println!("{{\"success\":true,\"count\":{count}}}");
        }
        Commands::Models => {
            let provider_settings = settings::load_settings(&db).await?;
            let orchestrator = Orchestrator::from_settings(&provider_settings)?;
            let catalog = model_catalog(&orchestrator).await;
            println!("{}", serde_json::to_string_pretty(&catalog).unwrap_or_default());
        }
    }

    db.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this; the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn default_config_is_valid() {
        let config = fallio_config::FallioConfig::default();
        assert!(fallio_config::validate(&config).is_ok());
    }
}
