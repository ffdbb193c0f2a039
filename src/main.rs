mod aggregate;
mod cache;
mod charts;
mod cli;
mod client;
mod error;
mod expand;
mod fmt;
mod loader;
mod models;
mod periods;
mod reports;
mod settings;
mod tui;
#[cfg(feature = "xlsx")]
mod xlsx;

use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{AppContext, Cli, Commands, ConfigCommands};
use client::ApiClient;
use settings::{config_dir, load_settings};

const DEFAULT_LOG_FILTER: &str = "painel=info";

/// Log to `<config_dir>/painel.log` so the interactive views keep the screen;
/// stderr only when the file cannot be opened.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let dir = config_dir();
    let file = std::fs::create_dir_all(&dir).and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("painel.log"))
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = match file {
        Ok(f) => builder.with_ansi(false).with_writer(Mutex::new(f)).try_init(),
        Err(_) => builder.with_writer(std::io::stderr).try_init(),
    };
}

fn context(api_url: Option<&str>, no_cache: bool) -> error::Result<AppContext> {
    let settings = load_settings().with_api_url(api_url);
    let client = ApiClient::from_settings(&settings, !no_cache)?;
    tracing::debug!(api_url = client.base_url(), cache = !no_cache, "client ready");
    Ok(AppContext {
        settings,
        source: Arc::new(client),
    })
}

fn main() {
    let Cli {
        api_url,
        no_cache,
        command,
    } = Cli::parse();
    init_logging();
    let api_url = api_url.as_deref();

    let result = match command {
        None => context(api_url, no_cache).and_then(cli::dashboard::run),
        Some(Commands::Report { command }) => {
            context(api_url, no_cache).and_then(|ctx| cli::report::dispatch(&ctx, command))
        }
        #[cfg(feature = "xlsx")]
        Some(Commands::Export {
            kind,
            filters,
            output,
        }) => context(api_url, no_cache).and_then(|ctx| {
            let opts = filters.options(kind)?;
            cli::export::run(&ctx, kind, &opts, output.as_deref())
        }),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cli::config::show(&load_settings().with_api_url(api_url)),
            ConfigCommands::Set {
                cache_ttl,
                timeout,
                export_dir,
            } => cli::config::set(api_url.map(str::to_string), cache_ttl, timeout, export_dir),
        },
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
