// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conduit - a multi-tenant messaging gateway.
//!
//! This is the binary entry point for the gateway.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod runtime;
mod send;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use conduit_config::ConduitConfig;
use conduit_core::ConduitError;

/// Conduit - a multi-tenant messaging gateway.
#[derive(Parser, Debug)]
#[command(name = "conduit", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the standard lookup.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway.
    Serve,
    /// Print the effective configuration as TOML.
    Config,
    /// Send one message through a configured channel.
    Send {
        /// UUID of the channel to send on.
        #[arg(long)]
        channel: String,
        /// Recipient URN, e.g. tel:+250788383383.
        #[arg(long)]
        urn: String,
        /// Message text.
        #[arg(long)]
        text: String,
        /// Attachment as content-type:url; may be repeated.
        #[arg(long = "attachment")]
        attachments: Vec<String>,
    },
    /// Check configuration, handlers and storage.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => conduit_config::load_and_validate_path(path),
        None => conduit_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            conduit_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config) => print_config(&config),
        Some(Commands::Send {
            channel,
            urn,
            text,
            attachments,
        }) => {
            let args = send::SendArgs {
                channel,
                urn,
                text,
                attachments,
            };
            send::run_send(&config, args).await
        }
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        None => {
            println!("conduit: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("conduit: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &ConduitConfig) -> Result<(), ConduitError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ConduitError::Internal(format!("failed to render config: {e}")))?;
    println!("{rendered}");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("conduit={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
