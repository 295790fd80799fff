use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourney_i18n::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "tourney-i18n",
    version,
    about = "Translation loading and locale API for the tournament manager",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the locale API server
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the available locales
    Locales {
        /// Ask the locale API instead of the configuration
        #[arg(long, default_value = "false")]
        remote: bool,
    },

    /// Print the locale that would be active at startup
    Resolve {
        /// Language reported by the environment (overrides detection)
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Select and persist a locale
    SetLocale {
        /// Locale code, e.g. pt-BR
        code: String,
    },

    /// Translate a `namespace.key`
    Translate {
        /// Translation key, e.g. events.title
        key: String,

        /// Locale to translate into (not persisted)
        #[arg(short, long)]
        locale: Option<String>,

        /// Route to navigate to first, loading its namespaces
        #[arg(short, long)]
        route: Option<String>,

        /// Placeholder value as name=value (repeatable)
        #[arg(short = 'a', long = "arg", value_parser = commands::parse_key_value)]
        args: Vec<(String, String)>,
    },

    /// Load bundles and print cache statistics
    Stats {
        /// Route to navigate to after initialization
        #[arg(short, long)]
        route: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    tracing::debug!(config = ?cli.config, "Configuration loaded");

    match cli.command {
        Commands::Serve { host, port } => {
            tracing::info!(host = ?host, port = ?port, "Starting serve command");
            commands::serve(config, host, port).await?;
        }

        Commands::Locales { remote } => {
            commands::locales(&config, remote).await?;
        }

        Commands::Resolve { lang } => {
            commands::resolve(&config, lang)?;
        }

        Commands::SetLocale { code } => {
            tracing::info!(code = %code, "Starting set-locale command");
            commands::set_locale(&config, &code).await?;
        }

        Commands::Translate {
            key,
            locale,
            route,
            args,
        } => {
            commands::translate(&config, &key, locale, route, &args).await?;
        }

        Commands::Stats { route } => {
            commands::stats(&config, route).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env().context("Failed to load configuration from environment")?,
    };
    config.validate()?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tourney_i18n=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("tourney_i18n={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
