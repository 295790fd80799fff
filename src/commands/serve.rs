use anyhow::{Context, Result};

use tourney_i18n::api::LocaleApiServer;
use tourney_i18n::config::Config;

/// Start the locale API server and run until Ctrl+C
pub async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if host.is_some() || port.is_some() {
        let host = host.unwrap_or_else(|| config.server.bind_address.ip().to_string());
        let port = port.unwrap_or_else(|| config.server.bind_address.port());
        config.server.bind_address = format!("{host}:{port}")
            .parse()
            .context("Invalid bind address")?;
    }

    let server = LocaleApiServer::new(&config).context("Failed to create locale API server")?;

    println!("{}", server.info());
    println!();
    println!("Endpoints:");
    println!("  GET  /api/health");
    println!("  GET  /api/i18n/locales");
    println!("  GET  /api/i18n/messages");
    println!("  POST /api/i18n/set-locale");
    println!();
    println!("Press Ctrl+C to stop.");

    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    println!("Locale API server stopped.");
    Ok(())
}
