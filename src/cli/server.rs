//! Server mode CLI logic
//!
//! Loads settings, installs logging and serves the HTTP façade.

use super::{LogTarget, init_logging, load_settings};
use crate::{Settings, server::app, utils::version};
use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

/// Arguments for server mode
#[derive(Debug, Default)]
pub struct ServerArgs {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub config: Option<String>,
    pub verbose: bool,
}

/// Run server mode with the given arguments
pub async fn run_server_mode(args: ServerArgs) -> Result<()> {
    // Settings load before logging so logging.level can apply
    let settings = settings_for(&args);
    init_logging(&settings, LogTarget::Stdout);

    tracing::info!("Starting ytdl-gateway {}", version::get_detailed_version());
    tracing::info!("Binding {}:{}", settings.server.host, settings.server.port);

    let listener = bind_listener(&settings.server.host, settings.server.port).await?;
    serve(settings, listener).await
}

/// Settings for this run: config sources first, then CLI flags on top
pub fn settings_for(args: &ServerArgs) -> Settings {
    let mut settings = load_settings(args.config.as_deref());

    if let Some(host) = &args.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    settings.logging.verbose |= args.verbose;

    settings
}

/// Bind the listening socket
///
/// Accepts IP literals and `localhost`. When `::` cannot be bound (no IPv6
/// stack) the listener falls back to `0.0.0.0` on the same port.
pub async fn bind_listener(host: &str, port: u16) -> Result<TcpListener> {
    let ip = match host.trim() {
        "localhost" => IpAddr::V4(Ipv4Addr::LOCALHOST),
        other => other.parse::<IpAddr>().with_context(|| {
            format!(
                "Invalid host address: {:?}. Use an IP literal such as '0.0.0.0' or '::'",
                host
            )
        })?,
    };
    let addr = SocketAddr::new(ip, port);

    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if ip.is_ipv6() && ip.is_unspecified() => {
            tracing::warn!("Could not listen on {} ({}), falling back to 0.0.0.0", addr, e);
            let fallback = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
            TcpListener::bind(fallback)
                .await
                .with_context(|| format!("Failed to bind {}", fallback))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to bind {}", addr)),
    }
}

/// Serve the gateway on an already bound listener until the process stops
pub async fn serve(settings: Settings, listener: TcpListener) -> Result<()> {
    let cors = settings.server.enable_cors;
    let app = app::create_app(settings)?;

    tracing::info!(
        "ytdl-gateway v{} listening on {} (CORS {})",
        version::get_version(),
        listener.local_addr()?,
        if cors { "on" } else { "off" }
    );

    axum::serve(listener, app).await?;
    Ok(())
}
