use std::sync::Arc;

use anyhow::Context;
use portal_backend::LocalBackend;
use portal_config::PortalConfig;
use portal_server::PortalServer;

use crate::cli::root_commands::ServeArgs;

/// Handle `portal serve`: run the action endpoint until Ctrl-C.
pub async fn handle(args: &ServeArgs, config: &PortalConfig) -> anyhow::Result<()> {
    let backend = LocalBackend::open(config)
        .await
        .context("failed to open the local store")?;
    let bind = args.bind.as_deref().unwrap_or(&config.server.bind);
    let mut server = PortalServer::bind(bind, Arc::new(backend))?;
    if !config.server.public_url.is_empty() {
        server = server.with_public_url(config.server.public_url.as_str());
    }
    let handle = server.spawn();

    eprintln!("Serving the class portal at {}", handle.url());
    eprintln!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    handle.shutdown().await?;
    Ok(())
}
