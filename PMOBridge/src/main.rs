use std::sync::Arc;

use pmocatalog::CatalogClient;
use pmoconfig::{BridgeSettings, get_config};
use pmomediaserver::contentdirectory::{BrowseEngine, UpdateCounter};
use pmomediaserver::{HttpTransport, ObjectTranslator, ProxyState, bridge_router};
use pmoserver::{LoggingOptions, ServerBuilder, create_logs_router, init_logging};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration et logs ==========
    let config = get_config();
    let log_handle = init_logging(LoggingOptions::from_config(&config))?;

    let settings = BridgeSettings::from_config(&config);
    if settings.catalog_base_url.is_empty() {
        warn!("⚠️ catalog.base_url is empty, every Browse will fail");
    }

    // ========== PHASE 2 : Transport HTTP partagé ==========
    info!("🔐 Loading {} extra trust bundle(s)...", settings.root_cas.len());
    let transport = match HttpTransport::build(&settings.root_cas, settings.catalog_timeout) {
        Ok(t) => t,
        Err(e) => {
            error!("❌ Cannot build HTTP transport: {}", e);
            return Err(e.into());
        }
    };

    // ========== PHASE 3 : ContentDirectory ==========
    let catalog = CatalogClient::with_client(
        transport.catalog_client(),
        settings.catalog_base_url.clone(),
        settings.catalog_token.clone(),
    )
    .with_timeout(settings.catalog_timeout);

    let translator = ObjectTranslator::new(settings.proxy_path.clone())
        .with_mime_guessing(settings.guess_mime_from_url);

    let engine = BrowseEngine::new(catalog, translator, Arc::new(UpdateCounter::new()))
        .with_root_title(settings.friendly_name.clone());

    let mut server = ServerBuilder::from_settings(&settings).build();
    server
        .add_router(
            "/",
            bridge_router(
                Arc::new(engine),
                ProxyState::new(transport.proxy_client()),
                &settings.control_path,
                &settings.proxy_path,
            ),
        )
        .await;
    server.add_router("/api", create_logs_router(log_handle)).await;

    info!(
        "✅ ContentDirectory control at {}, media proxy at {}",
        settings.control_path, settings.proxy_path
    );

    // ========== PHASE 4 : Démarrage du serveur ==========
    info!("🌐 Starting HTTP server...");
    server.start().await?;

    info!("✅ {} is ready!", settings.friendly_name);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
