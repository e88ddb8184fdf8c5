//! Module MediaServer du bridge.
//!
//! Expose un catalogue média JSON plat comme arborescence ContentDirectory
//! UPnP AV, et relaie les octets des médias et vignettes depuis leurs
//! serveurs d'origine.
//!
//! # Architecture
//!
//! ```text
//! SOAP Browse ──► contentdirectory::control ──► BrowseEngine
//!                                                 │
//!                                   CatalogClient ─┼─► ObjectTranslator ─► DIDL-Lite
//!                                                 │
//! GET <proxy_path>?url=… ──► proxy ──► origine (Range, 206…)
//! ```
//!
//! Les deux chemins partagent le [`transport::HttpTransport`] construit une
//! seule fois au démarrage.
//!
//! # Utilisation de base
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pmocatalog::CatalogClient;
//! use pmomediaserver::contentdirectory::{BrowseEngine, UpdateCounter};
//! use pmomediaserver::{HttpTransport, ObjectTranslator, ProxyState, bridge_router};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::build(&[], Duration::from_secs(10))?;
//! let catalog = CatalogClient::with_client(transport.catalog_client(), "https://catalog.example", "token");
//! let engine = BrowseEngine::new(catalog, ObjectTranslator::new("/cdp-proxy"), Arc::new(UpdateCounter::new()));
//! let router = bridge_router(
//!     Arc::new(engine),
//!     ProxyState::new(transport.proxy_client()),
//!     "/ContentDirectory/control",
//!     "/cdp-proxy",
//! );
//! # let _ = router;
//! # Ok(())
//! # }
//! ```

pub mod contentdirectory;
pub mod dlna;
pub mod error;
pub mod mime;
pub mod proxy;
pub mod translator;
pub mod transport;

pub use contentdirectory::{BrowseEngine, BrowseRequest, BrowseResult, UpdateCounter};
pub use error::{BrowseError, ProxyError, TransportError};
pub use proxy::ProxyState;
pub use translator::ObjectTranslator;
pub use transport::HttpTransport;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Routes HTTP du bridge : point de contrôle SOAP et proxy média
pub fn bridge_router(
    engine: Arc<BrowseEngine>,
    proxy: ProxyState,
    control_path: &str,
    proxy_path: &str,
) -> Router {
    let control = Router::new()
        .route(control_path, post(contentdirectory::control_handler))
        .with_state(engine);

    let media = Router::new()
        .route(
            proxy_path,
            get(proxy::proxy_handler).head(proxy::proxy_handler),
        )
        .with_state(proxy);

    control.merge(media)
}
