//! # ContentDirectory Service
//!
//! Implémentation du service ContentDirectory:1 au-dessus du catalogue
//! externe :
//!
//! - [`engine`] : le moteur Browse (pagination, métadonnées, faults)
//! - [`update_id`] : le SystemUpdateID partagé
//! - [`control`] : le point de contrôle SOAP exposé en HTTP
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use pmocatalog::CatalogClient;
//! use pmomediaserver::ObjectTranslator;
//! use pmomediaserver::contentdirectory::{BrowseEngine, BrowseRequest, UpdateCounter};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = CatalogClient::new("https://catalog.example/api", "token")?;
//! let engine = BrowseEngine::new(
//!     catalog,
//!     ObjectTranslator::new("/cdp-proxy"),
//!     Arc::new(UpdateCounter::new()),
//! );
//! let page = engine.browse(&BrowseRequest::children("0", 0, 25), "192.168.1.10:8080").await?;
//! println!("{} / {}", page.number_returned, page.total_matches);
//! # Ok(())
//! # }
//! ```

pub mod control;
pub mod engine;
pub mod update_id;

pub use control::{CONTENT_DIRECTORY_URN, control_handler};
pub use engine::{BrowseEngine, BrowseFlag, BrowseRequest, BrowseResult, ROOT_ID, paginate};
pub use update_id::UpdateCounter;
