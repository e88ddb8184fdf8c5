//! # pmocatalog - client du catalogue média
//!
//! Le catalogue est une API JSON plate : chaque enregistrement connaît son
//! parent, et `GET <base>/browse?id=<id>` liste les enfants d'un objet.
//!
//! ```no_run
//! use pmocatalog::CatalogClient;
//!
//! # async fn demo() -> pmocatalog::Result<()> {
//! let client = CatalogClient::new("https://catalog.example/api", "secret")?;
//! for item in client.browse_children("0").await? {
//!     println!("{} {}", item.id, item.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;

pub use client::{CatalogClient, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{Error, Result};
pub use models::CatalogItem;
