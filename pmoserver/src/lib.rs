//! # pmoserver - Serveur web haut niveau basé sur Axum
//!
//! Enveloppe légère autour d'Axum pour le bridge :
//!
//! - 🚀 **Routage** : les routers des autres crates sont montés avec [`Server::add_router`]
//! - 📜 **Logs** : initialisation de `tracing` avec niveau rechargeable à chaud
//! - ⚡ **Arrêt gracieux** : gestion propre de Ctrl+C
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use pmoserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "", 8080).build();
//!     server
//!         .add_router("/", Router::new().route("/ping", get(|| async { "pong" })))
//!         .await;
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogHandle, LoggingOptions, create_logs_router, init_logging};
pub use server::{Server, ServerBuilder, ServerInfo};
