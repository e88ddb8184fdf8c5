//! # Module Server - API de haut niveau pour Axum
//!
//! Enveloppe un [`Router`] Axum partagé, auquel les crates du bridge
//! ajoutent leurs routes avant le démarrage.
//!
//! ## Fonctionnalités
//!
//! - 🔀 **Composition** : `add_router()` fusionne ou imbrique un sous-router
//! - 🔧 **Configuration** : `from_settings()` reprend l'hôte et le port d'un [`BridgeSettings`]
//! - ⚡ **Gestion gracieuse** : Arrêt propre sur Ctrl+C

use anyhow::Context;
use axum::Router;
use pmoconfig::BridgeSettings;
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::{signal, sync::RwLock, task::JoinHandle};
use tracing::{error, info};

/// Info serveur sérialisable
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub base_url: String,
    pub http_port: u16,
}

/// Serveur principal
pub struct Server {
    name: String,
    base_url: String,
    http_port: u16,
    router: Arc<RwLock<Router>>,
    join_handle: Option<JoinHandle<()>>,
}

impl Server {
    /// Crée une nouvelle instance de serveur
    ///
    /// # Arguments
    ///
    /// * `name` - Nom du serveur (pour les logs)
    /// * `base_url` - Hôte annoncé ; une adresse IP restreint aussi l'écoute
    /// * `http_port` - Port HTTP à écouter
    ///
    /// # Exemple
    ///
    /// ```rust
    /// # use pmoserver::Server;
    /// let server = Server::new("MyAPI", "127.0.0.1", 3000);
    /// ```
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
            router: Arc::new(RwLock::new(Router::new())),
            join_handle: None,
        }
    }

    /// Ajoute un sous-router au serveur
    ///
    /// - Si `path` est "/", merge directement au router principal
    /// - Sinon, nest le router sous le chemin donné
    pub async fn add_router(&mut self, path: &str, sub_router: Router) {
        let mut r = self.router.write().await;

        *r = if path == "/" {
            std::mem::take(&mut *r).merge(sub_router)
        } else {
            let normalized = format!("/{}", path.trim_start_matches('/'));
            std::mem::take(&mut *r).nest(&normalized, sub_router)
        };
    }

    /// Copie du router courant, sans démarrer le serveur
    pub async fn router(&self) -> Router {
        self.router.read().await.clone()
    }

    /// Adresse d'écoute déduite de `base_url`
    ///
    /// Toutes les interfaces si `base_url` n'est pas une adresse IP.
    pub fn bind_addr(&self) -> SocketAddr {
        let host = self
            .base_url
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/');
        let ip = host
            .parse::<IpAddr>()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.http_port)
    }

    /// Démarre le serveur HTTP
    ///
    /// Lie le port, puis sert le router dans une tâche de fond jusqu'à
    /// Ctrl+C. Échoue si le port ne peut pas être lié.
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// # use pmoserver::Server;
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// # let mut server = Server::new("Test", "", 3000);
    /// server.start().await?;
    /// server.wait().await;  // Attend Ctrl+C
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let addr = self.bind_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("cannot bind {}", addr))?;

        info!(
            "Server {} running at http://{}",
            self.name,
            listener.local_addr().unwrap_or(addr)
        );

        let router = self.router.read().await.clone();
        self.join_handle = Some(tokio::spawn(async move {
            let served = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await;
            if let Err(e) = served {
                error!("HTTP server stopped: {}", e);
            }
        }));

        Ok(())
    }

    /// Attend la fin du serveur
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }

    /// Récupère les infos du serveur
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            http_port: self.http_port,
        }
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C reçu, arrêt gracieux"),
        Err(e) => error!("failed to listen for ctrl_c: {}", e),
    }
}

/// Builder pattern
pub struct ServerBuilder {
    name: String,
    base_url: String,
    http_port: u16,
}

impl ServerBuilder {
    /// Crée un nouveau builder
    ///
    /// # Arguments
    ///
    /// * `name` - Nom du serveur
    /// * `base_url` - Hôte annoncé
    /// * `http_port` - Port HTTP
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
        }
    }

    /// Nom, hôte et port repris de l'instantané de configuration
    pub fn from_settings(settings: &BridgeSettings) -> Self {
        Self::new(
            settings.friendly_name.clone(),
            settings.base_url.clone(),
            settings.http_port,
        )
    }

    /// Construit le serveur
    ///
    /// ```rust
    /// # use pmoserver::ServerBuilder;
    /// let mut server = ServerBuilder::new("MyAPI", "", 3000).build();
    /// ```
    pub fn build(self) -> Server {
        Server::new(self.name, self.base_url, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_add_router_merge_and_nest() {
        let mut server = ServerBuilder::new("Test", "", 0).build();
        server
            .add_router("/", Router::new().route("/ping", get(|| async { "pong" })))
            .await;
        server
            .add_router("api", Router::new().route("/info", get(|| async { "info" })))
            .await;

        let router = server.router().await;
        for (uri, expected) in [("/ping", StatusCode::OK), ("/api/info", StatusCode::OK), ("/info", StatusCode::NOT_FOUND)] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected, "{uri}");
        }
    }

    #[test]
    fn test_bind_addr() {
        let server = Server::new("Test", "", 8080);
        assert_eq!(server.bind_addr(), "0.0.0.0:8080".parse().unwrap());

        let server = Server::new("Test", "http://127.0.0.1/", 9000);
        assert_eq!(server.bind_addr(), "127.0.0.1:9000".parse().unwrap());

        let server = Server::new("Test", "bridge.local", 9000);
        assert_eq!(server.bind_addr().ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_builder_from_settings() {
        let config = pmoconfig::Config::in_memory();
        config.set(&["host", "base_url"], "127.0.0.1").unwrap();
        config.set_http_port(8300).unwrap();
        let settings = BridgeSettings::from_config(&config);

        let server = ServerBuilder::from_settings(&settings).build();
        assert_eq!(server.info().name, "PMOBridge");
        assert_eq!(server.bind_addr(), "127.0.0.1:8300".parse().unwrap());
    }

    #[test]
    fn test_info() {
        let info = Server::new("Bridge", "10.0.0.2", 8200).info();
        assert_eq!(info.name, "Bridge");
        assert_eq!(info.http_port, 8200);
    }

    #[tokio::test]
    async fn test_start_serves_router() {
        let mut server = Server::new("Test", "127.0.0.1", 0);
        server
            .add_router("/", Router::new().route("/ping", get(|| async { "pong" })))
            .await;
        server.start().await.unwrap();
        assert!(server.join_handle.is_some());
    }
}
