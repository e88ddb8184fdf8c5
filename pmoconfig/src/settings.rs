//! Instantané typé de la configuration consommée par le bridge

use crate::Config;
use std::path::PathBuf;
use std::time::Duration;

/// Valeurs de configuration injectées dans le cœur du bridge
///
/// Construit une seule fois au démarrage ; les composants en gardent une
/// copie et ne relisent jamais la configuration globale.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Nom affiché pour le container racine
    pub friendly_name: String,
    /// URL de base de l'API catalogue (sans `/` final)
    pub catalog_base_url: String,
    /// Token porteur pour l'API catalogue
    pub catalog_token: String,
    /// Timeout des requêtes vers le catalogue
    pub catalog_timeout: Duration,
    /// Bundles PEM ajoutés au magasin de confiance
    pub root_cas: Vec<PathBuf>,
    /// Devine le type MIME depuis l'URL média quand le catalogue ne le fournit pas
    pub guess_mime_from_url: bool,
    /// Chemin du proxy média tel que vu par les clients DLNA
    pub proxy_path: String,
    /// Chemin de contrôle SOAP du ContentDirectory
    pub control_path: String,
    /// Hôte annoncé ; une adresse IP restreint l'écoute
    pub base_url: String,
    /// Port HTTP d'écoute
    pub http_port: u16,
}

impl BridgeSettings {
    /// Lit toutes les valeurs nécessaires depuis une [`Config`]
    pub fn from_config(config: &Config) -> Self {
        Self {
            friendly_name: config.get_friendly_name(),
            catalog_base_url: config
                .get_catalog_base_url()
                .trim_end_matches('/')
                .to_string(),
            catalog_token: config.get_catalog_token(),
            catalog_timeout: Duration::from_secs(config.get_catalog_timeout_secs()),
            root_cas: config
                .get_catalog_root_cas()
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            guess_mime_from_url: config.get_guess_mime_from_url(),
            proxy_path: normalize_path(&config.get_proxy_path()),
            control_path: normalize_path(&config.get_control_path()),
            base_url: config.get_base_url(),
            http_port: config.get_http_port(),
        }
    }
}

fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}
