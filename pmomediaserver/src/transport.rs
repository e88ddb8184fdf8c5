//! Transport HTTP sortant partagé
//!
//! Construit une seule fois au démarrage : le trust store de la plateforme,
//! complété par les bundles PEM configurés. Deux clients en sortent :
//!
//! - catalogue : timeout par requête, redirections suivies
//! - proxy : pas de timeout global (flux longs), pas de redirection, pas de
//!   décompression
//!
//! Les clients `reqwest` sont immuables une fois construits ; les cloner ne
//! fait que partager le pool de connexions.

use crate::error::TransportError;
use reqwest::{Certificate, Client, redirect};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpTransport {
    catalog: Client,
    proxy: Client,
}

impl HttpTransport {
    /// Construit les deux clients
    ///
    /// Un bundle illisible est une erreur fatale ; un bundle sans certificat
    /// valide est seulement signalé.
    pub fn build(root_cas: &[PathBuf], catalog_timeout: Duration) -> Result<Self, TransportError> {
        let mut certificates = Vec::new();
        for path in root_cas {
            certificates.extend(load_trust_bundle(path)?);
        }

        let catalog = with_roots(Client::builder(), &certificates)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(catalog_timeout)
            .build()?;

        let proxy = with_roots(Client::builder(), &certificates)
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()?;

        info!(
            extra_roots = certificates.len(),
            "outbound HTTP transport ready"
        );
        Ok(Self { catalog, proxy })
    }

    pub fn catalog_client(&self) -> Client {
        self.catalog.clone()
    }

    pub fn proxy_client(&self) -> Client {
        self.proxy.clone()
    }
}

fn with_roots(mut builder: reqwest::ClientBuilder, certificates: &[Certificate]) -> reqwest::ClientBuilder {
    for cert in certificates {
        builder = builder.add_root_certificate(cert.clone());
    }
    builder
}

/// Lit un bundle PEM et renvoie ses certificats valides
///
/// Les blocs qui ne se décodent pas sont ignorés.
pub fn load_trust_bundle(path: &Path) -> Result<Vec<Certificate>, TransportError> {
    let pem = std::fs::read(path).map_err(|source| TransportError::TrustBundleUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = pem.as_slice();
    let certificates: Vec<Certificate> = rustls_pemfile::certs(&mut reader)
        .filter_map(|der| match der {
            Ok(der) => match Certificate::from_der(der.as_ref()) {
                Ok(cert) => Some(cert),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping invalid certificate");
                    None
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable PEM block");
                None
            }
        })
        .collect();

    if certificates.is_empty() {
        warn!(path = %path.display(), "CA bundle contains no valid certificate");
    } else {
        info!(path = %path.display(), count = certificates.len(), "CA bundle loaded");
    }

    Ok(certificates)
}
