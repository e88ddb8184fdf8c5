//! Erreurs du bridge ContentDirectory

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pmoupnp::soap::error_codes;
use std::path::PathBuf;

/// Échecs d'un Browse, convertis en faults UPnP avant de sortir du moteur
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    /// Réseau, timeout ou statut non 2xx côté catalogue
    #[error("catalog unreachable: {0}")]
    CatalogUnreachable(#[source] pmocatalog::Error),

    #[error("malformed catalog response: {0}")]
    MalformedCatalogResponse(#[source] pmocatalog::Error),

    #[error("invalid BrowseFlag: {0}")]
    InvalidBrowseFlag(String),

    #[error("no such object: {0}")]
    NoSuchObject(String),

    #[error("DIDL-Lite encoding failed: {0}")]
    Encoding(#[from] pmodidl::DidlError),
}

impl BrowseError {
    /// Code d'erreur UPnP renvoyé au point de contrôle
    pub fn upnp_error_code(&self) -> &'static str {
        match self {
            BrowseError::CatalogUnreachable(_) | BrowseError::NoSuchObject(_) => {
                error_codes::NO_SUCH_OBJECT
            }
            BrowseError::InvalidBrowseFlag(_) => error_codes::ARGUMENT_VALUE_INVALID,
            BrowseError::MalformedCatalogResponse(_) | BrowseError::Encoding(_) => {
                error_codes::ACTION_FAILED
            }
        }
    }
}

impl From<pmocatalog::Error> for BrowseError {
    fn from(err: pmocatalog::Error) -> Self {
        match err {
            pmocatalog::Error::NotFound(id) => BrowseError::NoSuchObject(id),
            e if e.is_transport() => BrowseError::CatalogUnreachable(e),
            e => BrowseError::MalformedCatalogResponse(e),
        }
    }
}

/// Erreurs de construction du transport HTTP sortant
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Bundle de CA configuré mais illisible : fatal au démarrage
    #[error("cannot read CA bundle {}: {source}", path.display())]
    TrustBundleUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Erreurs du proxy média, renvoyées telles quelles au client DLNA
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("missing url query parameter")]
    MissingUrl,

    #[error("invalid origin url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported origin scheme: {0}")]
    UnsupportedScheme(String),

    #[error("origin request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::MissingUrl | ProxyError::InvalidUrl(_) | ProxyError::UnsupportedScheme(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}
