//! # Proxy média
//!
//! `GET <proxy_path>?url=<origine encodée>` relaie l'origine en streaming :
//! statut (200, 206, 3xx…), en-têtes (`Content-Range`, `Content-Length`,
//! `Accept-Ranges`) et corps passent tels quels, sans mise en tampon.
//!
//! Si le client DLNA se déconnecte, le corps de la réponse est abandonné,
//! ce qui ferme la connexion vers l'origine.

use crate::error::ProxyError;
use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, HeaderName, Method, header};
use axum::response::Response;
use futures::TryStreamExt;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// En-têtes hop-by-hop, jamais relayés
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// État du proxy : le client sortant partagé
#[derive(Debug, Clone)]
pub struct ProxyState {
    client: Client,
}

impl ProxyState {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Handler axum pour `GET`/`HEAD <proxy_path>`
pub async fn proxy_handler(
    State(state): State<ProxyState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let origin = origin_url(query.as_deref())?;
    debug!(%origin, %method, range = ?headers.get(header::RANGE), "proxying media");

    let mut upstream_headers = forwarded_headers(&headers);
    if let Some(host) = headers.get(header::HOST) {
        upstream_headers.insert(HeaderName::from_static("x-forwarded-host"), host.clone());
    }

    let upstream = state
        .client
        .request(method, origin.clone())
        .headers(upstream_headers)
        .send()
        .await
        .map_err(|e| {
            warn!(%origin, error = %e, "origin unreachable");
            ProxyError::from(e)
        })?;

    let status = upstream.status();
    let response_headers = forwarded_headers(upstream.headers());
    let stream = upstream.bytes_stream().inspect_err(move |e| {
        warn!(%origin, error = %e, "origin stream interrupted");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// Extrait et valide le paramètre `url`
fn origin_url(query: Option<&str>) -> Result<Url, ProxyError> {
    let raw = query
        .into_iter()
        .flat_map(|q| url::form_urlencoded::parse(q.as_bytes()))
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ProxyError::MissingUrl)?;

    let origin = Url::parse(&raw)?;
    match origin.scheme() {
        "http" | "https" => Ok(origin),
        other => Err(ProxyError::UnsupportedScheme(other.to_string())),
    }
}

/// Copie des en-têtes sans hop-by-hop ni `Host`
///
/// Les en-têtes listés dans `Connection` sont retirés aussi.
fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if name == header::HOST
            || is_hop_by_hop(name)
            || listed.iter().any(|l| l == name.as_str())
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}
