//! # Point de contrôle SOAP du ContentDirectory
//!
//! ## Actions implémentées
//!
//! - `Browse` : délégué au [`BrowseEngine`]
//! - `GetSystemUpdateID` : valeur courante du compteur
//! - `GetSearchCapabilities`, `GetSortCapabilities` : chaînes vides
//!
//! Toute autre action reçoit le fault 401. Les faults sont renvoyés en
//! HTTP 500 avec un détail `UPnPError`.

use super::engine::{BrowseEngine, BrowseFlag, BrowseRequest};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use pmoupnp::soap::{SoapAction, SoapFault, build_soap_response, error_codes, parse_soap_action};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const CONTENT_DIRECTORY_URN: &str = "urn:schemas-upnp-org:service:ContentDirectory:1";

const XML_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

/// Handler axum `POST <control_path>`
pub async fn control_handler(
    State(engine): State<Arc<BrowseEngine>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let action = match parse_soap_action(&body) {
        Ok(action) => action,
        Err(e) => {
            warn!(error = %e, "malformed SOAP request");
            return fault_response(&SoapFault::upnp(error_codes::INVALID_ARGS));
        }
    };

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    debug!(action = %action.name, host, "ContentDirectory action");

    match dispatch(&engine, &action, host).await {
        Ok(values) => {
            let urn = action.namespace.as_deref().unwrap_or(CONTENT_DIRECTORY_URN);
            match build_soap_response(urn, &action.name, values) {
                Ok(xml) => xml_response(StatusCode::OK, xml),
                Err(e) => {
                    error!(error = %e, "cannot build SOAP response");
                    fault_response(&SoapFault::upnp(error_codes::ACTION_FAILED))
                }
            }
        }
        Err(fault) => fault_response(&fault),
    }
}

async fn dispatch(
    engine: &BrowseEngine,
    action: &SoapAction,
    host: &str,
) -> Result<Vec<(String, String)>, SoapFault> {
    match action.name.as_str() {
        "Browse" => {
            let request = browse_request(action)?;
            let result = engine.browse(&request, host).await.map_err(|e| {
                error!("Browse failed: {}", e);
                SoapFault::upnp(e.upnp_error_code())
            })?;
            Ok(vec![
                ("Result".to_string(), result.result),
                ("NumberReturned".to_string(), result.number_returned.to_string()),
                ("TotalMatches".to_string(), result.total_matches.to_string()),
                ("UpdateID".to_string(), result.update_id.to_string()),
            ])
        }
        "GetSystemUpdateID" => Ok(vec![("Id".to_string(), engine.update_id().to_string())]),
        "GetSearchCapabilities" => Ok(vec![("SearchCaps".to_string(), String::new())]),
        "GetSortCapabilities" => Ok(vec![("SortCaps".to_string(), String::new())]),
        other => {
            warn!(action = other, "unsupported ContentDirectory action");
            Err(SoapFault::upnp(error_codes::INVALID_ACTION))
        }
    }
}

/// Extrait les arguments Browse ; un flag inconnu est rejeté avant tout appel au catalogue
fn browse_request(action: &SoapAction) -> Result<BrowseRequest, SoapFault> {
    let browse_flag: BrowseFlag = action
        .arg("BrowseFlag")
        .unwrap_or("")
        .parse()
        .map_err(|e: crate::error::BrowseError| SoapFault::upnp(e.upnp_error_code()))?;

    let invalid_args = |e: pmoupnp::soap::SoapArgError| {
        warn!(error = %e, "invalid Browse argument");
        SoapFault::upnp(error_codes::INVALID_ARGS)
    };

    Ok(BrowseRequest {
        object_id: action.arg("ObjectID").unwrap_or("").to_string(),
        browse_flag,
        starting_index: action.u32_arg("StartingIndex").map_err(invalid_args)?,
        requested_count: action.u32_arg("RequestedCount").map_err(invalid_args)?,
    })
}

fn xml_response(status: StatusCode, xml: String) -> Response {
    (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml).into_response()
}

fn fault_response(fault: &SoapFault) -> Response {
    match fault.to_xml() {
        Ok(xml) => xml_response(StatusCode::INTERNAL_SERVER_ERROR, xml),
        Err(e) => {
            error!(error = %e, "cannot build SOAP fault");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
