//! # Module SOAP - Simple Object Access Protocol
//!
//! Ce module implémente le support SOAP pour UPnP, permettant l'invocation d'actions
//! et la gestion des réponses/erreurs.
//!
//! ## Fonctionnalités
//!
//! - ✅ Parsing d'enveloppes SOAP
//! - ✅ Extraction d'actions UPnP avec arguments
//! - ✅ Construction de réponses et de requêtes SOAP
//! - ✅ Gestion des SOAP Faults
//!
//! ## Example
//!
//! ```
//! use pmoupnp::soap::{parse_soap_action, build_soap_response};
//!
//! let body = r#"<?xml version="1.0"?>
//! <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
//!   <s:Body>
//!     <u:Browse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1">
//!       <ObjectID>0</ObjectID>
//!       <BrowseFlag>BrowseDirectChildren</BrowseFlag>
//!     </u:Browse>
//!   </s:Body>
//! </s:Envelope>"#;
//!
//! let action = parse_soap_action(body.as_bytes()).unwrap();
//! assert_eq!(action.name, "Browse");
//! assert_eq!(action.arg("ObjectID"), Some("0"));
//!
//! let response = build_soap_response(
//!     "urn:schemas-upnp-org:service:ContentDirectory:1",
//!     "GetSystemUpdateID",
//!     vec![("Id".to_string(), "1".to_string())],
//! )
//! .unwrap();
//! assert!(response.contains("<Id>1</Id>"));
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::{SoapBuildError, build_soap_request, build_soap_response};
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{SoapFault, UpnpError, build_soap_fault};
pub use parser::{SoapAction, SoapArgError, SoapParseError, parse_soap_action, parse_soap_envelope};

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Codes d'erreur SOAP UPnP standards
pub mod error_codes {
    /// Action invalide
    pub const INVALID_ACTION: &str = "401";

    /// Arguments invalides
    pub const INVALID_ARGS: &str = "402";

    /// Action échouée
    pub const ACTION_FAILED: &str = "501";

    /// Valeur d'argument invalide
    pub const ARGUMENT_VALUE_INVALID: &str = "600";

    /// Argument hors limites
    pub const ARGUMENT_VALUE_OUT_OF_RANGE: &str = "601";

    /// Action optionnelle non implémentée
    pub const OPTIONAL_ACTION_NOT_IMPLEMENTED: &str = "602";

    /// ContentDirectory : objet inconnu
    pub const NO_SUCH_OBJECT: &str = "701";

    /// Description standard associée à un code
    pub fn description(code: &str) -> &'static str {
        match code {
            INVALID_ACTION => "Invalid Action",
            INVALID_ARGS => "Invalid Args",
            ACTION_FAILED => "Action Failed",
            ARGUMENT_VALUE_INVALID => "Argument Value Invalid",
            ARGUMENT_VALUE_OUT_OF_RANGE => "Argument Value Out of Range",
            OPTIONAL_ACTION_NOT_IMPLEMENTED => "Optional Action Not Implemented",
            NO_SUCH_OBJECT => "No such object",
            _ => "Unknown Error",
        }
    }
}
