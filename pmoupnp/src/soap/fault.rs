//! SOAP Faults pour UPnP

use super::builder::{SoapBuildError, write_envelope};
use super::error_codes;
use xmltree::{Element, XMLNode};

/// Erreur SOAP (Fault)
#[derive(Debug, Clone)]
pub struct SoapFault {
    /// Code du fault (ex: "s:Client")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    /// Détails UPnP optionnels
    pub upnp_error: Option<UpnpError>,
}

/// Erreur UPnP spécifique
#[derive(Debug, Clone)]
pub struct UpnpError {
    /// Code d'erreur UPnP (ex: "401", "701")
    pub error_code: String,

    pub error_description: String,
}

impl SoapFault {
    /// Fault client UPnP standard pour un code d'erreur donné
    pub fn upnp(code: &str) -> Self {
        Self::with_description(code, error_codes::description(code))
    }

    /// Fault client UPnP avec une description libre
    pub fn with_description(code: &str, description: &str) -> Self {
        Self {
            fault_code: "s:Client".to_string(),
            fault_string: "UPnPError".to_string(),
            upnp_error: Some(UpnpError {
                error_code: code.to_string(),
                error_description: description.to_string(),
            }),
        }
    }

    pub fn to_xml(&self) -> Result<String, SoapBuildError> {
        let (code, desc) = match &self.upnp_error {
            Some(e) => (Some(e.error_code.as_str()), Some(e.error_description.as_str())),
            None => (None, None),
        };
        build_soap_fault(&self.fault_code, &self.fault_string, code, desc)
    }
}

fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_string()));
    elem
}

/// Construit un SOAP Fault XML
///
/// # Arguments
///
/// * `fault_code` - Code du fault (ex: "s:Client")
/// * `fault_string` - Message d'erreur
/// * `upnp_error_code` - Code d'erreur UPnP optionnel (ex: "401")
/// * `upnp_error_desc` - Description d'erreur UPnP optionnelle
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    upnp_error_code: Option<&str>,
    upnp_error_desc: Option<&str>,
) -> Result<String, SoapBuildError> {
    let mut fault = Element::new("s:Fault");
    fault
        .children
        .push(XMLNode::Element(text_element("faultcode", fault_code)));
    fault
        .children
        .push(XMLNode::Element(text_element("faultstring", fault_string)));

    if let (Some(code), Some(desc)) = (upnp_error_code, upnp_error_desc) {
        let mut upnp_error = Element::new("UPnPError");
        upnp_error.attributes.insert(
            "xmlns".to_string(),
            "urn:schemas-upnp-org:control-1-0".to_string(),
        );
        upnp_error
            .children
            .push(XMLNode::Element(text_element("errorCode", code)));
        upnp_error
            .children
            .push(XMLNode::Element(text_element("errorDescription", desc)));

        let mut detail = Element::new("detail");
        detail.children.push(XMLNode::Element(upnp_error));
        fault.children.push(XMLNode::Element(detail));
    }

    write_envelope(fault, false)
}
