//! Construction de réponses et de requêtes SOAP

use super::{SOAP_ENCODING_NS, SOAP_ENVELOPE_NS};
use xmltree::{Element, XMLNode};

/// Erreur de construction d'un document SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapBuildError {
    #[error("XML write error: {0}")]
    Xml(#[from] xmltree::Error),

    #[error("SOAP document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub(crate) fn write_envelope(body_child: Element, encoding_style: bool) -> Result<String, SoapBuildError> {
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(body_child));

    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NS.to_string());
    if encoding_style {
        envelope
            .attributes
            .insert("s:encodingStyle".to_string(), SOAP_ENCODING_NS.to_string());
    }
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf)?)
}

fn action_element(name: String, service_urn: &str, values: impl IntoIterator<Item = (String, String)>) -> Element {
    let mut elem = Element::new(&name);
    elem.attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());

    for (key, value) in values {
        let mut child = Element::new(&key);
        child.children.push(XMLNode::Text(value));
        elem.children.push(XMLNode::Element(child));
    }
    elem
}

/// Construit une réponse SOAP UPnP
///
/// # Arguments
///
/// * `service_urn` - URN du service (ex: "urn:schemas-upnp-org:service:ContentDirectory:1")
/// * `action` - Nom de l'action (ex: "Browse")
/// * `values` - Valeurs de retour, dans l'ordre d'émission
///
/// Les valeurs sont échappées : un fragment DIDL-Lite passé en `Result`
/// arrive chez le client sous forme de texte.
pub fn build_soap_response(
    service_urn: &str,
    action: &str,
    values: Vec<(String, String)>,
) -> Result<String, SoapBuildError> {
    let response = action_element(format!("u:{}Response", action), service_urn, values);
    write_envelope(response, true)
}

/// Construit une requête SOAP UPnP (côté point de contrôle)
pub fn build_soap_request(
    service_urn: &str,
    action: &str,
    args: &[(&str, &str)],
) -> Result<String, SoapBuildError> {
    let request = action_element(
        format!("u:{}", action),
        service_urn,
        args.iter().map(|(k, v)| (k.to_string(), v.to_string())),
    );
    write_envelope(request, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::parse_soap_action;

    const CDS: &str = "urn:schemas-upnp-org:service:ContentDirectory:1";

    #[test]
    fn test_build_response() {
        let values = vec![
            ("Result".to_string(), "<DIDL-Lite/>".to_string()),
            ("NumberReturned".to_string(), "0".to_string()),
        ];

        let xml = build_soap_response(CDS, "Browse", values).unwrap();

        assert!(xml.contains("BrowseResponse"));
        assert!(xml.contains("&lt;DIDL-Lite/>") || xml.contains("&lt;DIDL-Lite/&gt;"));
        assert!(xml.contains("<NumberReturned>0</NumberReturned>"));
        assert!(xml.contains("xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\""));
    }

    #[test]
    fn test_build_empty_response() {
        let xml = build_soap_response(CDS, "GetSearchCapabilities", Vec::new()).unwrap();

        assert!(xml.contains("GetSearchCapabilitiesResponse"));
        assert!(xml.contains("xmlns:u=\"urn:schemas-upnp-org:service:ContentDirectory:1\""));
    }

    #[test]
    fn test_request_parses_back() {
        let xml = build_soap_request(CDS, "Browse", &[("ObjectID", "7"), ("StartingIndex", "2")]).unwrap();
        let action = parse_soap_action(xml.as_bytes()).unwrap();
        assert_eq!(action.name, "Browse");
        assert_eq!(action.arg("ObjectID"), Some("7"));
        assert_eq!(action.u32_arg("StartingIndex").unwrap(), 2);
    }
}
