//! Parser SOAP pour actions UPnP

use super::{SoapBody, SoapEnvelope, SoapHeader};
use std::collections::HashMap;
use std::io::BufReader;
use xmltree::Element;

/// Action UPnP extraite d'une enveloppe SOAP
#[derive(Debug, Clone)]
pub struct SoapAction {
    /// Nom de l'action (ex: "Browse", "GetSystemUpdateID")
    pub name: String,

    /// Namespace de l'action (ex: "urn:schemas-upnp-org:service:ContentDirectory:1")
    pub namespace: Option<String>,

    /// Arguments de l'action
    pub args: HashMap<String, String>,
}

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("No action found in SOAP Body")]
    NoAction,
}

/// Argument d'action présent mais inutilisable
#[derive(Debug, thiserror::Error)]
#[error("argument {name} is not a valid unsigned integer: {value:?}")]
pub struct SoapArgError {
    pub name: String,
    pub value: String,
}

impl SoapAction {
    /// Valeur brute d'un argument
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Argument entier non signé ; absent ou vide vaut 0
    pub fn u32_arg(&self, name: &str) -> Result<u32, SoapArgError> {
        match self.arg(name).map(str::trim) {
            None | Some("") => Ok(0),
            Some(value) => value.parse().map_err(|_| SoapArgError {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// Parse une action SOAP à partir de bytes XML
pub fn parse_soap_action(xml: &[u8]) -> Result<SoapAction, SoapParseError> {
    let envelope = parse_soap_envelope(xml)?;
    extract_action_from_body(&envelope.body)
}

/// Parse une enveloppe SOAP complète
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    let header = find_child(&root, "Header").map(|e| SoapHeader { content: e.clone() });

    let body = find_child(&root, "Body")
        .map(|e| SoapBody { content: e.clone() })
        .ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope { header, body })
}

fn find_child<'a>(root: &'a Element, suffix: &str) -> Option<&'a Element> {
    root.children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|e| e.name.ends_with(suffix))
}

/// Extrait l'action UPnP du corps SOAP
///
/// Format: `<u:ActionName xmlns:u="service-urn">...</u:ActionName>`
fn extract_action_from_body(body: &SoapBody) -> Result<SoapAction, SoapParseError> {
    let action_elem = body
        .content
        .children
        .iter()
        .find_map(|n| n.as_element())
        .ok_or(SoapParseError::NoAction)?;

    let mut args = HashMap::new();
    for child in &action_elem.children {
        if let Some(elem) = child.as_element() {
            let value = elem.get_text().unwrap_or_default().to_string();
            args.insert(elem.name.clone(), value);
        }
    }

    Ok(SoapAction {
        name: action_elem.name.clone(),
        namespace: action_elem.namespace.clone(),
        args,
    })
}
