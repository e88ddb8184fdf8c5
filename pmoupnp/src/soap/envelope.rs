//! Structures de l'enveloppe SOAP

use xmltree::Element;

/// Enveloppe SOAP reçue
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// En-tête SOAP optionnel
    pub header: Option<SoapHeader>,

    /// Corps SOAP contenant l'action
    pub body: SoapBody,
}

/// En-tête SOAP, conservé brut
#[derive(Debug, Clone)]
pub struct SoapHeader {
    pub content: Element,
}

/// Corps SOAP, conservé brut
#[derive(Debug, Clone)]
pub struct SoapBody {
    pub content: Element,
}

impl SoapEnvelope {
    pub fn new(body: SoapBody) -> Self {
        Self { header: None, body }
    }
}
