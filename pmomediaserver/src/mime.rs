//! Classification des types MIME pour le ContentDirectory
//!
//! Seuls les types `audio/*`, `video/*` et `image/*` sont des médias
//! navigables. Tout le reste, y compris le type vide, est ignoré par le
//! traducteur.

use crate::dlna::ContentFeatures;
use mime_guess::mime::Mime;
use std::fmt;

/// Famille majeure d'un type MIME
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorKind {
    Audio,
    Video,
    Image,
    Other,
}

impl MajorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MajorKind::Audio => "audio",
            MajorKind::Video => "video",
            MajorKind::Image => "image",
            MajorKind::Other => "other",
        }
    }

    pub fn is_media(&self) -> bool {
        !matches!(self, MajorKind::Other)
    }
}

impl fmt::Display for MajorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Résultat de la classification d'un type MIME
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeClass {
    pub major_kind: MajorKind,
    pub is_media: bool,
}

impl MimeClass {
    /// Fragment de classe UPnP : `object.item.<kind>Item`
    ///
    /// `None` pour les types non média.
    pub fn upnp_class(&self) -> Option<String> {
        self.is_media
            .then(|| format!("object.item.{}Item", self.major_kind))
    }

    /// Flags DLNA annoncés pour la ressource principale
    pub fn dlna_features(&self) -> ContentFeatures {
        ContentFeatures::streaming()
    }
}

/// Classe un type MIME. Pur et total.
///
/// Un type qui ne se parse pas (vide, sans sous-type…) n'est pas un média.
pub fn classify(mime: &str) -> MimeClass {
    let major_kind = match mime.trim().parse::<Mime>() {
        Ok(parsed) => match parsed.type_().as_str().to_ascii_lowercase().as_str() {
            "audio" => MajorKind::Audio,
            "video" => MajorKind::Video,
            "image" => MajorKind::Image,
            _ => MajorKind::Other,
        },
        Err(_) => MajorKind::Other,
    };

    MimeClass {
        major_kind,
        is_media: major_kind.is_media(),
    }
}

/// Devine un type MIME depuis l'extension d'un chemin ou d'une URL
///
/// La query et le fragment sont ignorés.
pub fn mime_type_by_path(path: &str) -> Option<&'static str> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    mime_guess::from_path(path).first_raw()
}
