//! # pmodidl - DIDL-Lite
//!
//! Modèle sérialisable et codec pour le format DIDL-Lite utilisé par le
//! ContentDirectory UPnP/DLNA.
//!
//! L'ordre des objets d'un document est conservé tel quel : containers et
//! items partagent une seule séquence ([`DIDLLite::objects`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NS_DIDL_LITE: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
pub const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
pub const NS_UPNP: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";
pub const NS_DLNA: &str = "urn:schemas-dlna-org:metadata-1-0/";

/// Classe UPnP de tous les containers exposés
pub const STORAGE_FOLDER_CLASS: &str = "object.container.storageFolder";

#[derive(Debug, Error)]
pub enum DidlError {
    #[error("DIDL-Lite serialization failed: {0}")]
    Serialize(String),

    #[error("DIDL-Lite parse failed: {0}")]
    Parse(#[from] quick_xml::de::DeError),
}

// ============= Structures DIDL-Lite =============

/// Racine d'un document DIDL-Lite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "DIDL-Lite")]
pub struct DIDLLite {
    #[serde(rename = "@xmlns:dc", default, skip_serializing_if = "Option::is_none")]
    pub xmlns_dc: Option<String>,

    #[serde(rename = "@xmlns:upnp", default, skip_serializing_if = "Option::is_none")]
    pub xmlns_upnp: Option<String>,

    #[serde(rename = "@xmlns", default, skip_serializing_if = "Option::is_none")]
    pub xmlns: Option<String>,

    #[serde(rename = "@xmlns:dlna", default, skip_serializing_if = "Option::is_none")]
    pub xmlns_dlna: Option<String>,

    #[serde(rename = "$value", default)]
    pub objects: Vec<UpnpObject>,
}

/// Objet du ContentDirectory : un container ou un item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpnpObject {
    #[serde(rename = "container")]
    Container(Container),
    #[serde(rename = "item")]
    Item(Item),
}

/// Container (répertoire navigable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted", default = "restricted_default")]
    pub restricted: u8,

    #[serde(rename = "@searchable", default)]
    pub searchable: u8,

    #[serde(rename = "@childCount", default)]
    pub child_count: u32,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,

    #[serde(
        rename = "upnp:icon",
        alias = "icon",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<String>,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(
        rename = "upnp:albumArtURI",
        alias = "albumArtURI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub album_art: Option<String>,
}

/// Item (objet média lisible)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted", default = "restricted_default")]
    pub restricted: u8,

    #[serde(rename = "@searchable", default)]
    pub searchable: u8,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,

    #[serde(
        rename = "upnp:icon",
        alias = "icon",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<String>,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(
        rename = "upnp:albumArtURI",
        alias = "albumArtURI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub album_art: Option<String>,

    #[serde(rename = "res", default)]
    pub resources: Vec<Resource>,
}

/// Ressource média, l'URL est le contenu texte de `<res>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "@protocolInfo")]
    pub protocol_info: String,

    #[serde(rename = "@size", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(rename = "@bitrate", default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,

    #[serde(rename = "@duration", default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(rename = "@resolution", default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    #[serde(rename = "$text")]
    pub url: String,
}

fn restricted_default() -> u8 {
    1
}

// ============= Implémentation des méthodes =============

impl DIDLLite {
    /// Document vide portant les quatre déclarations de namespace
    pub fn new(objects: Vec<UpnpObject>) -> Self {
        Self {
            xmlns_dc: Some(NS_DC.to_string()),
            xmlns_upnp: Some(NS_UPNP.to_string()),
            xmlns: Some(NS_DIDL_LITE.to_string()),
            xmlns_dlna: Some(NS_DLNA.to_string()),
            objects,
        }
    }

    /// Parse un document DIDL-Lite
    pub fn parse(input: &str) -> Result<Self, DidlError> {
        Ok(quick_xml::de::from_str(input)?)
    }

    /// Sérialise le document, sans déclaration XML
    ///
    /// La sortie est déterministe : mêmes objets, mêmes octets.
    pub fn to_xml(&self) -> Result<String, DidlError> {
        quick_xml::se::to_string(self).map_err(|e| DidlError::Serialize(e.to_string()))
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.objects.iter().filter_map(|o| match o {
            UpnpObject::Container(c) => Some(c),
            UpnpObject::Item(_) => None,
        })
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.objects.iter().filter_map(|o| match o {
            UpnpObject::Item(i) => Some(i),
            UpnpObject::Container(_) => None,
        })
    }

    /// Trouve un objet par ID
    pub fn get_by_id(&self, id: &str) -> Option<&UpnpObject> {
        self.objects.iter().find(|o| o.id() == id)
    }
}

impl UpnpObject {
    pub fn id(&self) -> &str {
        match self {
            UpnpObject::Container(c) => &c.id,
            UpnpObject::Item(i) => &i.id,
        }
    }

    pub fn parent_id(&self) -> &str {
        match self {
            UpnpObject::Container(c) => &c.parent_id,
            UpnpObject::Item(i) => &i.parent_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            UpnpObject::Container(c) => &c.title,
            UpnpObject::Item(i) => &i.title,
        }
    }

    pub fn class(&self) -> &str {
        match self {
            UpnpObject::Container(c) => &c.class,
            UpnpObject::Item(i) => &i.class,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, UpnpObject::Container(_))
    }
}

impl Container {
    /// Container `storageFolder` restreint, non cherchable, sans enfants annoncés
    pub fn storage_folder(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            restricted: 1,
            searchable: 0,
            child_count: 0,
            class: STORAGE_FOLDER_CLASS.to_string(),
            icon: None,
            title: title.into(),
            album_art: None,
        }
    }
}

impl Item {
    /// Première ressource, celle du média principal
    pub fn primary_resource(&self) -> Option<&Resource> {
        self.resources.first()
    }
}

/// Encode une séquence d'objets en document DIDL-Lite
pub fn to_didl_lite(objects: &[UpnpObject]) -> Result<String, DidlError> {
    DIDLLite::new(objects.to_vec()).to_xml()
}
