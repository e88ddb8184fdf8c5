//! # Moteur Browse
//!
//! Un appel Browse suit toujours le même chemin :
//!
//! ```text
//! catalogue → traduction → pagination → DIDL-Lite → réponse
//! ```
//!
//! Le premier échec court-circuite vers une [`BrowseError`]. Aucune donnée
//! n'est conservée d'un appel à l'autre, sauf le SystemUpdateID.

use super::update_id::UpdateCounter;
use crate::error::BrowseError;
use crate::translator::ObjectTranslator;
use pmocatalog::CatalogClient;
use pmodidl::{Container, UpnpObject, to_didl_lite};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// ID du container racine
pub const ROOT_ID: &str = "0";

/// Mode d'un Browse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseFlag {
    DirectChildren,
    Metadata,
}

impl BrowseFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowseFlag::DirectChildren => "BrowseDirectChildren",
            BrowseFlag::Metadata => "BrowseMetadata",
        }
    }
}

impl FromStr for BrowseFlag {
    type Err = BrowseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BrowseDirectChildren" => Ok(BrowseFlag::DirectChildren),
            "BrowseMetadata" => Ok(BrowseFlag::Metadata),
            other => Err(BrowseError::InvalidBrowseFlag(other.to_string())),
        }
    }
}

/// Requête Browse déjà extraite de l'enveloppe SOAP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    pub object_id: String,
    pub browse_flag: BrowseFlag,
    pub starting_index: u32,
    /// 0 = pas de limite
    pub requested_count: u32,
}

impl BrowseRequest {
    pub fn children(object_id: impl Into<String>, starting_index: u32, requested_count: u32) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BrowseFlag::DirectChildren,
            starting_index,
            requested_count,
        }
    }

    pub fn metadata(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BrowseFlag::Metadata,
            starting_index: 0,
            requested_count: 0,
        }
    }
}

/// Réponse Browse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseResult {
    /// Nombre d'enregistrements renvoyés par le catalogue, avant filtrage
    pub total_matches: u32,
    pub number_returned: u32,
    /// Fragment DIDL-Lite
    pub result: String,
    pub update_id: u32,
}

/// Moteur du ContentDirectory
///
/// Sans état mutable hors du compteur partagé : un même moteur sert toutes
/// les requêtes en parallèle.
#[derive(Debug, Clone)]
pub struct BrowseEngine {
    catalog: CatalogClient,
    translator: ObjectTranslator,
    update_id: Arc<UpdateCounter>,
    root_title: String,
}

impl BrowseEngine {
    pub fn new(catalog: CatalogClient, translator: ObjectTranslator, update_id: Arc<UpdateCounter>) -> Self {
        Self {
            catalog,
            translator,
            update_id,
            root_title: "PMOBridge".to_string(),
        }
    }

    /// Titre du container racine renvoyé par `BrowseMetadata` sur "0"
    pub fn with_root_title(mut self, title: impl Into<String>) -> Self {
        self.root_title = title.into();
        self
    }

    pub fn update_id(&self) -> u32 {
        self.update_id.current()
    }

    /// Signale un changement du catalogue aux points de contrôle
    pub fn notify_catalog_changed(&self) -> u32 {
        self.update_id.bump()
    }

    /// Browse vu depuis `host` (en-tête Host de la requête entrante)
    pub async fn browse(&self, request: &BrowseRequest, host: &str) -> Result<BrowseResult, BrowseError> {
        debug!(
            object_id = %request.object_id,
            browse_flag = request.browse_flag.as_str(),
            starting_index = request.starting_index,
            requested_count = request.requested_count,
            "ContentDirectory::Browse"
        );

        match request.browse_flag {
            BrowseFlag::DirectChildren => self.browse_direct_children(request, host).await,
            BrowseFlag::Metadata => self.browse_metadata(&request.object_id, host).await,
        }
    }

    async fn browse_direct_children(&self, request: &BrowseRequest, host: &str) -> Result<BrowseResult, BrowseError> {
        let records = self
            .catalog
            .browse_children(&request.object_id)
            .await
            .map_err(|e| {
                warn!(object_id = %request.object_id, error = %e, "catalog browse failed");
                BrowseError::from(e)
            })?;

        let total_matches = records.len();
        let objects: Vec<UpnpObject> = records
            .iter()
            .filter_map(|record| self.translator.translate(record, host))
            .collect();

        let page = paginate(objects, request.starting_index, request.requested_count);
        self.respond(&page, total_matches)
    }

    async fn browse_metadata(&self, object_id: &str, host: &str) -> Result<BrowseResult, BrowseError> {
        if object_id == ROOT_ID {
            let root = Container::storage_folder(ROOT_ID, "-1", self.root_title.clone());
            return self.respond(&[UpnpObject::Container(root)], 1);
        }

        let record = self.catalog.fetch_object(object_id).await.map_err(|e| {
            warn!(object_id, error = %e, "catalog object lookup failed");
            BrowseError::from(e)
        })?;

        let object = self
            .translator
            .translate(&record, host)
            .ok_or_else(|| BrowseError::NoSuchObject(object_id.to_string()))?;

        self.respond(&[object], 1)
    }

    fn respond(&self, objects: &[UpnpObject], total_matches: usize) -> Result<BrowseResult, BrowseError> {
        let result = to_didl_lite(objects)?;
        let result = BrowseResult {
            total_matches: saturating_u32(total_matches),
            number_returned: saturating_u32(objects.len()),
            result,
            update_id: self.update_id.current(),
        };
        debug!(
            "✅ Browse completed: returned={}, total={}",
            result.number_returned, result.total_matches
        );
        Ok(result)
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Découpe une page : `starting_index` borné à la longueur, `requested_count`
/// à 0 pour tout le reste
pub fn paginate<T>(objects: Vec<T>, starting_index: u32, requested_count: u32) -> Vec<T> {
    let start = (starting_index as usize).min(objects.len());
    let remaining = objects.into_iter().skip(start);
    if requested_count == 0 {
        remaining.collect()
    } else {
        remaining.take(requested_count as usize).collect()
    }
}
