//! Traduction d'un enregistrement catalogue en objet UPnP
//!
//! Les URLs exposées aux clients DLNA pointent toutes vers le proxy média
//! du bridge : `http://<host><proxy_path>?url=<origine encodée>`.
//!
//! Un enregistrement inexploitable (média sans URL, type non média) est
//! filtré : [`ObjectTranslator::translate`] renvoie `None`, jamais une erreur.

use crate::dlna::{JPEG_THUMBNAIL_PROTOCOL_INFO, format_duration};
use crate::mime::{self, MajorKind};
use pmocatalog::CatalogItem;
use pmodidl::{Container, Item, Resource, UpnpObject};

#[derive(Debug, Clone)]
pub struct ObjectTranslator {
    proxy_path: String,
    guess_mime_from_url: bool,
}

impl ObjectTranslator {
    pub fn new(proxy_path: impl Into<String>) -> Self {
        Self {
            proxy_path: proxy_path.into(),
            guess_mime_from_url: false,
        }
    }

    /// Devine le type MIME depuis l'URL média quand le catalogue n'en donne pas
    pub fn with_mime_guessing(mut self, enabled: bool) -> Self {
        self.guess_mime_from_url = enabled;
        self
    }

    pub fn proxy_path(&self) -> &str {
        &self.proxy_path
    }

    /// URL du proxy pour une origine donnée
    pub fn proxy_url(&self, host: &str, origin: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(origin.as_bytes()).collect();
        format!("http://{}{}?url={}", host, self.proxy_path, encoded)
    }

    /// Container ou item pour `item`, vu depuis `host`
    ///
    /// Déterministe : même entrée, même objet.
    pub fn translate(&self, item: &CatalogItem, host: &str) -> Option<UpnpObject> {
        if item.is_directory {
            return Some(UpnpObject::Container(Container::storage_folder(
                item.id.clone(),
                item.parent_id.clone(),
                item.title.clone(),
            )));
        }

        let media_url = item.media_url()?;

        let mime_type = match item.mime_type() {
            "" if self.guess_mime_from_url => mime::mime_type_by_path(media_url)?,
            declared => declared,
        };
        let class = mime::classify(mime_type);
        let upnp_class = class.upnp_class()?;

        let icon = item.thumbnail_url().map(|thumb| self.proxy_url(host, thumb));

        let mut resources = vec![Resource {
            protocol_info: class.dlna_features().protocol_info(mime_type),
            size: item.size.filter(|s| *s > 0),
            bitrate: item
                .bitrate
                .filter(|b| *b > 0)
                .and_then(|b| u32::try_from(b).ok()),
            duration: item.duration_seconds.and_then(format_duration),
            resolution: item.resolution.clone().filter(|r| !r.is_empty()),
            url: self.proxy_url(host, media_url),
        }];

        if let Some(icon) = &icon
            && matches!(class.major_kind, MajorKind::Video | MajorKind::Image)
        {
            resources.push(Resource {
                protocol_info: JPEG_THUMBNAIL_PROTOCOL_INFO.to_string(),
                size: None,
                bitrate: None,
                duration: None,
                resolution: None,
                url: icon.clone(),
            });
        }

        Some(UpnpObject::Item(Item {
            id: item.id.clone(),
            parent_id: item.parent_id.clone(),
            restricted: 1,
            searchable: 0,
            class: upnp_class,
            album_art: icon.clone(),
            icon,
            title: item.title.clone(),
            resources,
        }))
    }
}
