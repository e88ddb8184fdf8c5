//! Data models for the catalog API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// One record of the catalog, as returned by `/browse` and `/object`
///
/// Every field falls back to its default when missing, `null` or of the
/// wrong shape, so one odd record never fails the whole array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(rename = "parent_id", alias = "parentId", deserialize_with = "null_as_default")]
    pub parent_id: String,

    #[serde(rename = "is_directory", alias = "isDirectory", deserialize_with = "null_as_default")]
    pub is_directory: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(
        rename = "mime_type",
        alias = "mimeType",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub mime_type: Option<String>,

    /// Required unless the record is a directory
    #[serde(
        rename = "media_url",
        alias = "mediaUrl",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub media_url: Option<String>,

    #[serde(
        rename = "thumbnail_url",
        alias = "thumbnailUrl",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_url: Option<String>,

    /// Size in bytes
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Bits per second
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,

    /// Duration in seconds, possibly fractional
    #[serde(
        rename = "duration",
        alias = "durationSeconds",
        alias = "duration_seconds",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<f64>,

    /// e.g. "1920x1080"
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// `null` decodes as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any value that does not fit `T` decodes as `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl CatalogItem {
    /// Directory record
    pub fn directory(id: impl Into<String>, parent_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            is_directory: true,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Media record with its MIME type and origin URL
    pub fn media(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        title: impl Into<String>,
        mime_type: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            title: title.into(),
            mime_type: Some(mime_type.into()),
            media_url: Some(media_url.into()),
            ..Default::default()
        }
    }

    /// Media URL, `None` when absent or empty
    pub fn media_url(&self) -> Option<&str> {
        self.media_url.as_deref().filter(|u| !u.is_empty())
    }

    /// Thumbnail URL, `None` when absent or empty
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref().filter(|u| !u.is_empty())
    }

    /// MIME type, empty string when absent
    pub fn mime_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or("")
    }
}
