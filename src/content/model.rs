//! Entry and asset models as served by the content API

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

/// Content type of portfolio entries
pub const WORK: &str = "work";

/// Content type of blog posts
pub const BLOG: &str = "blog";

/// System metadata attached to every entry and asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
}

impl Sys {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            updated_at: None,
            content_type: None,
        }
    }
}

/// Reference to another record by id; never embeds the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

impl Link {
    pub fn to(id: impl Into<String>, link_type: &str) -> Self {
        Self {
            sys: LinkSys {
                id: id.into(),
                link_type: Some(link_type.to_string()),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// Accept `id` only if it is usable as a single URL path segment and
/// file name; anything else is reported as not found.
pub fn check_id(id: &str) -> Result<&str> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(|c: char| c == '/' || c == '\\' || c.is_control());
    if valid {
        Ok(id)
    } else {
        Err(SiteError::NotFound(id.to_string()))
    }
}

/// A content record with a content-type-specific field set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<F> {
    pub sys: Sys,
    pub fields: F,
}

/// Entry whose fields have not been decoded yet
pub type RawEntry = Entry<serde_json::Value>;

impl<F> Entry<F> {
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

impl RawEntry {
    /// Content type id, if the store reported one
    pub fn content_type(&self) -> Option<&str> {
        self.sys.content_type.as_ref().map(Link::id)
    }

    /// Decode the field bag into a typed shape
    pub fn decode<F: DeserializeOwned>(&self, kind: &'static str) -> Result<Entry<F>> {
        let fields = serde_json::from_value(self.fields.clone()).map_err(|source| {
            SiteError::Decode {
                kind,
                id: self.sys.id.clone(),
                source,
            }
        })?;
        Ok(Entry {
            sys: self.sys.clone(),
            fields,
        })
    }
}

/// Fields of a `work` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkFields {
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<Link>,
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields of a `blog` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogFields {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub markdown: String,
}

/// A media record referenced from entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub sys: Sys,
    pub fields: AssetFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFields {
    #[serde(default)]
    pub title: Option<String>,
    pub file: AssetFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
    pub url: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl Asset {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            sys: Sys::new(id),
            fields: AssetFields {
                title: None,
                file: AssetFile {
                    url: url.into(),
                    file_name: None,
                    content_type: None,
                },
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn url(&self) -> &str {
        &self.fields.file.url
    }
}

/// Collection response of a listing query
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: usize,
}

/// Listing query: content-type filter plus ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub content_type: String,
    pub order: String,
}

impl EntryQuery {
    /// Entries of one content type, newest first
    pub fn newest(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            order: "-sys.createdAt".to_string(),
        }
    }

    pub fn params(&self) -> [(&'static str, &str); 2] {
        [
            ("content_type", self.content_type.as_str()),
            ("order", self.order.as_str()),
        ]
    }
}
