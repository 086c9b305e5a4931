//! Archive document data model
//!
//! Mirrors the on-disk `archives.json` schema produced by the offline
//! fetch tooling: a top-level object with `audio` and `video` arrays of
//! archive items. Field naming on disk is mixed (`embedUrl` camelCase,
//! `created_time` snake_case); the serde attributes below preserve it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hosting platform for a playable archive item.
///
/// Unrecognized platform strings are preserved in `Other` so a single bad
/// item degrades to "no embed" instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    /// Native widget platform (audio)
    Mixcloud,
    /// Iframe-only audio platform
    Hearthis,
    /// Iframe-only video platform
    Vk,
    /// Anything else found in the document
    Other(String),
}

impl Platform {
    /// Canonical lowercase name as used in the archive document
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Mixcloud => "mixcloud",
            Platform::Hearthis => "hearthis",
            Platform::Vk => "vk",
            Platform::Other(s) => s.as_str(),
        }
    }

    /// True for platforms rendered as plain iframes (no native widget SDK)
    pub fn is_iframe_only(&self) -> bool {
        matches!(self, Platform::Hearthis | Platform::Vk)
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mixcloud" => Platform::Mixcloud,
            "hearthis" => Platform::Hearthis,
            "vk" => Platform::Vk,
            _ => Platform::Other(s),
        }
    }
}

impl From<Platform> for String {
    fn from(p: Platform) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which archive list an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// URL query parameter carrying a deep link for this kind
    pub fn param_name(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => f.write_str("audio"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// One playable unit from the archive document
///
/// Read-only once loaded; never mutated for the rest of the page session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveItem {
    /// Hosting platform
    pub platform: Platform,
    /// Display title
    pub title: String,
    /// Canonical URL on the hosting platform
    #[serde(default)]
    pub url: String,
    /// Embed endpoint URL (required for iframe-only platforms)
    #[serde(rename = "embedUrl", default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    /// Stable identifier used for deep links and highlighting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Upload timestamp; absence groups the item under the "Unknown" bucket
    #[serde(
        rename = "created_time",
        default,
        deserialize_with = "deserialize_created_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<DateTime<Utc>>,
    /// Engagement counters (display only, not behaviorally significant)
    #[serde(default)]
    pub play_count: u64,
    #[serde(default)]
    pub listener_count: u64,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub repost_count: u64,
}

impl ArchiveItem {
    /// Calendar year of the upload, if dated
    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.created_time.map(|t| t.year())
    }
}

/// Lenient timestamp parsing: the fetch tooling writes `""` for items it
/// could not date, and older entries use RFC 3339 with or without offset.
fn deserialize_created_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else { return Ok(None) };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(DateTime::parse_from_rfc3339(trimmed)
        .map(|t| t.with_timezone(&Utc))
        .ok())
}

/// Top-level archive document: `{ "audio": [...], "video": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveDocument {
    pub audio: Vec<ArchiveItem>,
    pub video: Vec<ArchiveItem>,
}

impl ArchiveDocument {
    /// Parse and validate an archive document.
    ///
    /// The shape check runs against the raw JSON value first so that a
    /// missing or non-array `audio`/`video` field surfaces as a schema
    /// error rather than a generic deserialization failure.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let obj = value
            .as_object()
            .ok_or_else(|| Error::Schema("top level must be an object".to_string()))?;
        for field in ["audio", "video"] {
            match obj.get(field) {
                Some(v) if v.is_array() => {}
                Some(_) => {
                    return Err(Error::Schema(format!("`{}` must be an array", field)));
                }
                None => {
                    return Err(Error::Schema(format!("missing `{}` array", field)));
                }
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Items for one of the two archive lists
    pub fn items(&self, kind: MediaKind) -> &[ArchiveItem] {
        match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        }
    }
}
