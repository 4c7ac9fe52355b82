//! Data models for cataloged items.
//!
//! An item is the unit of cataloging: one logical artifact made of one or
//! more staged files. Which optional fields apply is decided entirely by the
//! item's type, so the stores never need to branch on it.

use serde::{Deserialize, Serialize};

/// Type of a cataloged item.
///
/// Fixed at creation, never changed afterward. The type decides which
/// optional fields are collected and which file-grouping rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    /// Audio captured from an external source.
    ArchivedAudio,
    /// Image captured from an external source.
    ArchivedImage,
    /// Software artifact, possibly spanning multiple files.
    Software,
    /// Screen capture.
    Screenshot,
    /// Photographed physical object, possibly spanning multiple files.
    Physical,
}

impl ItemType {
    /// All known types, in prompt display order.
    pub const ALL: [ItemType; 5] = [
        Self::ArchivedAudio,
        Self::ArchivedImage,
        Self::Software,
        Self::Screenshot,
        Self::Physical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArchivedAudio => "archived-audio",
            Self::ArchivedImage => "archived-image",
            Self::Software => "software",
            Self::Screenshot => "screenshot",
            Self::Physical => "physical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "archived-audio" => Some(Self::ArchivedAudio),
            "archived-image" => Some(Self::ArchivedImage),
            "software" => Some(Self::Software),
            "screenshot" => Some(Self::Screenshot),
            "physical" => Some(Self::Physical),
            _ => None,
        }
    }

    /// Pixel dimensions are probed from the primary file.
    pub fn has_display_dimensions(&self) -> bool {
        !matches!(self, Self::ArchivedAudio)
    }

    /// Items of this type span a `name-1.ext`, `name-2.ext`, ... sequence.
    pub fn has_multiple_files(&self) -> bool {
        matches!(self, Self::Software | Self::Physical)
    }

    /// Every file of the item must have an upscaled counterpart in staging.
    pub fn has_upscaled_versions(&self) -> bool {
        matches!(self, Self::ArchivedImage | Self::Software | Self::Screenshot)
    }

    /// Archived content keeps its original filename as the item name and
    /// records where it was taken from; other types get a display name.
    pub fn has_original_source(&self) -> bool {
        matches!(self, Self::ArchivedAudio | Self::ArchivedImage)
    }

    pub fn has_creators(&self) -> bool {
        matches!(self, Self::Software)
    }

    pub fn has_website_url(&self) -> bool {
        !matches!(self, Self::Physical)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The catalog record persisted per item.
///
/// Serialized as the JSON document stored in the catalog database and
/// mirrored verbatim as `data.json` inside the item's cataloged directory.
/// Fields that don't apply to the item's type are omitted entirely rather
/// than written as nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Identifier assigned by the catalog store at insert time.
    /// `None` until the record has been inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name, or the carried-over original filename for
    /// source-bearing types.
    pub name: String,

    pub item_type: ItemType,

    /// Unix milliseconds, captured when the record is first assembled.
    pub date_added: i64,

    /// The reconciled file set: sorted, deduplicated, never empty.
    pub filenames: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_height: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_source_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creators: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    pub description: String,

    pub tags: Vec<String>,
}

impl ItemRecord {
    /// Start a record for a reconciled file set. Optional fields are filled
    /// in by the schema builder according to the type.
    pub fn new(name: impl Into<String>, item_type: ItemType, filenames: Vec<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            item_type,
            date_added: chrono::Utc::now().timestamp_millis(),
            filenames,
            display_width: None,
            display_height: None,
            original_source_url: None,
            creators: None,
            website_url: None,
            description: String::new(),
            tags: Vec::new(),
        }
    }
}
