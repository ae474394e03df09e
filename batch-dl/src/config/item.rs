use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;

use super::{Quality, SubtitleSpec};

/// One configured download. Unset options fall back to the global settings.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ItemConfig {
    #[serde(deserialize_with = "super::deserialize_scalar")]
    pub url: String,
    /// Output file stem, or subdirectory name for playlists
    #[serde(deserialize_with = "super::deserialize_scalar")]
    pub name: String,
    #[serde(default)]
    pub is_playlist: bool,
    #[serde(default)]
    pub quality: Option<Quality>,
    /// Raw format selector, takes precedence over `quality`
    #[serde(default, deserialize_with = "super::deserialize_scalar_option")]
    pub format: Option<String>,
    #[serde(default)]
    pub subtitles: Option<SubtitleSpec>,
    #[serde(default, deserialize_with = "super::deserialize_path_option")]
    pub cookies: Option<PathBuf>,
    #[serde(default)]
    pub thumbnail: Option<bool>,
    #[serde(default)]
    pub metadata: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemEntry {
    Valid(ItemConfig),
    /// An entry that could not be understood, kept so it shows up in the report
    Invalid { entry: String, reason: String },
}

impl ItemEntry {
    pub(crate) fn from_value(value: Value) -> Self {
        let has_required = value.as_mapping().is_some_and(|m| {
            ["url", "name"]
                .iter()
                .all(|key| m.get(*key).is_some_and(|v| !v.is_null()))
        });
        if !has_required {
            return Self::Invalid {
                entry: render_entry(&value),
                reason: "Invalid format (missing url or name)".to_owned(),
            };
        }

        match serde_yaml::from_value(value.clone()) {
            Ok(item) => Self::Valid(item),
            Err(e) => Self::Invalid {
                entry: render_entry(&value),
                reason: format!("Invalid format ({})", e),
            },
        }
    }
}

fn render_entry(value: &Value) -> String {
    if let Some(s) = super::scalar_to_string(value) {
        return s;
    }
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}
