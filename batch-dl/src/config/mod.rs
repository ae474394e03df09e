use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::error::ConfigError;

pub use self::item::{ItemConfig, ItemEntry};
pub use self::quality::Quality;
pub use self::subtitles::{DetailedSubtitles, SubtitleSpec};

mod item;
mod quality;
mod subtitles;

/// Global settings and the ordered list of items to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub target_folder: PathBuf,
    pub default_quality: Option<Quality>,
    pub subtitles: Option<SubtitleSpec>,
    pub cookies: Option<PathBuf>,
    pub download_thumbnails: bool,
    pub write_metadata: bool,
    pub items: Vec<ItemEntry>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(deserialize_with = "deserialize_path")]
    target_folder: PathBuf,
    #[serde(default)]
    default_quality: Option<Quality>,
    #[serde(default)]
    subtitles: Option<SubtitleSpec>,
    #[serde(default, deserialize_with = "deserialize_path_option")]
    cookies: Option<PathBuf>,
    #[serde(default)]
    download_thumbnails: bool,
    #[serde(default)]
    write_metadata: bool,
    #[serde(alias = "items")]
    videos: Vec<Value>,
}

impl RunConfig {
    /// Read a YAML document, or TOML when the file has a `.toml` extension.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_owned(),
            },
            _ => ConfigError::Read {
                path: path.to_owned(),
                source,
            },
        })?;

        if contents.trim().is_empty() {
            return Err(invalid(path, "configuration file is empty"));
        }

        let document = parse_document(path, &contents)?;
        Self::from_document(path, document)
    }

    fn from_document(path: &Path, document: Value) -> Result<Self, ConfigError> {
        let root = match &document {
            Value::Null => return Err(invalid(path, "configuration file is empty")),
            Value::Mapping(root) => root,
            _ => return Err(invalid(path, "top level must be a mapping")),
        };

        if !root.contains_key("target_folder") {
            return Err(invalid(path, "'target_folder' not specified in config"));
        }

        match root.get("videos").or_else(|| root.get("items")) {
            Some(Value::Sequence(_)) => {}
            _ => return Err(invalid(path, "'videos' list not found or invalid in config")),
        }

        let raw: RawConfig =
            serde_yaml::from_value(document).map_err(|e| invalid(path, e.to_string()))?;

        Ok(Self {
            target_folder: raw.target_folder,
            default_quality: raw.default_quality,
            subtitles: raw.subtitles,
            cookies: raw.cookies,
            download_thumbnails: raw.download_thumbnails,
            write_metadata: raw.write_metadata,
            items: raw.videos.into_iter().map(ItemEntry::from_value).collect(),
        })
    }
}

fn parse_document(path: &Path, contents: &str) -> Result<Value, ConfigError> {
    let parse_error = |msg: String| ConfigError::Parse {
        path: path.to_owned(),
        msg,
    };

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        let document: toml::Value =
            toml::from_str(contents).map_err(|e| parse_error(e.message().to_owned()))?;
        serde_yaml::to_value(document).map_err(|e| parse_error(e.to_string()))
    } else {
        serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string()))
    }
}

fn invalid(path: &Path, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_owned(),
        reason: reason.into(),
    }
}

/// Render a scalar as a string, numbers and booleans included.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn deserialize_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value).ok_or_else(|| D::Error::custom("expected a string"))
}

fn deserialize_scalar_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => scalar_to_string(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected a string")),
    }
}

fn deserialize_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let s: PathBuf = Deserialize::deserialize(deserializer)?;
    expand_home(s).map_err(D::Error::custom)
}

fn deserialize_path_option<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<PathBuf> = Deserialize::deserialize(deserializer)?;
    s.map(expand_home).transpose().map_err(D::Error::custom)
}

#[cfg(unix)]
fn expand_home(path: PathBuf) -> Result<PathBuf, String> {
    use home_dir::HomeDirExt;
    path.expand_home().map_err(|e| e.to_string())
}

#[cfg(not(unix))]
fn expand_home(path: PathBuf) -> Result<PathBuf, String> {
    Ok(path)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    fn write_config(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_yaml() {
        let file = write_config(
            ".yaml",
            r#"
target_folder: ./out
default_quality: 720p
subtitles: [en, ko]
download_thumbnails: true
videos:
  - url: https://x/1
    name: A
  - url: https://x/2
    name: B
    is_playlist: true
    quality: audio
"#,
        );
        let config = RunConfig::read(file.path()).unwrap();
        assert_eq!(config.target_folder, PathBuf::from("./out"));
        assert_eq!(config.default_quality, Some(Quality::P720));
        assert_eq!(
            config.subtitles,
            Some(SubtitleSpec::Languages(vec!["en".to_owned(), "ko".to_owned()]))
        );
        assert!(config.download_thumbnails);
        assert!(!config.write_metadata);
        assert_eq!(config.cookies, None);
        assert_eq!(config.items.len(), 2);
        match &config.items[1] {
            ItemEntry::Valid(item) => {
                assert_eq!(item.name, "B");
                assert!(item.is_playlist);
                assert_eq!(item.quality, Some(Quality::Audio));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_read_items_alias() {
        let file = write_config(
            ".yml",
            "target_folder: out\nitems:\n  - {url: 'https://x/1', name: A}\n",
        );
        let config = RunConfig::read(file.path()).unwrap();
        assert_eq!(config.items.len(), 1);
    }

    #[test]
    fn test_read_toml() {
        let file = write_config(
            ".toml",
            r#"
target_folder = "out"
write_metadata = true

[[videos]]
url = "https://x/1"
name = "A"
"#,
        );
        let config = RunConfig::read(file.path()).unwrap();
        assert!(config.write_metadata);
        assert!(matches!(&config.items[0], ItemEntry::Valid(item) if item.url == "https://x/1"));
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunConfig::read(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_parse_error() {
        let file = write_config(".yaml", "target_folder: [unclosed\n");
        let err = RunConfig::read(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid() {
        for contents in [
            "",
            "   \n",
            "- just\n- a list\n",
            "videos: []\n",
            "target_folder: out\n",
            "target_folder: out\nvideos: not-a-list\n",
            "target_folder: out\nvideos: {url: x, name: y}\n",
        ] {
            let file = write_config(".yaml", contents);
            let err = RunConfig::read(file.path()).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { .. }),
                "{:?} gave {:?}",
                contents,
                err
            );
        }
    }

    #[test]
    fn test_invalid_entries_are_kept() {
        let file = write_config(
            ".yaml",
            "target_folder: out\nvideos:\n  - url: https://x/1\n  - just-a-string\n  - {url: 'https://x/2', name: 2024}\n",
        );
        let config = RunConfig::read(file.path()).unwrap();
        assert_eq!(config.items.len(), 3);
        assert!(matches!(config.items[0], ItemEntry::Invalid { .. }));
        assert!(matches!(config.items[1], ItemEntry::Invalid { .. }));
        assert!(matches!(&config.items[2], ItemEntry::Valid(item) if item.name == "2024"));
    }
}
