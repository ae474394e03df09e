use std::fmt::Display;

use serde::{Deserialize, Deserializer};

/// Subtitle settings as written in the config file.
///
/// Accepted shapes are `true` or `"auto"` for auto-generated English, a single
/// language code, a list of language codes, or a mapping with `enabled`,
/// `auto` and `languages` keys. `false`, an empty string and an empty list
/// turn subtitles off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleSpec {
    Off,
    Auto,
    Language(String),
    Languages(Vec<String>),
    Detailed(DetailedSubtitles),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailedSubtitles {
    pub enabled: Option<bool>,
    pub auto: Option<bool>,
    pub languages: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSubtitles {
    Flag(bool),
    Language(String),
    Languages(Vec<String>),
    Detailed(RawDetailed),
}

#[derive(Deserialize)]
struct RawDetailed {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    auto: Option<bool>,
    #[serde(default)]
    languages: Option<OneOrMany>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<RawSubtitles> for SubtitleSpec {
    fn from(raw: RawSubtitles) -> Self {
        match raw {
            RawSubtitles::Flag(true) => Self::Auto,
            RawSubtitles::Flag(false) => Self::Off,
            RawSubtitles::Language(lang) if lang.is_empty() => Self::Off,
            RawSubtitles::Language(lang) if lang == "auto" => Self::Auto,
            RawSubtitles::Language(lang) => Self::Language(lang),
            RawSubtitles::Languages(langs) if langs.is_empty() => Self::Off,
            RawSubtitles::Languages(langs) => Self::Languages(langs),
            RawSubtitles::Detailed(d) => Self::Detailed(DetailedSubtitles {
                enabled: d.enabled,
                auto: d.auto,
                languages: d.languages.map(|l| match l {
                    OneOrMany::One(lang) => vec![lang],
                    OneOrMany::Many(langs) => langs,
                }),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for SubtitleSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawSubtitles::deserialize(deserializer).map(Self::from)
    }
}

impl Display for SubtitleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Auto => write!(f, "auto"),
            Self::Language(lang) => write!(f, "{}", lang),
            Self::Languages(langs) => write!(f, "{}", langs.join(", ")),
            Self::Detailed(d) => {
                write!(
                    f,
                    "enabled: {}, auto: {}",
                    d.enabled.unwrap_or(true),
                    d.auto.unwrap_or(true)
                )?;
                if let Some(langs) = &d.languages {
                    write!(f, ", languages: {}", langs.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(yaml: &str) -> SubtitleSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_shapes() {
        assert_eq!(parse("true"), SubtitleSpec::Auto);
        assert_eq!(parse("auto"), SubtitleSpec::Auto);
        assert_eq!(parse("false"), SubtitleSpec::Off);
        assert_eq!(parse("''"), SubtitleSpec::Off);
        assert_eq!(parse("[]"), SubtitleSpec::Off);
        assert_eq!(parse("ko"), SubtitleSpec::Language("ko".to_owned()));
        assert_eq!(
            parse("[en, ja]"),
            SubtitleSpec::Languages(vec!["en".to_owned(), "ja".to_owned()])
        );
    }

    #[test]
    fn test_detailed() {
        assert_eq!(
            parse("{auto: false, languages: fr}"),
            SubtitleSpec::Detailed(DetailedSubtitles {
                enabled: None,
                auto: Some(false),
                languages: Some(vec!["fr".to_owned()]),
            })
        );
        assert_eq!(
            parse("{enabled: true}"),
            SubtitleSpec::Detailed(DetailedSubtitles {
                enabled: Some(true),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_rejects_other_types() {
        assert!(serde_yaml::from_str::<SubtitleSpec>("[1, [2]]").is_err());
    }
}
