use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Named quality preset, or any other string used verbatim as a format selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quality {
    Best,
    P2160,
    P1440,
    P1080,
    P720,
    P480,
    P360,
    Audio,
    Other(String),
}

impl Quality {
    /// Format selector for this preset. Resolution presets pick the largest
    /// video no taller than the preset plus the best audio.
    pub fn selector(&self) -> Cow<'_, str> {
        let height = match self {
            Self::Best => return Cow::Borrowed("bestvideo+bestaudio/best"),
            Self::Audio => return Cow::Borrowed("bestaudio/best"),
            Self::Other(selector) => return Cow::Borrowed(selector.as_str()),
            Self::P2160 => 2160,
            Self::P1440 => 1440,
            Self::P1080 => 1080,
            Self::P720 => 720,
            Self::P480 => 480,
            Self::P360 => 360,
        };
        Cow::Owned(format!(
            "bestvideo[height<={h}]+bestaudio/best[height<={h}]",
            h = height
        ))
    }
}

impl FromStr for Quality {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quality = match s.to_lowercase().as_str() {
            "best" => Self::Best,
            "2160p" => Self::P2160,
            "1440p" => Self::P1440,
            "1080p" => Self::P1080,
            "720p" => Self::P720,
            "480p" => Self::P480,
            "360p" => Self::P360,
            "audio" => Self::Audio,
            _ => Self::Other(s.to_owned()),
        };
        Ok(quality)
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Best => "best",
            Self::P2160 => "2160p",
            Self::P1440 => "1440p",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
            Self::P480 => "480p",
            Self::P360 => "360p",
            Self::Audio => "audio",
            Self::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl<'de> Deserialize<'de> for Quality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = super::deserialize_scalar(deserializer)?;
        Ok(Self::from_str(&s).unwrap_or_else(|never| match never {}))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn selector(s: &str) -> String {
        s.parse::<Quality>().unwrap().selector().into_owned()
    }

    #[test]
    fn test_quality_table() {
        assert_eq!(selector("best"), "bestvideo+bestaudio/best");
        assert_eq!(selector("audio"), "bestaudio/best");
        for height in [2160, 1440, 1080, 720, 480, 360] {
            assert_eq!(
                selector(&format!("{}p", height)),
                format!(
                    "bestvideo[height<={0}]+bestaudio/best[height<={0}]",
                    height
                )
            );
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!("1080P".parse::<Quality>().unwrap(), Quality::P1080);
        assert_eq!("BEST".parse::<Quality>().unwrap(), Quality::Best);
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(selector("worstvideo+worstaudio"), "worstvideo+worstaudio");
        assert_eq!(selector("4320p"), "4320p");
        assert_eq!(
            "Bestvideo[ext=MP4]".parse::<Quality>().unwrap(),
            Quality::Other("Bestvideo[ext=MP4]".to_owned())
        );
    }

    #[test]
    fn test_deserialize_number() {
        let quality: Quality = serde_yaml::from_str("720").unwrap();
        assert_eq!(quality, Quality::Other("720".to_owned()));
    }
}
