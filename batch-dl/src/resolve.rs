use std::fmt::Display;
use std::path::{Path, PathBuf};

use fetch_engine::{FetchSpec, SubtitleOptions};
use indexmap::IndexSet;

use crate::config::{ItemConfig, Quality, RunConfig, SubtitleSpec};

/// Container requested when separate video and audio streams are merged.
const MERGE_OUTPUT_FORMAT: &str = "mp4";

/// Non-fatal problem found while resolving an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    CookieFileMissing(PathBuf),
}

impl Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CookieFileMissing(path) => write!(f, "Cookie file not found: {}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub spec: FetchSpec,
    pub warnings: Vec<ResolveWarning>,
}

/// Merge the item's settings over the global ones. Item settings win, then
/// global settings, then built-in defaults.
pub fn resolve(item: &ItemConfig, global: &RunConfig) -> Resolution {
    let mut warnings = vec![];

    let format = match &item.format {
        Some(format) => format.clone(),
        None => item
            .quality
            .as_ref()
            .or(global.default_quality.as_ref())
            .unwrap_or(&Quality::Best)
            .selector()
            .into_owned(),
    };

    let subtitles = item
        .subtitles
        .as_ref()
        .or(global.subtitles.as_ref())
        .and_then(subtitle_options);

    let cookies = item
        .cookies
        .as_ref()
        .or(global.cookies.as_ref())
        .and_then(|path| {
            if path.exists() {
                Some(path.clone())
            } else {
                warnings.push(ResolveWarning::CookieFileMissing(path.clone()));
                None
            }
        });

    let spec = FetchSpec {
        output_template: output_template(&global.target_folder, &item.name, item.is_playlist),
        format,
        merge_output_format: Some(MERGE_OUTPUT_FORMAT.to_owned()),
        subtitles,
        cookies,
        write_thumbnail: item.thumbnail.unwrap_or(global.download_thumbnails),
        write_info_json: item.metadata.unwrap_or(global.write_metadata),
        playlist: item.is_playlist,
        first_entry_only: false,
        quiet: false,
    };

    Resolution { spec, warnings }
}

fn output_template(target_folder: &Path, name: &str, is_playlist: bool) -> PathBuf {
    if is_playlist {
        target_folder
            .join(name)
            .join("%(playlist_index)s - %(title)s.%(ext)s")
    } else {
        target_folder.join(format!("{}.%(ext)s", name))
    }
}

/// `None` means no subtitle options are passed to the engine at all.
pub fn subtitle_options(spec: &SubtitleSpec) -> Option<SubtitleOptions> {
    let (write_subtitles, write_auto_subtitles, languages) = match spec {
        SubtitleSpec::Off => return None,
        SubtitleSpec::Auto => (true, true, vec!["en".to_owned()]),
        SubtitleSpec::Language(lang) => (true, true, vec![lang.clone()]),
        SubtitleSpec::Languages(langs) => (true, true, langs.clone()),
        SubtitleSpec::Detailed(d) => (
            d.enabled.unwrap_or(true),
            d.auto.unwrap_or(true),
            d.languages.clone().unwrap_or_else(|| vec!["en".to_owned()]),
        ),
    };

    let languages: IndexSet<String> = languages.into_iter().collect();
    Some(SubtitleOptions {
        write_subtitles,
        write_auto_subtitles,
        languages: languages.into_iter().collect(),
    })
}
