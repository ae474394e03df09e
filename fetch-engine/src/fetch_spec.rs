use std::path::PathBuf;

/// Fully resolved parameters for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSpec {
    /// Output path template, may contain engine fields such as `%(ext)s`
    pub output_template: PathBuf,
    /// Format selector expression
    pub format: String,
    /// Container used when separate video and audio streams are merged
    pub merge_output_format: Option<String>,
    /// `None` means no subtitle options are passed at all
    pub subtitles: Option<SubtitleOptions>,
    pub cookies: Option<PathBuf>,
    pub write_thumbnail: bool,
    pub write_info_json: bool,
    /// Fetch a whole collection, tolerating failures of individual entries
    pub playlist: bool,
    /// Restrict a collection to its first entry
    pub first_entry_only: bool,
    /// Suppress all engine console output, including progress
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOptions {
    pub write_subtitles: bool,
    pub write_auto_subtitles: bool,
    pub languages: Vec<String>,
}
