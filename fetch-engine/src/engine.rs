use async_trait::async_trait;
use serde::Deserialize;

use crate::{EngineError, FetchSpec, ProgressSink};

/// An external media fetcher.
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// Resolve metadata for `url` without downloading anything.
    async fn probe(&self, spec: &FetchSpec, url: &str) -> Result<ProbeInfo, EngineError>;

    /// Download `url` as described by `spec`, reporting progress to `progress`.
    async fn download(
        &self,
        spec: &FetchSpec,
        url: &str,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadSummary, EngineError>;
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProbeInfo {
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub entries: Option<Vec<serde_json::Value>>,
}

impl ProbeInfo {
    /// Number of entries when the URL resolved to a collection.
    pub fn entry_count(&self) -> Option<usize> {
        match (&self.entries, self.kind.as_deref()) {
            (Some(entries), _) => Some(entries.len()),
            (None, Some("playlist")) => Some(0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Errors of individual collection entries that did not abort the fetch
    pub entry_errors: Vec<String>,
}
