use std::io::Write;

/// Transfer statistics reported while an item is downloading. Values are the
/// engine's own human-readable renderings, `None` when it did not know them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    pub percent: Option<String>,
    pub total: Option<String>,
    pub downloaded: Option<String>,
    pub speed: Option<String>,
    pub eta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Downloading(DownloadProgress),
    Finished,
}

/// Receives progress events synchronously from [`crate::FetchEngine::download`].
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);

    /// Print a line of engine output without disturbing the progress display.
    fn println(&self, line: &str) {
        let _ = writeln!(std::io::stderr(), "{}", line);
    }
}

/// Discards every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
