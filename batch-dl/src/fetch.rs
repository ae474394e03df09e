use std::time::{Duration, Instant};

use fetch_engine::{EngineError, FetchEngine, FetchSpec};

use crate::log::RunLog;

/// A fetch that did not complete, with the time spent on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub error: String,
    pub duration: Duration,
}

/// Probe `url`, then download it. Engine errors are returned as
/// [`FetchFailure`] carrying the engine's message.
///
/// A URL that turns out to be a collection while `spec` does not ask for
/// one is narrowed down to its first entry.
pub async fn fetch(
    engine: &dyn FetchEngine,
    mut spec: FetchSpec,
    url: &str,
    log: &mut RunLog,
) -> Result<Duration, FetchFailure> {
    let start = Instant::now();
    let fail = |e: EngineError| FetchFailure {
        error: e.to_string(),
        duration: start.elapsed(),
    };

    spec.quiet = log.is_structured();

    let info = engine.probe(&spec, url).await.map_err(fail)?;
    if let Some(count) = info.entry_count() {
        log.info(format!("Detected playlist with {} videos", count));
        if !spec.playlist {
            log.warn("This is a playlist. Set 'is_playlist: true' to download all videos.");
            log.info("Downloading only the first video...");
            spec.first_entry_only = true;
        }
    }

    let progress = log.progress_sink();
    let result = engine.download(&spec, url, &*progress).await;
    drop(progress);
    let summary = result.map_err(fail)?;

    for error in summary.entry_errors {
        log.warn(format!("Playlist entry failed: {}", error));
    }

    Ok(start.elapsed())
}
