mod engine;
mod error;
mod fetch_spec;
mod progress;
mod ytdlp;

pub use engine::{DownloadSummary, FetchEngine, ProbeInfo};
pub use error::EngineError;
pub use fetch_spec::{FetchSpec, SubtitleOptions};
pub use progress::{DownloadProgress, NoProgress, ProgressEvent, ProgressSink};
pub use ytdlp::YtDlp;
