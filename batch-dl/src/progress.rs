use std::io::Write;

use fetch_engine::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Single overwritten progress line on stdout.
pub struct ConsoleProgress(ProgressBar);

impl ConsoleProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        let sty = ProgressStyle::default_spinner()
            .template("  Progress: {msg}")
            .unwrap();
        pb.set_style(sty);
        Self(pb)
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        self.0.set_message(describe(event));
    }

    fn println(&self, line: &str) {
        self.0.suspend(|| {
            let _ = writeln!(std::io::stderr(), "{}", line);
        });
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        if self.0.message().is_empty() {
            self.0.finish_and_clear();
        } else {
            self.0.finish();
        }
    }
}

fn describe(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Downloading(p) => {
            let field = |f: &Option<String>| f.clone().unwrap_or_else(|| "N/A".to_owned());
            format!(
                "{} of {} at {} ETA: {}",
                field(&p.percent),
                field(&p.total),
                field(&p.speed),
                field(&p.eta)
            )
        }
        ProgressEvent::Finished => "Download complete, processing...".to_owned(),
    }
}
