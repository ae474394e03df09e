use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::log::{LogEntry, RunLog};

const RULE_WIDTH: usize = 60;

#[derive(Serialize, Debug, Clone)]
pub struct Downloaded {
    pub name: String,
    pub url: String,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub timestamp: DateTime<Local>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Skipped {
    pub name: String,
    pub url: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Failed {
    #[serde(flatten)]
    pub subject: FailedSubject,
    pub error: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secs_option"
    )]
    pub duration: Option<Duration>,
    pub timestamp: DateTime<Local>,
}

/// What a failure refers to: a configured item, or an entry that could not
/// be read as one.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FailedSubject {
    Item { name: String, url: String },
    Entry { entry: String },
}

#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Successful(Downloaded),
    Skipped(Skipped),
    Failed(Failed),
}

impl ItemOutcome {
    pub fn successful(name: &str, url: &str, duration: Duration) -> Self {
        Self::Successful(Downloaded {
            name: name.to_owned(),
            url: url.to_owned(),
            duration,
            timestamp: Local::now(),
        })
    }

    pub fn skipped(name: &str, url: &str) -> Self {
        Self::Skipped(Skipped {
            name: name.to_owned(),
            url: url.to_owned(),
            timestamp: Local::now(),
        })
    }

    pub fn failed(name: &str, url: &str, error: impl Into<String>, duration: Duration) -> Self {
        Self::Failed(Failed {
            subject: FailedSubject::Item {
                name: name.to_owned(),
                url: url.to_owned(),
            },
            error: error.into(),
            duration: Some(duration),
            timestamp: Local::now(),
        })
    }

    pub fn invalid_entry(entry: &str, error: impl Into<String>) -> Self {
        Self::Failed(Failed {
            subject: FailedSubject::Entry {
                entry: entry.to_owned(),
            },
            error: error.into(),
            duration: None,
            timestamp: Local::now(),
        })
    }
}

/// Results of one run, buckets in processing order.
#[derive(Serialize, Debug, Clone)]
pub struct RunReport {
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    #[serde(rename = "config_file")]
    pub config_path: PathBuf,
    #[serde(rename = "target_folder")]
    pub resolved_target_folder: PathBuf,
    #[serde(rename = "total_videos")]
    pub total_items: usize,
    pub successful: Vec<Downloaded>,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<Failed>,
    pub logs: Vec<LogEntry>,
}

impl RunReport {
    pub fn new(
        config_path: impl Into<PathBuf>,
        resolved_target_folder: impl Into<PathBuf>,
        total_items: usize,
    ) -> Self {
        Self {
            start_time: Local::now(),
            end_time: None,
            config_path: config_path.into(),
            resolved_target_folder: resolved_target_folder.into(),
            total_items,
            successful: vec![],
            skipped: vec![],
            failed: vec![],
            logs: vec![],
        }
    }

    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Successful(o) => self.successful.push(o),
            ItemOutcome::Skipped(o) => self.skipped.push(o),
            ItemOutcome::Failed(o) => self.failed.push(o),
        }
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Local::now());
    }

    /// Number of outcomes recorded so far.
    pub fn recorded(&self) -> usize {
        self.successful.len() + self.skipped.len() + self.failed.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_summary(&self, mut out: impl Write) -> std::io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(out)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "DOWNLOAD SUMMARY")?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "Total videos processed: {}", self.total_items)?;
        writeln!(out, "Successfully downloaded: {}", self.successful.len())?;
        writeln!(out, "Skipped (already exist): {}", self.skipped.len())?;
        writeln!(out, "Failed: {}", self.failed.len())?;

        if !self.skipped.is_empty() {
            writeln!(out)?;
            writeln!(out, "Skipped videos:")?;
            for item in &self.skipped {
                writeln!(out, "  - {}", item.name)?;
            }
        }

        if !self.failed.is_empty() {
            writeln!(out)?;
            writeln!(out, "Failed downloads:")?;
            for item in &self.failed {
                match &item.subject {
                    FailedSubject::Item { name, url } => {
                        writeln!(out, "  - {}", name)?;
                        writeln!(out, "    URL: {}", url)?;
                    }
                    FailedSubject::Entry { entry } => writeln!(out, "  - {}", entry)?,
                }
                writeln!(out, "    Error: {}", item.error)?;
            }
        }

        writeln!(out, "{}", rule)?;
        Ok(())
    }
}

/// Render the finished report in the mode `log` was created for.
pub fn emit(
    mut report: RunReport,
    log: RunLog,
    log_file: Option<&Path>,
    mut out: impl Write,
) -> anyhow::Result<()> {
    if log.is_structured() {
        report.logs = log.into_entries();
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        report.write_summary(&mut out)?;
        if let Some(path) = log_file {
            writeln!(out)?;
            writeln!(out, "Log file saved to: {}", path.display())?;
        }
    }

    Ok(())
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

fn serialize_secs_option<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serialize_secs(d, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn report() -> RunReport {
        let mut report = RunReport::new("videos.yaml", "/data/out", 4);
        report.record(ItemOutcome::successful(
            "A",
            "https://x/1",
            Duration::from_millis(1500),
        ));
        report.record(ItemOutcome::skipped("B", "https://x/2"));
        report.record(ItemOutcome::failed(
            "C",
            "https://x/3",
            "ERROR: Video unavailable",
            Duration::from_secs(2),
        ));
        report.record(ItemOutcome::invalid_entry(
            r#"{"url":"https://x/4"}"#,
            "Invalid format (missing url or name)",
        ));
        report.finish();
        report
    }

    #[test]
    fn test_buckets() {
        let report = report();
        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.recorded(), report.total_items);
        assert!(report.end_time.is_some());
    }

    #[test]
    fn test_json() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["config_file"], "videos.yaml");
        assert_eq!(json["target_folder"], "/data/out");
        assert_eq!(json["total_videos"], 4);
        assert!(json["start_time"].is_string());
        assert!(json["end_time"].is_string());
        assert_eq!(json["logs"], serde_json::json!([]));

        let successful = &json["successful"][0];
        assert_eq!(successful["name"], "A");
        assert_eq!(successful["duration"], 1.5);
        assert!(successful["timestamp"].is_string());

        assert_eq!(json["skipped"][0]["url"], "https://x/2");
        assert!(json["skipped"][0].get("duration").is_none());

        let failed = &json["failed"][0];
        assert_eq!(failed["name"], "C");
        assert_eq!(failed["error"], "ERROR: Video unavailable");
        assert_eq!(failed["duration"], 2.0);

        let invalid = &json["failed"][1];
        assert_eq!(invalid["entry"], r#"{"url":"https://x/4"}"#);
        assert!(invalid.get("name").is_none());
        assert!(invalid.get("duration").is_none());
    }

    #[test]
    fn test_summary() {
        let mut out = vec![];
        report().write_summary(&mut out).unwrap();
        let summary = String::from_utf8(out).unwrap();
        let expected = format!(
            "\n{rule}\nDOWNLOAD SUMMARY\n{rule}\n\
             Total videos processed: 4\n\
             Successfully downloaded: 1\n\
             Skipped (already exist): 1\n\
             Failed: 2\n\
             \nSkipped videos:\n  - B\n\
             \nFailed downloads:\n\
             \x20 - C\n    URL: https://x/3\n    Error: ERROR: Video unavailable\n\
             \x20 - {{\"url\":\"https://x/4\"}}\n    Error: Invalid format (missing url or name)\n\
             {rule}\n",
            rule = "=".repeat(60)
        );
        assert_eq!(summary, expected);
    }

    #[test]
    fn test_emit_structured() {
        let mut log = RunLog::structured();
        log.warn("Cookie file not found: c.txt");

        let mut out = vec![];
        emit(report(), log, Some(Path::new("run.log")), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["total_videos"], 4);
        assert_eq!(json["logs"][0]["level"], "WARNING");
        assert_eq!(json["logs"][0]["message"], "Cookie file not found: c.txt");
        assert!(!String::from_utf8(out).unwrap().contains("Log file saved to"));
    }

    #[test]
    fn test_emit_summary() {
        let log = RunLog::console(None).unwrap();

        let mut out = vec![];
        emit(report(), log, Some(Path::new("run.log")), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("DOWNLOAD SUMMARY"));
        assert!(text.ends_with("\nLog file saved to: run.log\n"));

        let mut out = vec![];
        emit(report(), RunLog::console(None).unwrap(), None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Log file saved to"));
    }

    #[test]
    fn test_summary_without_details() {
        let mut out = vec![];
        RunReport::new("c.yaml", "out", 0)
            .write_summary(&mut out)
            .unwrap();
        let summary = String::from_utf8(out).unwrap();
        assert!(!summary.contains("Skipped videos:"));
        assert!(!summary.contains("Failed downloads:"));
    }
}
