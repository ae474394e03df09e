use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::progress::DownloadProgress;
use crate::{
    DownloadSummary, EngineError, FetchEngine, FetchSpec, ProbeInfo, ProgressEvent, ProgressSink,
};

const PROGRESS_MARKER: &str = "[fetch-progress]";

/// Drives the `yt-dlp` command line program.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn {
            program: self.program_name(),
            source,
        }
    }

    fn io_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Io {
            program: self.program_name(),
            source,
        }
    }
}

#[async_trait]
impl FetchEngine for YtDlp {
    async fn probe(&self, spec: &FetchSpec, url: &str) -> Result<ProbeInfo, EngineError> {
        let args = generate_probe_args(spec, url);
        tracing::debug!(program = %self.program.display(), ?args, "probing");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Probe {
                url: url.to_owned(),
                msg: failure_message(&stderr, output.status),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| EngineError::ProbeJson {
            url: url.to_owned(),
            source,
        })
    }

    async fn download(
        &self,
        spec: &FetchSpec,
        url: &str,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadSummary, EngineError> {
        let args = generate_cmd_args(spec, url);
        tracing::debug!(program = %self.program.display(), ?args, "downloading");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.io_error(std::io::ErrorKind::BrokenPipe.into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.io_error(std::io::ErrorKind::BrokenPipe.into()))?;

        let echo = (!spec.quiet).then_some(progress);
        let (stdout_result, stderr_result) = tokio::join!(
            forward_progress(stdout, progress),
            collect_stderr(stderr, echo)
        );
        stdout_result.map_err(|e| self.io_error(e))?;
        let stderr = stderr_result.map_err(|e| self.io_error(e))?;

        let status = child.wait().await.map_err(|e| self.io_error(e))?;
        if status.success() {
            return Ok(DownloadSummary::default());
        }

        let errors = error_lines(&stderr);
        if spec.playlist && !errors.is_empty() {
            return Ok(DownloadSummary {
                entry_errors: errors,
            });
        }

        Err(EngineError::Fetch {
            url: url.to_owned(),
            msg: failure_message(&stderr, status),
        })
    }
}

fn generate_probe_args(spec: &FetchSpec, url: &str) -> Vec<OsString> {
    let mut args = vec![
        OsString::from("--ignore-config"),
        "--flat-playlist".into(),
        "--dump-single-json".into(),
        "--no-warnings".into(),
    ];

    if let Some(cookies) = &spec.cookies {
        args.push("--cookies".into());
        args.push(cookies.as_os_str().to_owned());
    }

    args.push("--".into());
    args.push(url.into());

    args
}

fn generate_cmd_args(spec: &FetchSpec, url: &str) -> Vec<OsString> {
    let mut args = vec![
        OsString::from("--ignore-config"),
        "--format".into(),
        spec.format.as_str().into(),
        "--output".into(),
        spec.output_template.as_os_str().to_owned(),
    ];

    if let Some(container) = &spec.merge_output_format {
        args.push("--merge-output-format".into());
        args.push(container.into());
    }

    if spec.quiet {
        args.push("--quiet".into());
        args.push("--no-warnings".into());
        args.push("--no-progress".into());
    } else {
        args.push("--quiet".into());
        args.push("--progress".into());
        args.push("--newline".into());
        args.push("--progress-template".into());
        args.push(progress_template().into());
    }

    if let Some(subs) = &spec.subtitles {
        if subs.write_subtitles {
            args.push("--write-subs".into());
        }
        if subs.write_auto_subtitles {
            args.push("--write-auto-subs".into());
        }
        if !subs.languages.is_empty() {
            args.push("--sub-langs".into());
            args.push(subs.languages.join(",").into());
        }
    }

    if let Some(cookies) = &spec.cookies {
        args.push("--cookies".into());
        args.push(cookies.as_os_str().to_owned());
    }

    if spec.write_thumbnail {
        args.push("--write-thumbnail".into());
    }

    if spec.write_info_json {
        args.push("--write-info-json".into());
    }

    if spec.playlist {
        args.push("--ignore-errors".into());
    } else if spec.first_entry_only {
        args.push("--playlist-items".into());
        args.push("1".into());
    }

    args.push("--".into());
    args.push(url.into());

    args
}

fn progress_template() -> String {
    let fields = [
        "status",
        "_percent_str",
        "_total_bytes_str",
        "_downloaded_bytes_str",
        "_speed_str",
        "_eta_str",
    ];
    let fields: Vec<String> = fields
        .iter()
        .map(|f| format!("%(progress.{})s", f))
        .collect();
    format!("download:{}{}", PROGRESS_MARKER, fields.join("|"))
}

fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let mut fields = rest.split('|').map(|f| {
        let f = f.trim();
        match f {
            "" | "NA" | "N/A" | "Unknown" => None,
            _ => Some(f.to_owned()),
        }
    });

    let status = fields.next().flatten()?;
    match status.as_str() {
        "downloading" => Some(ProgressEvent::Downloading(DownloadProgress {
            percent: fields.next().flatten(),
            total: fields.next().flatten(),
            downloaded: fields.next().flatten(),
            speed: fields.next().flatten(),
            eta: fields.next().flatten(),
        })),
        "finished" => Some(ProgressEvent::Finished),
        _ => None,
    }
}

/// Read one line, decoding anything that is not UTF-8 lossily. Returns
/// `None` at end of stream.
async fn next_line(reader: &mut (impl AsyncBufRead + Unpin)) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_owned()))
}

async fn forward_progress(
    stream: impl AsyncRead + Unpin,
    progress: &dyn ProgressSink,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    while let Some(line) = next_line(&mut reader).await? {
        match parse_progress_line(&line) {
            Some(event) => progress.on_progress(&event),
            None => tracing::trace!(%line, "engine output"),
        }
    }
    Ok(())
}

/// Tee stderr to a buffer to inspect any errors
async fn collect_stderr(
    stream: impl AsyncRead + Unpin,
    echo: Option<&dyn ProgressSink>,
) -> std::io::Result<String> {
    let mut reader = BufReader::new(stream);
    let mut output = String::new();
    while let Some(line) = next_line(&mut reader).await? {
        if let Some(sink) = echo {
            sink.println(&line);
        }
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}

fn error_lines(log: &str) -> Vec<String> {
    static ERROR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ERROR:").unwrap());
    log.lines()
        .map(str::trim)
        .filter(|line| ERROR_RE.is_match(line))
        .map(str::to_owned)
        .collect()
}

fn failure_message(stderr: &str, status: ExitStatus) -> String {
    let errors = error_lines(stderr);
    if errors.is_empty() {
        format!("yt-dlp exited with {}", status)
    } else {
        errors.join("\n")
    }
}
