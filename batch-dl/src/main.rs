use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use batch_dl::config::RunConfig;
use batch_dl::log::RunLog;
use batch_dl::report;
use batch_dl::run::{prepare_target_folder, run_items};
use clap::error::ErrorKind;
use clap::Parser;
use fetch_engine::YtDlp;
use tracing_subscriber::EnvFilter;

/// Download the videos and playlists listed in a config file
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Config file location (YAML, or TOML with a .toml extension)
    #[clap(value_parser)]
    config: PathBuf,

    /// Print a JSON report on stdout instead of progress and a summary
    #[clap(long)]
    json: bool,

    /// Also append log lines to this file
    #[clap(long, value_parser)]
    log_file: Option<PathBuf>,

    /// yt-dlp executable to run
    #[clap(long = "yt-dlp", default_value = "yt-dlp", value_parser)]
    yt_dlp: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            process::exit(exit_code(err.kind()));
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(_) => process::exit(0),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(1);
        }
    }
}

/// Help and version requests succeed, every other usage error exits with 1.
fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

impl Args {
    /// The log file, which only applies to human readable output.
    fn log_file(&self) -> Option<&Path> {
        match self.json {
            true => None,
            false => self.log_file.as_deref(),
        }
    }

    fn run_log(&self) -> Result<RunLog> {
        if self.json {
            return Ok(RunLog::structured());
        }
        match self.log_file() {
            Some(path) => RunLog::console(Some(path))
                .with_context(|| format!("unable to open log file '{}'", path.display())),
            None => Ok(RunLog::console(None)?),
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut log = args.run_log()?;

    log.info(format!(
        "Loading configuration from: {}",
        args.config.display()
    ));
    let config = RunConfig::read(&args.config)?;

    log.info(format!(
        "Target folder from config: {}",
        config.target_folder.display()
    ));
    let target_folder = prepare_target_folder(&config.target_folder).with_context(|| {
        format!(
            "unable to create target folder '{}'",
            config.target_folder.display()
        )
    })?;
    log.info(format!("Target folder: {}", target_folder.display()));

    let engine = YtDlp::new(&args.yt_dlp);
    let report = run_items(&config, &args.config, &target_folder, &engine, &mut log).await;

    report::emit(report, log, args.log_file(), std::io::stdout().lock())
}
