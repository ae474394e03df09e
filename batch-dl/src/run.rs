use std::fs;
use std::path::{Path, PathBuf};

use fetch_engine::FetchEngine;

use crate::config::{ItemConfig, ItemEntry, RunConfig};
use crate::fetch::fetch;
use crate::log::RunLog;
use crate::probe;
use crate::report::{ItemOutcome, RunReport};
use crate::resolve::{resolve, Resolution};

/// Create the target folder and its parents, returning its absolute path.
pub fn prepare_target_folder(path: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(path)?;
    std::path::absolute(path)
}

/// Process every configured item in order, one at a time.
///
/// Item failures are recorded in the report and never stop the loop.
pub async fn run_items(
    config: &RunConfig,
    config_path: &Path,
    resolved_target_folder: &Path,
    engine: &dyn FetchEngine,
    log: &mut RunLog,
) -> RunReport {
    log_global_settings(config, log);

    let total = config.items.len();
    let mut report = RunReport::new(config_path, resolved_target_folder, total);
    log.info(format!("Processing {} video(s)...", total));

    for (idx, entry) in config.items.iter().enumerate() {
        let position = format!("[{}/{}]", idx + 1, total);
        let outcome = match entry {
            ItemEntry::Invalid { entry, reason } => {
                log.error(format!("{} Invalid entry: {}", position, entry));
                ItemOutcome::invalid_entry(entry, reason.as_str())
            }
            ItemEntry::Valid(item) => process_item(item, config, engine, log, &position).await,
        };
        report.record(outcome);
    }

    report.finish();
    report
}

async fn process_item(
    item: &ItemConfig,
    config: &RunConfig,
    engine: &dyn FetchEngine,
    log: &mut RunLog,
    position: &str,
) -> ItemOutcome {
    log.info(format!("{} Processing: {}", position, item.name));
    log.info(format!("URL: {}", item.url));
    log_item_settings(item, log);

    let Resolution { spec, warnings } = resolve(item, config);
    for warning in warnings {
        log.warn(warning);
    }

    if probe::exists(&config.target_folder, &item.name, item.is_playlist) {
        log.info("Status: SKIPPED (already exists)");
        return ItemOutcome::skipped(&item.name, &item.url);
    }

    match fetch(engine, spec, &item.url, log).await {
        Ok(duration) => {
            log.info(format!(
                "Status: SUCCESS (took {:.2}s)",
                duration.as_secs_f64()
            ));
            ItemOutcome::successful(&item.name, &item.url, duration)
        }
        Err(failure) => {
            log.error(format!("Status: FAILED - {}", failure.error));
            ItemOutcome::failed(&item.name, &item.url, failure.error, failure.duration)
        }
    }
}

fn log_global_settings(config: &RunConfig, log: &mut RunLog) {
    if let Some(quality) = &config.default_quality {
        log.info(format!("Default quality: {}", quality));
    }
    if let Some(subtitles) = &config.subtitles {
        log.info(format!("Subtitles: {}", subtitles));
    }
    if let Some(cookies) = &config.cookies {
        log.info(format!("Using cookies: {}", cookies.display()));
    }
}

fn log_item_settings(item: &ItemConfig, log: &mut RunLog) {
    if let Some(quality) = &item.quality {
        log.info(format!("Quality: {}", quality));
    }
    if let Some(format) = &item.format {
        log.info(format!("Format: {}", format));
    }
    if let Some(subtitles) = &item.subtitles {
        log.info(format!("Subtitles: {}", subtitles));
    }
    if item.is_playlist {
        log.info("Type: Playlist");
    }
}
