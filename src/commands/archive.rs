use anyhow::Result;
use chrono::NaiveDate;

use crate::commands::{CommandReport, resolve_today};
use crate::ttt::archive::{self, cutoff};
use crate::ttt::audit;
use crate::ttt::config::{MAX_DELAY_DAYS, load_config};
use crate::ttt::lock::TaskLock;
use crate::ttt::paths::resolve_paths;
use crate::ttt::store;

#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    pub delay_days: Option<u32>,
    pub today: Option<NaiveDate>,
    pub dry_run: bool,
}

pub fn run(opts: &ArchiveOptions) -> Result<CommandReport> {
    let cfg = load_config()?;
    let paths = resolve_paths(&cfg)?;
    let today = resolve_today(opts.today);
    let delay_days = opts.delay_days.unwrap_or(cfg.archive.delay_days);
    let mut report = CommandReport::new("ttt-archive");

    report.detail(format!("tasks_file={}", paths.tasks_file.display()));
    report.detail(format!("archive_file={}", paths.archive_file.display()));
    report.detail(format!("delay_days={delay_days}"));
    report.detail(format!("cutoff={}", cutoff(today, delay_days)));

    if delay_days > MAX_DELAY_DAYS {
        report.issue(format!("delay days must be <= {MAX_DELAY_DAYS}"));
        return Ok(report);
    }

    if opts.dry_run {
        let content = store::load(&paths.tasks_file)?;
        let partition = archive::preview(&content, delay_days, today);
        report.detail(format!(
            "dry-run: {} line(s) would be archived",
            partition.entries.len()
        ));
        for entry in &partition.entries {
            report.detail(format!(
                "would_archive[{}] line {}: {}",
                entry.group_date,
                entry.position + 1,
                entry.content
            ));
        }
        return Ok(report);
    }

    let lock = TaskLock::acquire(&paths.lock_file)?;
    report.detail(format!("lock_file={}", lock.path().display()));
    let outcome = archive::archive(&paths.tasks_file, &paths.archive_file, delay_days, today)?;
    report.detail(format!("tagged={}", outcome.tagged));
    report.detail(format!("archived={}", outcome.archived));
    audit::record(
        &paths,
        "archive",
        "ok",
        &format!("tagged={} archived={}", outcome.tagged, outcome.archived),
    );

    Ok(report)
}
