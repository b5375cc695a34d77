use anyhow::Result;
use chrono::NaiveDate;

use crate::commands::archive::{self, ArchiveOptions};
use crate::commands::{CommandReport, resolve_today};
use crate::ttt::audit;
use crate::ttt::config::load_config;
use crate::ttt::lock::TaskLock;
use crate::ttt::paths::resolve_paths;
use crate::ttt::store;

#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    pub today: Option<NaiveDate>,
}

pub fn run(opts: &TagOptions) -> Result<CommandReport> {
    let cfg = load_config()?;
    let paths = resolve_paths(&cfg)?;
    let today = resolve_today(opts.today);
    let mut report = CommandReport::new("ttt-tag");

    report.detail(format!("tasks_file={}", paths.tasks_file.display()));
    report.detail(format!("today={today}"));

    let tagged = {
        let _lock = TaskLock::acquire(&paths.lock_file)?;
        store::process_file(&paths.tasks_file, today)?
    };
    report.detail(format!("tagged={tagged}"));
    audit::record(&paths, "tag", "ok", &format!("tagged={tagged}"));

    if cfg.archive.auto {
        report.detail("archive.auto=true; running archive pass");
        report.merge(archive::run(&ArchiveOptions {
            delay_days: None,
            today: Some(today),
            dry_run: false,
        })?);
    }

    Ok(report)
}
