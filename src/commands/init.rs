use anyhow::{Context, Result};
use std::fs;

use crate::commands::CommandReport;
use crate::ttt::audit;
use crate::ttt::config::{load_config, resolve_config_path, write_default_config};
use crate::ttt::paths::resolve_paths;
use crate::ttt::store;

pub fn run() -> Result<CommandReport> {
    let cfg = load_config()?;
    let paths = resolve_paths(&cfg)?;
    let mut report = CommandReport::new("ttt-init");

    report.detail(format!("working_dir={}", paths.working_dir.display()));

    if paths.working_dir.exists() {
        report.detail("working dir already present");
    } else {
        fs::create_dir_all(&paths.working_dir)
            .with_context(|| format!("failed to create {}", paths.working_dir.display()))?;
        report.detail("working dir created");
    }

    if paths.tasks_file.exists() {
        report.detail(format!("tasks_file={} (kept)", paths.tasks_file.display()));
    } else {
        store::save(&paths.tasks_file, "")?;
        report.detail(format!("tasks_file={} (created)", paths.tasks_file.display()));
    }

    match write_default_config()? {
        Some(path) => report.detail(format!("config_file={} (created)", path.display())),
        None => match resolve_config_path() {
            Some(path) => report.detail(format!("config_file={} (kept)", path.display())),
            None => report.detail("config_file=none (no config dir on this platform)"),
        },
    }

    audit::record(&paths, "init", "ok", "working dir ready");
    Ok(report)
}
