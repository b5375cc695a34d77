use anyhow::Result;
use chrono::NaiveDate;
use std::env;

use crate::commands::{CommandReport, resolve_today};
use crate::ttt::archive::preview;
use crate::ttt::audit;
use crate::ttt::config::{load_config, resolve_config_path};
use crate::ttt::line::{has_malformed_done_tag, parse_lines};
use crate::ttt::paths::resolve_paths;
use crate::ttt::store;

include!(concat!(env!("OUT_DIR"), "/ttt_env_allowlist.rs"));

const ENV_PREFIX: &str = "TTT_";

#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub tasks: usize,
    pub open: usize,
    pub completed: usize,
    pub untagged_completed: usize,
    pub malformed_tags: usize,
    pub archivable: usize,
}

pub fn count_tasks(content: &str, delay_days: u32, today: NaiveDate) -> TaskCounts {
    let mut counts = TaskCounts::default();
    for line in parse_lines(content) {
        if has_malformed_done_tag(&line.text) {
            counts.malformed_tags += 1;
        }
        if !line.is_task {
            continue;
        }
        counts.tasks += 1;
        if line.is_completed {
            counts.completed += 1;
            if !line.has_done_tag {
                counts.untagged_completed += 1;
            }
        } else {
            counts.open += 1;
        }
    }
    counts.archivable = preview(content, delay_days, today).entries.len();
    counts
}

/// `TTT_*` variables in the environment that no code path reads.
fn unknown_env_keys<I>(keys: I, allowlist: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = keys
        .into_iter()
        .filter(|key| key.starts_with(ENV_PREFIX) && !allowlist.contains(&key.as_str()))
        .collect();
    out.sort();
    out
}

pub fn run(opts: &StatusOptions) -> Result<CommandReport> {
    let cfg = load_config()?;
    let paths = resolve_paths(&cfg)?;
    let today = resolve_today(opts.today);
    let mut report = CommandReport::new("ttt-status");

    report.detail(format!("build={}", env!("BUILD_UUID")));
    report.detail(format!("working_dir={}", paths.working_dir.display()));
    report.detail(format!("tasks_file={}", paths.tasks_file.display()));
    report.detail(format!("archive_file={}", paths.archive_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    match resolve_config_path() {
        Some(path) if path.exists() => report.detail(format!("config_file={}", path.display())),
        Some(path) => report.detail(format!("config_file={} (defaults)", path.display())),
        None => report.detail("config_file=none (defaults)"),
    }
    report.detail(format!("archive.auto={}", cfg.archive.auto));
    report.detail(format!("archive.delay_days={}", cfg.archive.delay_days));
    report.detail(format!("today={today}"));

    match audit::read_events(&paths) {
        Ok(events) => {
            if let Some(last) = events.last() {
                report.detail(format!(
                    "audit.last={} {} at_epoch_secs={} {}",
                    last.phase, last.status, last.at_epoch_secs, last.message
                ));
            }
        }
        Err(err) => report.detail(format!("audit.unreadable={err:#}")),
    }

    for key in unknown_env_keys(env::vars().map(|(k, _)| k), GENERATED_ENV_ALLOWLIST) {
        report.detail(format!("env.unknown={key}"));
    }

    if !paths.tasks_file.exists() {
        report.issue("missing tasks file (run `ttt init`)");
        return Ok(report);
    }

    let content = store::load(&paths.tasks_file)?;
    let counts = count_tasks(&content, cfg.archive.delay_days, today);
    report.detail(format!("tasks.total={}", counts.tasks));
    report.detail(format!("tasks.open={}", counts.open));
    report.detail(format!("tasks.completed={}", counts.completed));
    report.detail(format!("tasks.untagged_completed={}", counts.untagged_completed));
    report.detail(format!("tasks.malformed_done_tags={}", counts.malformed_tags));
    report.detail(format!("tasks.archivable_lines={}", counts.archivable));

    Ok(report)
}
