use anyhow::Result;

use crate::commands::CommandReport;
use crate::error::TttError;
use crate::ttt::audit;
use crate::ttt::config::load_config;
use crate::ttt::lock::TaskLock;
use crate::ttt::paths::resolve_paths;
use crate::ttt::store;

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub words: Vec<String>,
}

/// Append `- [ ] <text>` as its own line, newline-terminated.
pub fn append_task(content: &str, text: &str) -> String {
    let mut out = String::with_capacity(content.len() + text.len() + 8);
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("- [ ] ");
    out.push_str(text);
    out.push('\n');
    out
}

pub fn run(opts: &AddOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("ttt-add");
    let text = opts.words.join(" ").trim().to_string();
    if text.is_empty() {
        report.issue("task text is empty");
        return Ok(report);
    }

    let cfg = load_config()?;
    let paths = resolve_paths(&cfg)?;
    let _lock = TaskLock::acquire(&paths.lock_file)?;

    let existing = match store::load(&paths.tasks_file) {
        Ok(content) => content,
        Err(TttError::NotFound(_)) => String::new(),
        Err(err) => return Err(err.into()),
    };
    store::save(&paths.tasks_file, &append_task(&existing, &text))?;

    report.detail(format!("tasks_file={}", paths.tasks_file.display()));
    report.detail(format!("added={text}"));
    audit::record(&paths, "add", "ok", &text);
    Ok(report)
}
