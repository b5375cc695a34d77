use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use crate::ttt::config::TttConfig;

pub const TASKS_FILE_NAME: &str = "tasks.md";
pub const ARCHIVE_FILE_NAME: &str = "archive.md";
pub const LOCK_FILE_NAME: &str = ".ttt.lock";

#[derive(Debug, Clone)]
pub struct TttPaths {
    pub working_dir: PathBuf,
    pub tasks_file: PathBuf,
    pub archive_file: PathBuf,
    pub lock_file: PathBuf,
    pub logs_dir: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

/// Expand a leading `~/` against `home`.
fn expand_with_home(raw: &str, home: impl FnOnce() -> Result<PathBuf>) -> Result<PathBuf> {
    if raw == "~" {
        return home();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => Ok(home()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

pub fn expand_home(raw: &str) -> Result<PathBuf> {
    expand_with_home(raw, required_home_dir)
}

impl TttPaths {
    pub fn in_dir(working_dir: &Path) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            tasks_file: working_dir.join(TASKS_FILE_NAME),
            archive_file: working_dir.join(ARCHIVE_FILE_NAME),
            lock_file: working_dir.join(LOCK_FILE_NAME),
            logs_dir: working_dir.join("logs"),
        }
    }
}

pub fn resolve_paths(cfg: &TttConfig) -> Result<TttPaths> {
    let working_dir = expand_home(&cfg.file.working_dir)?;
    let mut paths = TttPaths::in_dir(&working_dir);
    paths.logs_dir = env_or_default_path("TTT_LOGS_DIR", paths.logs_dir);
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_home() -> Result<PathBuf> {
        Ok(PathBuf::from("/home/alice"))
    }

    #[test]
    fn tilde_prefix_expands_to_home() {
        assert_eq!(
            expand_with_home("~/.ttt", fake_home).expect("expand"),
            PathBuf::from("/home/alice/.ttt")
        );
        assert_eq!(
            expand_with_home("~", fake_home).expect("expand"),
            PathBuf::from("/home/alice")
        );
    }

    #[test]
    fn other_paths_are_left_alone() {
        assert_eq!(
            expand_with_home("/srv/tasks", fake_home).expect("expand"),
            PathBuf::from("/srv/tasks")
        );
        assert_eq!(
            expand_with_home("~bob/tasks", fake_home).expect("expand"),
            PathBuf::from("~bob/tasks")
        );
    }

    #[test]
    fn fixed_file_names_live_in_working_dir() {
        let paths = TttPaths::in_dir(Path::new("/srv/tasks"));
        assert_eq!(paths.tasks_file, PathBuf::from("/srv/tasks/tasks.md"));
        assert_eq!(paths.archive_file, PathBuf::from("/srv/tasks/archive.md"));
        assert_eq!(paths.lock_file, PathBuf::from("/srv/tasks/.ttt.lock"));
        assert_eq!(paths.logs_dir, PathBuf::from("/srv/tasks/logs"));
    }
}
