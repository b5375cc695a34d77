use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::TttError;
use crate::ttt::cascade::process_content;

pub fn load(path: &Path) -> Result<String, TttError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            TttError::NotFound(path.to_path_buf())
        } else {
            TttError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

pub fn save(path: &Path, content: &str) -> Result<(), TttError> {
    let write_err = |source| TttError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}

/// Write `content` ahead of whatever the file holds; a missing file is empty.
pub fn prepend(path: &Path, content: &str) -> Result<(), TttError> {
    let existing = match load(path) {
        Ok(existing) => existing,
        Err(TttError::NotFound(_)) => String::new(),
        Err(err) => return Err(err),
    };
    save(path, &format!("{content}{existing}"))
}

/// Cascade and tag the file in place. Returns how many lines changed; the file
/// is only rewritten when that is non-zero.
pub fn process_file(path: &Path, today: NaiveDate) -> Result<usize, TttError> {
    let content = load(path)?;
    let outcome = process_content(&content, today);
    let changed = outcome.changed();
    if changed > 0 {
        save(path, &outcome.content)?;
    }
    Ok(changed)
}
