use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::TttError;

/// Longest archive delay accepted; anything above is almost certainly a typo.
pub const MAX_DELAY_DAYS: u32 = 3650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    pub working_dir: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            working_dir: "~/.ttt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub auto: bool,
    #[serde(default = "default_delay_days")]
    pub delay_days: u32,
}

fn default_delay_days() -> u32 {
    2
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            auto: false,
            delay_days: default_delay_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TttConfig {
    pub file: FileConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialTttConfig {
    file: Option<FileConfig>,
    archive: Option<ArchiveConfig>,
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

pub fn validate(cfg: &TttConfig) -> Result<(), TttError> {
    if cfg.file.working_dir.trim().is_empty() {
        return Err(TttError::InvalidConfig(
            "file.working_dir cannot be empty".to_string(),
        ));
    }
    if cfg.archive.delay_days > MAX_DELAY_DAYS {
        return Err(TttError::InvalidConfig(format!(
            "archive.delay_days must be <= {MAX_DELAY_DAYS}, got {}",
            cfg.archive.delay_days
        )));
    }
    Ok(())
}

/// `TTT_CONFIG_PATH`, then `$XDG_CONFIG_HOME/ttt/config.toml`, then the
/// platform config dir.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("TTT_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.trim().is_empty() => PathBuf::from(xdg.trim()),
        _ => dirs::config_dir()?,
    };
    Some(base.join("ttt").join("config.toml"))
}

fn merge_toml(base: &mut TttConfig, raw: &str) -> Result<(), TttError> {
    let parsed: PartialTttConfig =
        toml::from_str(raw).map_err(|err| TttError::InvalidConfig(err.to_string()))?;
    if let Some(file) = parsed.file {
        base.file = file;
    }
    if let Some(archive) = parsed.archive {
        base.archive = archive;
    }
    Ok(())
}

fn merge_file_config(base: &mut TttConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read ttt config {}", path.display()))?;
    merge_toml(base, &raw).with_context(|| format!("failed to parse ttt config {}", path.display()))?;
    Ok(())
}

pub fn load_config() -> Result<TttConfig> {
    let mut cfg = TttConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.file.working_dir = env_or_string("TTT_HOME", &cfg.file.working_dir);
    cfg.archive.delay_days = env_or_u32("TTT_ARCHIVE_DELAY_DAYS", cfg.archive.delay_days);
    cfg.archive.auto = env_or_bool("TTT_ARCHIVE_AUTO", cfg.archive.auto);

    validate(&cfg)?;
    Ok(cfg)
}

/// Write the defaults to the config path unless a file is already there.
/// Returns the path when a file was created.
pub fn write_default_config() -> Result<Option<PathBuf>> {
    let Some(path) = resolve_config_path() else {
        return Ok(None);
    };
    if path.exists() {
        return Ok(None);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(&TttConfig::default())?;
    fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_sections() {
        let mut cfg = TttConfig::default();
        merge_toml(&mut cfg, "[archive]\nauto = true\n").expect("merge");
        assert!(cfg.archive.auto);
        assert_eq!(cfg.archive.delay_days, 2);
        assert_eq!(cfg.file.working_dir, "~/.ttt");
    }

    #[test]
    fn full_file_overrides_defaults() {
        let mut cfg = TttConfig::default();
        merge_toml(
            &mut cfg,
            "[file]\nworking_dir = \"/srv/tasks\"\n\n[archive]\nauto = false\ndelay_days = 7\n",
        )
        .expect("merge");
        assert_eq!(cfg.file.working_dir, "/srv/tasks");
        assert_eq!(cfg.archive.delay_days, 7);
    }

    #[test]
    fn malformed_file_is_invalid_config() {
        let mut cfg = TttConfig::default();
        let err = merge_toml(&mut cfg, "[archive]\ndelay_days = \"two\"\n").expect_err("bad type");
        assert!(matches!(err, TttError::InvalidConfig(_)));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let data = toml::to_string_pretty(&TttConfig::default()).expect("serialize");
        let mut cfg = TttConfig {
            file: FileConfig {
                working_dir: "elsewhere".to_string(),
            },
            archive: ArchiveConfig {
                auto: true,
                delay_days: 30,
            },
        };
        merge_toml(&mut cfg, &data).expect("merge");
        assert_eq!(cfg, TttConfig::default());
    }

    #[test]
    fn validate_rejects_empty_dir_and_huge_delay() {
        let mut cfg = TttConfig::default();
        assert!(validate(&cfg).is_ok());
        cfg.archive.delay_days = MAX_DELAY_DAYS + 1;
        assert!(validate(&cfg).is_err());
        cfg.archive.delay_days = 2;
        cfg.file.working_dir = "  ".to_string();
        assert!(validate(&cfg).is_err());
    }
}
