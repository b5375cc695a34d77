use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TttError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("task file is locked by another ttt process: {}", .0.display())]
    Locked(PathBuf),
}

impl TttError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) | Self::Read { .. } | Self::Write { .. } => ErrorCode::E003Io,
            Self::InvalidConfig(_) => ErrorCode::E002ConfigInvalid,
            Self::Locked(_) => ErrorCode::E001Locked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    E001Locked,
    E002ConfigInvalid,
    E003Io,
    E004Audit,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::E001Locked => "E001_LOCKED",
            Self::E002ConfigInvalid => "E002_CONFIG_INVALID",
            Self::E003Io => "E003_IO",
            Self::E004Audit => "E004_AUDIT",
        }
    }
}
