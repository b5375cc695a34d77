use std::env;
use std::path::PathBuf;

use crate::ttt::paths::expand_home;

fn fallback_dotenv_path(ttt_home: Option<String>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    let base = match ttt_home.filter(|v| !v.trim().is_empty()) {
        Some(raw) => expand_home(raw.trim()).ok()?,
        None => home_dir?.join(".ttt"),
    };
    Some(base.join(".env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(env::var("TTT_HOME").ok(), dirs::home_dir());

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::fallback_dotenv_path;
    use std::path::PathBuf;

    #[test]
    fn fallback_uses_ttt_home_when_set() {
        let got = fallback_dotenv_path(
            Some("/workspace/tasks".to_string()),
            Some(PathBuf::from("/home/alice")),
        );
        assert_eq!(got, Some(PathBuf::from("/workspace/tasks/.env")));
    }

    #[test]
    fn fallback_uses_default_working_dir_when_unset() {
        let got = fallback_dotenv_path(None, Some(PathBuf::from("/home/alice")));
        assert_eq!(got, Some(PathBuf::from("/home/alice/.ttt/.env")));
    }

    #[test]
    fn blank_ttt_home_is_ignored() {
        let got = fallback_dotenv_path(Some("  ".to_string()), Some(PathBuf::from("/home/alice")));
        assert_eq!(got, Some(PathBuf::from("/home/alice/.ttt/.env")));
    }
}
