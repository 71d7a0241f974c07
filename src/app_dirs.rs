use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "strikemark";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/strikemark`, or the platform data-local dir without `HOME`
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("segments.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("strikemark.log"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("config.json"))
    }

    pub fn export_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_state_dir() {
        if let Some(state) = AppDirs::state_dir() {
            assert_eq!(AppDirs::db_path().unwrap().parent().unwrap(), state);
            assert_eq!(AppDirs::log_path().unwrap().parent().unwrap(), state);
            assert!(AppDirs::export_dir().unwrap().starts_with(&state));
        }
    }
}
