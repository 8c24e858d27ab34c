use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub user_data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let user_data_dir = discover_user_data_dir(&project_root);
        Self::from_dirs(project_root, user_data_dir)
    }

    pub fn from_dirs(project_root: PathBuf, user_data_dir: PathBuf) -> Self {
        let log_dir = user_data_dir.join("logs");

        for dir in [&user_data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            project_root,
            user_data_dir,
            log_dir,
        }
    }

    /// Resolves a configured path: absolute paths pass through, relative ones
    /// are looked up under the data dir first, then the project root.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let candidate = PathBuf::from(raw);
        if candidate.is_absolute() {
            return candidate;
        }
        let user_candidate = self.user_data_dir.join(&candidate);
        if user_candidate.exists() {
            return user_candidate;
        }
        let project_candidate = self.project_root.join(&candidate);
        if project_candidate.exists() {
            return project_candidate;
        }
        user_candidate
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("CHATBOT_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    env::current_dir().unwrap_or(manifest_dir)
}

/// `$CHATBOT_DATA_DIR` when set, otherwise state lives next to the project.
fn discover_user_data_dir(project_root: &Path) -> PathBuf {
    env::var_os("CHATBOT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| project_root.to_path_buf())
}
