use std::path::{Path, PathBuf};

/// Application directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "rpide";

/// File locations used by the editor.
///
/// Everything hangs off a single data directory so tests and the CLI can point
/// the whole application at a scratch folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
    game_dir: PathBuf,
}

impl AppPaths {
    /// Resolves the platform defaults, or `None` when the OS exposes no data directory.
    pub fn discover() -> Option<Self> {
        let data_dir = dirs::data_dir()?.join(APP_DIR_NAME);
        let game_dir = default_game_dir()?;
        Some(Self { data_dir, game_dir })
    }

    pub fn new(data_dir: impl Into<PathBuf>, game_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            game_dir: game_dir.into(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_game_dir(mut self, game_dir: impl Into<PathBuf>) -> Self {
        self.game_dir = game_dir.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding one `<hash>.json` record per project.
    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    /// The shared recents index.
    pub fn projects_index(&self) -> PathBuf {
        self.data_dir.join("projects.json")
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }

    pub fn vanilla_assets_dir(&self) -> PathBuf {
        self.data_dir.join("VanillaAssets")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// The game's install directory (holds `versions/` and `resourcepacks/`).
    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn resourcepacks_dir(&self) -> PathBuf {
        self.game_dir.join("resourcepacks")
    }
}

/// Default game directory: `%APPDATA%\.minecraft` on Windows,
/// `~/Library/Application Support/minecraft` on macOS, `~/.minecraft` elsewhere.
pub fn default_game_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        dirs::config_dir().map(|dir| dir.join(".minecraft"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir().map(|dir| dir.join("minecraft"))
    } else {
        dirs::home_dir().map(|dir| dir.join(".minecraft"))
    }
}
