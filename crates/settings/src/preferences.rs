use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use rpide_core::Indentation;

const PREFERENCES_VERSION: u32 = 1;
const MAX_INDENT_SIZE: u8 = 8;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to access preferences {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 使用者偏好設定。 / User preferences stored in `preferences.json`.
///
/// Every section defaults independently, so files written by older builds
/// keep loading after new keys are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub editor: EditorPreferences,
    #[serde(default)]
    pub ui: UiPreferences,
    #[serde(default)]
    pub game: GamePreferences,
}

fn current_version() -> u32 {
    PREFERENCES_VERSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            editor: EditorPreferences::default(),
            ui: UiPreferences::default(),
            game: GamePreferences::default(),
        }
    }
}

impl Preferences {
    /// 修正超出範圍的值。 / Pulls out-of-range values back to something usable.
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        self.editor.sanitize();
        self.game.sanitize();
    }
}

/// 編輯器分頁使用的縮排預設值。 / Fallback indentation for editor tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorPreferences {
    #[serde(default = "default_indent_size")]
    pub indent_size: u8,
    #[serde(default = "default_insert_spaces")]
    pub insert_spaces: bool,
}

fn default_indent_size() -> u8 {
    4
}

fn default_insert_spaces() -> bool {
    true
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            insert_spaces: default_insert_spaces(),
        }
    }
}

impl EditorPreferences {
    fn sanitize(&mut self) {
        if self.indent_size == 0 {
            self.indent_size = default_indent_size();
        }
        self.indent_size = self.indent_size.min(MAX_INDENT_SIZE);
    }

    /// Indentation assumed for files whose own indentation cannot be detected.
    pub fn default_indentation(&self) -> Indentation {
        if self.insert_spaces {
            Indentation::Spaces(self.indent_size)
        } else {
            Indentation::Tabs(self.indent_size)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiPreferences {
    #[serde(default)]
    pub theme: Theme,
}

/// 遊戲安裝位置。 / Where the game lives when it is not in the platform default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GamePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_dir: Option<PathBuf>,
}

impl GamePreferences {
    fn sanitize(&mut self) {
        if self
            .game_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            self.game_dir = None;
        }
    }
}

/// 偏好設定檔的讀寫。 / Loads and persists [`Preferences`].
#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, preferences: Preferences) -> Self {
        Self {
            path: path.into(),
            data: preferences,
        }
    }

    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        let mut data = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<Preferences>(&contents).map_err(|source| {
                PreferencesError::Parse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no preferences file, using defaults");
                Preferences::default()
            }
            Err(source) => return Err(PreferencesError::Io { path, source }),
        };
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data
    }

    /// 修改後立即寫回。 / Applies `op`, sanitizes and saves.
    pub fn update<F>(&mut self, op: F) -> Result<(), PreferencesError>
    where
        F: FnOnce(&mut Preferences),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn save(&self) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let payload = serde_json::to_string_pretty(&self.data)
            .map_err(io::Error::from)
            .map_err(io_error(&self.path))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload).map_err(io_error(&tmp_path))?;
        fs::rename(&tmp_path, &self.path).map_err(io_error(&self.path))?;
        tracing::debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PreferencesError {
    let path = path.to_path_buf();
    move |source| PreferencesError::Io { path, source }
}
