//! Paths and user preferences for rpide.
//! rpide 的路徑與偏好設定。

pub mod paths;
pub mod preferences;

pub use paths::{default_game_dir, AppPaths, APP_DIR_NAME};
pub use preferences::{
    EditorPreferences, GamePreferences, Preferences, PreferencesError, PreferencesStore, Theme,
    UiPreferences,
};
