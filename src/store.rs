use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::favourites::Favourite;

/// Width of the places pane as a percentage of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneLayout {
    pub places_percent: u16,
}

impl Default for PaneLayout {
    fn default() -> Self {
        PaneLayout { places_percent: 28 }
    }
}

/// Everything persisted between sessions. Unknown or missing fields fall
/// back to defaults so older settings files keep loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub favourites: Vec<Favourite>,
    pub panes: PaneLayout,
    /// Shell command lines for the script-1..script-9 commands; index 0 is
    /// slot 1. Empty lines count as unconfigured.
    pub scripts: Vec<String>,
}

impl Settings {
    pub fn script(&self, slot: u8) -> Option<&str> {
        let line = self.scripts.get(usize::from(slot).checked_sub(1)?)?;
        let line = line.trim();
        if line.is_empty() { None } else { Some(line) }
    }
}

/// JSON-file-backed settings, loaded once at startup. Mutations go through
/// [`SettingsStore::update`], which writes the whole file back immediately;
/// there is no batching and no dirty flag to forget.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Reads the store at `path`. A missing file means first run; a file
    /// that will not parse is treated the same way rather than blocking
    /// startup, with a warning so the user can recover the old contents.
    pub fn load(path: PathBuf) -> Self {
        let settings = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        %err,
                        "settings file is unreadable, starting from defaults"
                    );
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        };
        SettingsStore { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies a mutation and saves the result straight away.
    pub fn update(&mut self, mutate: impl FnOnce(&mut Settings)) -> Result<()> {
        mutate(&mut self.settings);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ExplorerError::io(format!("cannot create {}", parent.display()), e)
            })?;
        }
        let text = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| ExplorerError::io_msg(format!("cannot encode settings: {e}")))?;
        fs::write(&self.path, text)
            .map_err(|e| ExplorerError::io(format!("cannot write {}", self.path.display()), e))
    }
}

/// Default settings location: `$XDG_CONFIG_HOME/filedeck/settings.json`,
/// falling back to `~/.config/filedeck/settings.json` (`%APPDATA%` on
/// Windows), or a local `.filedeck` directory when no home is known.
pub fn default_store_path() -> PathBuf {
    let base = if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
            })
    };
    base.unwrap_or_else(|| PathBuf::from(".filedeck"))
        .join("filedeck")
        .join("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favourites::FavouriteKind;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::load(dir.path().join("settings.json"));
        assert!(store.settings().favourites.is_empty());
        assert_eq!(store.settings().panes, PaneLayout::default());
    }

    #[test]
    fn corrupt_file_loads_defaults_instead_of_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").expect("write");
        let store = SettingsStore::load(path);
        assert!(store.settings().favourites.is_empty());
    }

    #[test]
    fn update_writes_through_immediately() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::load(path.clone());
        store
            .update(|s| {
                s.favourites.push(Favourite::new(
                    "docs",
                    PathBuf::from("/docs"),
                    FavouriteKind::Folder,
                ));
                s.panes.places_percent = 40;
            })
            .expect("save");

        let reloaded = SettingsStore::load(path);
        assert_eq!(reloaded.settings().favourites.len(), 1);
        assert_eq!(reloaded.settings().favourites[0].name, "docs");
        assert_eq!(reloaded.settings().panes.places_percent, 40);
    }

    #[test]
    fn favourite_kinds_serialize_with_stable_identifiers() {
        let favourite = Favourite::new(
            "notes",
            PathBuf::from("/notes.txt"),
            FavouriteKind::BookmarkedFile,
        );
        let json = serde_json::to_string(&favourite).expect("encode");
        assert!(json.contains("\"bookmarked-file\""), "got {json}");
    }

    #[test]
    fn script_slots_skip_blank_lines_and_bad_indices() {
        let settings = Settings {
            scripts: vec!["echo one".into(), "   ".into()],
            ..Settings::default()
        };
        assert_eq!(settings.script(1), Some("echo one"));
        assert_eq!(settings.script(2), None);
        assert_eq!(settings.script(3), None);
        assert_eq!(settings.script(0), None);
    }
}
