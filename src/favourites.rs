use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What a pinned path points at. Volumes come from the volumes pane; file
/// and folder bookmarks come from directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FavouriteKind {
    Volume,
    Folder,
    BookmarkedFile,
}

/// One pinned path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    pub name: String,
    pub path: PathBuf,
    pub kind: FavouriteKind,
}

impl Favourite {
    pub fn new(name: impl Into<String>, path: PathBuf, kind: FavouriteKind) -> Self {
        Favourite {
            name: name.into(),
            path,
            kind,
        }
    }
}

/// Classifies a path for the registry: a bare root is a volume, otherwise
/// the entry's own directory flag decides.
pub fn classify(path: &Path, is_directory: bool) -> FavouriteKind {
    if path.parent().is_none() {
        FavouriteKind::Volume
    } else if is_directory {
        FavouriteKind::Folder
    } else {
        FavouriteKind::BookmarkedFile
    }
}

/// What a toggle call did, so the caller can phrase a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(usize),
    Removed(usize),
    Nothing,
}

/// The ordered list of pinned paths, unique by path. Persistence is the
/// owner's job: every mutating method reports whether anything changed so
/// the owner knows a write-through save is due.
#[derive(Debug, Default)]
pub struct FavouritesRegistry {
    entries: Vec<Favourite>,
}

impl FavouritesRegistry {
    pub fn from_entries(entries: Vec<Favourite>) -> Self {
        let mut registry = FavouritesRegistry::default();
        for entry in entries {
            if !registry.contains(&entry.path) {
                registry.entries.push(entry);
            }
        }
        registry
    }

    pub fn entries(&self) -> &[Favourite] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Favourite> {
        self.entries.get(index)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|f| f.path == path)
    }

    /// Toggles a batch. If none of the candidates are registered yet, all of
    /// them are added; if any already are, exactly those are removed and the
    /// rest are left alone. One gesture therefore either pins or unpins,
    /// never both.
    pub fn toggle(&mut self, candidates: Vec<Favourite>) -> ToggleOutcome {
        if candidates.is_empty() {
            return ToggleOutcome::Nothing;
        }
        let any_present = candidates.iter().any(|c| self.contains(&c.path));
        if any_present {
            let before = self.entries.len();
            self.entries
                .retain(|f| !candidates.iter().any(|c| c.path == f.path));
            ToggleOutcome::Removed(before - self.entries.len())
        } else {
            let mut added = 0;
            for candidate in candidates {
                if !self.contains(&candidate.path) {
                    self.entries.push(candidate);
                    added += 1;
                }
            }
            ToggleOutcome::Added(added)
        }
    }

    /// Removes by exact path match; absent paths are a quiet no-op.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.entries.len();
        self.entries.retain(|f| f.path != path);
        before != self.entries.len()
    }
}
