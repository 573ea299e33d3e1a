use std::collections::HashMap;
use std::path::PathBuf;

use crate::backend::{RawFileEntry, RawVolume};

/// One filesystem object as shown in a listing row: a file, a directory, or
/// a volume root. Volumes are directories with optional capacity figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size_bytes: Option<u64>,
    pub free_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
}

/// Key under which an entry participates in the selection set. Normally the
/// display name; when a backend returns two rows with the same name in one
/// listing, those rows fall back to their full paths so they stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionKey {
    Name(String),
    Path(PathBuf),
}

/// Converts a raw volume into an `Entry`. The display name is the mount path
/// with trailing separators stripped (a bare root keeps its separator); the
/// path itself is never touched. Capacity figures are kept only when they are
/// coherent; anything else stays unset and renders as "unknown".
pub fn normalize_volume(raw: RawVolume) -> Entry {
    let path_text = raw.path.to_string_lossy();
    let stripped = path_text.trim_end_matches(['/', '\\']);
    let fallback = if stripped.is_empty() {
        path_text.to_string()
    } else {
        stripped.to_string()
    };
    let name = raw.name.unwrap_or(fallback);

    let (free_bytes, total_bytes) = match (raw.free_bytes, raw.total_bytes) {
        (Some(free), Some(total)) if total == 0 || free > total => {
            tracing::debug!(
                path = %raw.path.display(),
                free,
                total,
                "dropping inconsistent capacity figures"
            );
            (None, None)
        }
        other => other,
    };

    Entry {
        name,
        path: raw.path,
        is_directory: true,
        size_bytes: None,
        free_bytes,
        total_bytes,
    }
}

/// Converts a raw directory row into an `Entry`. Fields pass through as-is;
/// a missing size stays missing.
pub fn normalize_file(raw: RawFileEntry) -> Entry {
    Entry {
        name: raw.name,
        path: raw.path,
        is_directory: raw.is_directory,
        size_bytes: raw.size_bytes,
        free_bytes: None,
        total_bytes: None,
    }
}

/// The ordered result of one directory or volume query. The order is exactly
/// what the backend returned; nothing here re-sorts it. A fresh `Listing`
/// replaces the previous one wholesale, which is also what invalidates any
/// selection made against the old one.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    entries: Vec<Entry>,
    keys: Vec<SelectionKey>,
}

impl Listing {
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for entry in &entries {
            *name_counts.entry(entry.name.as_str()).or_insert(0) += 1;
        }
        let keys = entries
            .iter()
            .map(|entry| {
                if name_counts[entry.name.as_str()] > 1 {
                    SelectionKey::Path(entry.path.clone())
                } else {
                    SelectionKey::Name(entry.name.clone())
                }
            })
            .collect();
        Listing { entries, keys }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn key(&self, index: usize) -> Option<&SelectionKey> {
        self.keys.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }
}
