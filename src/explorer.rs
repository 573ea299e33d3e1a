use std::path::{Path, PathBuf};

use crate::backend::{Completion, FileOp, LaunchOp, Request};
use crate::command::Command;
use crate::entry::{self, Listing};
use crate::error::{ExplorerError, Result};
use crate::favourites::{self, Favourite, FavouriteKind, FavouritesRegistry, ToggleOutcome};
use crate::intent::{IntentKind, OperationIntent};
use crate::navigation::{ListingRequest, NavOutcome, Navigator};
use crate::selection::{Modifiers, SelectionController};
use crate::store::SettingsStore;

/// Side effects the explorer wants carried out. Backend requests go to the
/// worker thread; the clipboard is written by the caller since the core
/// stays free of UI and OS handles.
#[derive(Debug)]
pub enum Effect {
    Backend(Request),
    CopyToClipboard(String),
}

/// One status-line message. Errors stick until the next command or a
/// successful navigation clears them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Result of handing a command to [`Explorer::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// The command needs a name typed by the user first; collect one and
    /// call [`Explorer::dispatch_with_name`].
    NeedsName(Command),
}

/// What a completion did to the visible listings, so the view can reset
/// cursors and scroll positions when a pane's contents were swapped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    FilesReplaced,
    VolumesReplaced,
    Nothing,
}

/// The explorer core: owns the listings, the selection, the navigation
/// history, the staged operation intent and the favourites registry, and
/// maps commands onto them. All filesystem work leaves as [`Effect`]s and
/// comes back through [`Explorer::apply`]; nothing here blocks.
pub struct Explorer {
    volumes: Listing,
    files: Listing,
    selection: SelectionController,
    nav: Navigator,
    intent: Option<OperationIntent>,
    intent_generation: u64,
    favourites: FavouritesRegistry,
    store: SettingsStore,
    limit: Option<usize>,
    notice: Option<Notice>,
    effects: Vec<Effect>,
    next_id: u64,
    pending_volumes: Option<u64>,
    /// Outstanding cut-paste: (mutation id, intent generation at paste time).
    /// The intent is cleared only when this exact mutation succeeds and the
    /// intent has not been restaged since.
    pending_cut: Option<(u64, u64)>,
}

impl Explorer {
    pub fn new(store: SettingsStore, limit: Option<usize>) -> Self {
        let favourites = FavouritesRegistry::from_entries(store.settings().favourites.clone());
        Explorer {
            volumes: Listing::default(),
            files: Listing::default(),
            selection: SelectionController::new(),
            nav: Navigator::new(),
            intent: None,
            intent_generation: 0,
            favourites,
            store,
            limit,
            notice: None,
            effects: Vec::new(),
            next_id: 0,
            pending_volumes: None,
            pending_cut: None,
        }
    }

    /// Queues the startup fetches: the volume list and the first directory.
    pub fn start(&mut self, dir: PathBuf) {
        self.refresh_volumes();
        self.open_path(dir);
    }

    // --- Read accessors for the view ---

    pub fn files(&self) -> &Listing {
        &self.files
    }

    pub fn volumes(&self) -> &Listing {
        &self.volumes
    }

    pub fn favourites(&self) -> &FavouritesRegistry {
        &self.favourites
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn current_directory(&self) -> Option<&Path> {
        self.nav.current_directory()
    }

    pub fn can_go_back(&self) -> bool {
        self.nav.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.nav.can_go_forward()
    }

    pub fn intent(&self) -> Option<&OperationIntent> {
        self.intent.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn places_percent(&self) -> u16 {
        self.store.settings().panes.places_percent
    }

    /// Persists the places-pane width write-through, like every other
    /// settings mutation.
    pub fn set_places_percent(&mut self, percent: u16) {
        let clamped = percent.clamp(15, 70);
        if self.store.settings().panes.places_percent == clamped {
            return;
        }
        if let Err(err) = self.store.update(|s| s.panes.places_percent = clamped) {
            self.report(err);
        }
    }

    /// Drains the queued side effects for the caller to execute.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // --- Selection input ---

    pub fn click(&mut self, index: usize, modifiers: Modifiers) {
        self.selection.click(&self.files, index, modifiers);
    }

    /// Double-click or Enter on a files row. Directories navigate; anything
    /// else is handed to the external opener via the `open` command. The
    /// activated row joins the selection if it was not part of it, so Enter
    /// works straight after a listing loads.
    pub fn activate(&mut self, index: usize) {
        let Some((is_directory, path)) = self
            .files
            .get(index)
            .map(|e| (e.is_directory, e.path.clone()))
        else {
            return;
        };
        if is_directory {
            self.open_path(path);
        } else {
            if !self.selection.is_selected(&self.files, index) {
                self.selection.click(&self.files, index, Modifiers::NONE);
            }
            self.dispatch(Command::Open);
        }
    }

    pub fn activate_volume(&mut self, index: usize) {
        if let Some(path) = self.volumes.get(index).map(|e| e.path.clone()) {
            self.open_path(path);
        }
    }

    pub fn activate_favourite(&mut self, index: usize) {
        let Some((kind, path)) = self
            .favourites
            .get(index)
            .map(|f| (f.kind, f.path.clone()))
        else {
            return;
        };
        match kind {
            FavouriteKind::Volume | FavouriteKind::Folder => self.open_path(path),
            FavouriteKind::BookmarkedFile => {
                self.launch(LaunchOp::Open { paths: vec![path] });
            }
        }
    }

    // --- Navigation ---

    pub fn open_path(&mut self, path: PathBuf) {
        self.notice = None;
        let request = self.nav.open(path);
        self.push_listing(request);
    }

    pub fn refresh_volumes(&mut self) {
        self.next_id += 1;
        let token = self.next_id;
        self.pending_volumes = Some(token);
        self.effects.push(Effect::Backend(Request::Volumes { token }));
    }

    // --- Command dispatch ---

    /// Resolves a raw identifier, e.g. from the command prompt. Unknown
    /// identifiers are logged and ignored so stale key tables cannot crash
    /// anything.
    pub fn dispatch_id(&mut self, id: &str) -> DispatchOutcome {
        match Command::parse(id) {
            Some(command) => self.dispatch(command),
            None => {
                tracing::warn!(id, "ignoring unknown command identifier");
                DispatchOutcome::Handled
            }
        }
    }

    pub fn dispatch(&mut self, command: Command) -> DispatchOutcome {
        if command.needs_name() {
            return DispatchOutcome::NeedsName(command);
        }
        tracing::debug!(%command, "dispatching");
        self.notice = None;
        if let Err(err) = self.run_command(command) {
            self.report(err);
        }
        DispatchOutcome::Handled
    }

    /// Second half of the `new-folder`/`new-file` dispatch, once the view
    /// has collected a name.
    pub fn dispatch_with_name(&mut self, command: Command, name: &str) {
        self.notice = None;
        let result = match command {
            Command::NewFolder => self.create_entry(command, name),
            Command::NewFile => self.create_entry(command, name),
            other => {
                tracing::warn!(command = %other, "command does not take a name");
                Ok(())
            }
        };
        if let Err(err) = result {
            self.report(err);
        }
    }

    fn run_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Copy => self.stage(IntentKind::Copy),
            Command::Cut => self.stage(IntentKind::Cut),
            Command::Symlink => self.stage(IntentKind::Symlink),
            Command::Hardlink => self.stage(IntentKind::Hardlink),
            Command::Paste => self.paste(),
            Command::CopyPath => self.copy_paths_to_clipboard(),
            Command::AddFavourite => self.toggle_favourites_for_selection(),
            Command::ReadOnly => self.set_selection_read_only(true),
            Command::ReadWrite => self.set_selection_read_only(false),
            Command::MoveToBin => self.recycle_selection(),
            Command::DeleteForever => self.delete_selection(),
            Command::SelectAll => {
                self.selection.select_all(&self.files);
                Ok(())
            }
            Command::SelectNone => {
                self.selection.select_none();
                Ok(())
            }
            Command::InvertSelection => {
                self.selection.invert(&self.files);
                Ok(())
            }
            Command::Open => {
                let paths = self.require_selection()?;
                self.launch(LaunchOp::Open { paths });
                Ok(())
            }
            Command::Edit => {
                let paths = self.require_selection()?;
                self.launch(LaunchOp::Edit { paths });
                Ok(())
            }
            Command::History => {
                let mut paths = self.require_selection()?;
                if paths.len() != 1 {
                    return Err(ExplorerError::precondition(
                        "history needs exactly one selected item",
                    ));
                }
                let path = paths.remove(0);
                self.launch(LaunchOp::History { path });
                Ok(())
            }
            Command::Script(slot) => self.run_script(slot),
            Command::EditConfigFile => {
                self.launch(LaunchOp::OpenConfig);
                Ok(())
            }
            Command::Back => {
                if let Some(request) = self.nav.back() {
                    self.push_listing(request);
                }
                Ok(())
            }
            Command::Forward => {
                if let Some(request) = self.nav.forward() {
                    self.push_listing(request);
                }
                Ok(())
            }
            Command::Refresh => {
                if let Some(request) = self.nav.refresh() {
                    self.push_listing(request);
                }
                self.refresh_volumes();
                Ok(())
            }
            Command::Up => {
                if let Some(request) = self.nav.up() {
                    self.push_listing(request);
                }
                Ok(())
            }
            Command::NewFolder | Command::NewFile => {
                // Routed through dispatch_with_name; dispatch() never gets here.
                Ok(())
            }
        }
    }

    // --- Completions ---

    /// Applies one worker reply. Superseded listing replies are dropped
    /// here without touching any state.
    pub fn apply(&mut self, completion: Completion) -> Applied {
        match completion {
            Completion::Listing { token, path, result } => {
                let (status, rows) = match result {
                    Ok(rows) => (Ok(()), rows),
                    Err(err) => (Err(err), Vec::new()),
                };
                match self.nav.complete(token, status) {
                    NavOutcome::Entered(dir) => {
                        tracing::debug!(
                            dir = %dir.display(),
                            rows = rows.len(),
                            "directory listing applied"
                        );
                        self.files =
                            Listing::new(rows.into_iter().map(entry::normalize_file).collect());
                        self.selection.reset();
                        self.notice = None;
                        Applied::FilesReplaced
                    }
                    NavOutcome::Failed(err) => {
                        self.report(err);
                        Applied::Nothing
                    }
                    NavOutcome::Stale => {
                        tracing::debug!(token, path = %path.display(), "stale listing dropped");
                        Applied::Nothing
                    }
                }
            }
            Completion::Volumes { token, result } => {
                if self.pending_volumes != Some(token) {
                    tracing::debug!(token, "stale volume listing dropped");
                    return Applied::Nothing;
                }
                self.pending_volumes = None;
                match result {
                    Ok(rows) => {
                        self.volumes =
                            Listing::new(rows.into_iter().map(entry::normalize_volume).collect());
                        Applied::VolumesReplaced
                    }
                    Err(err) => {
                        self.report(err);
                        Applied::Nothing
                    }
                }
            }
            Completion::Mutate { id, done, result } => {
                match result {
                    Ok(()) => {
                        self.settle_cut(id, true);
                        self.notice = Some(Notice::Info(done));
                    }
                    Err(err) => {
                        self.settle_cut(id, false);
                        self.report(err);
                    }
                }
                // The filesystem changed (or may have, on a partial batch);
                // show the truth.
                if let Some(request) = self.nav.refresh() {
                    self.push_listing(request);
                }
                Applied::Nothing
            }
            Completion::Launch { result } => {
                if let Err(err) = result {
                    self.report(err);
                }
                Applied::Nothing
            }
        }
    }

    /// Resolves an outstanding cut-paste ticket. On success the staged cut
    /// is consumed, unless a newer intent has been staged since; on failure
    /// the intent stays for another try.
    fn settle_cut(&mut self, id: u64, succeeded: bool) {
        let Some((pending_id, generation)) = self.pending_cut else {
            return;
        };
        if pending_id != id {
            return;
        }
        self.pending_cut = None;
        if succeeded && generation == self.intent_generation {
            self.intent = None;
            self.intent_generation += 1;
        }
    }

    // --- Favourites ---

    pub fn toggle_favourite_volume(&mut self, index: usize) {
        let Some(candidate) = self
            .volumes
            .get(index)
            .map(|e| Favourite::new(e.name.clone(), e.path.clone(), FavouriteKind::Volume))
        else {
            return;
        };
        self.notice = None;
        self.apply_favourite_toggle(vec![candidate]);
    }

    pub fn remove_favourite_at(&mut self, index: usize) {
        let Some(path) = self.favourites.get(index).map(|f| f.path.clone()) else {
            return;
        };
        if self.favourites.remove(&path) {
            self.info(format!("removed {} from favourites", path.display()));
            self.persist_favourites();
        }
    }

    fn toggle_favourites_for_selection(&mut self) -> Result<()> {
        let candidates: Vec<Favourite> = self
            .selection
            .entries(&self.files)
            .into_iter()
            .map(|e| {
                Favourite::new(
                    e.name.clone(),
                    e.path.clone(),
                    favourites::classify(&e.path, e.is_directory),
                )
            })
            .collect();
        if candidates.is_empty() {
            return Err(ExplorerError::precondition("nothing selected to favourite"));
        }
        self.apply_favourite_toggle(candidates);
        Ok(())
    }

    fn apply_favourite_toggle(&mut self, candidates: Vec<Favourite>) {
        match self.favourites.toggle(candidates) {
            ToggleOutcome::Added(n) => self.info(format!("added {} to favourites", items(n))),
            ToggleOutcome::Removed(n) => {
                self.info(format!("removed {} from favourites", items(n)))
            }
            ToggleOutcome::Nothing => return,
        }
        self.persist_favourites();
    }

    fn persist_favourites(&mut self) {
        let favourites = self.favourites.entries().to_vec();
        if let Err(err) = self.store.update(|s| s.favourites = favourites) {
            self.report(err);
        }
    }

    // --- Command bodies ---

    fn stage(&mut self, kind: IntentKind) -> Result<()> {
        let paths = self.require_selection()?;
        let intent = OperationIntent::stage(kind, paths)?;
        let staged = intent.len();
        self.intent = Some(intent);
        self.intent_generation += 1;
        self.info(format!("{} staged for {}", items(staged), kind.label()));
        Ok(())
    }

    fn paste(&mut self) -> Result<()> {
        let destination = self.current_dir()?;
        let intent = self
            .intent
            .as_ref()
            .ok_or_else(|| ExplorerError::precondition("nothing staged to paste"))?;
        if intent.single_use() && self.pending_cut.is_some() {
            return Err(ExplorerError::precondition(
                "the staged move is already being pasted",
            ));
        }
        let ops = intent.paste_ops(&destination)?;
        let single_use = intent.single_use();
        let done = format!("pasted {}", items(ops.len()));
        let id = self.mutate(done, ops);
        if single_use {
            self.pending_cut = Some((id, self.intent_generation));
        }
        Ok(())
    }

    fn copy_paths_to_clipboard(&mut self) -> Result<()> {
        let paths = self.require_selection()?;
        let copied = paths.len();
        let text = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        self.effects.push(Effect::CopyToClipboard(text));
        self.info(format!("copied {} to the clipboard", items(copied)));
        Ok(())
    }

    fn set_selection_read_only(&mut self, read_only: bool) -> Result<()> {
        let paths = self.require_selection()?;
        let what = if read_only { "read-only" } else { "writable" };
        let done = format!("made {} {what}", items(paths.len()));
        let ops = paths
            .into_iter()
            .map(|path| FileOp::SetReadOnly { path, read_only })
            .collect();
        self.mutate(done, ops);
        Ok(())
    }

    fn recycle_selection(&mut self) -> Result<()> {
        let paths = self.require_selection()?;
        let done = format!("moved {} to the bin", items(paths.len()));
        let ops = paths
            .into_iter()
            .map(|path| FileOp::Recycle { path })
            .collect();
        self.mutate(done, ops);
        Ok(())
    }

    fn delete_selection(&mut self) -> Result<()> {
        let paths = self.require_selection()?;
        let done = format!("deleted {}", items(paths.len()));
        let ops = paths
            .into_iter()
            .map(|path| FileOp::Delete { path })
            .collect();
        self.mutate(done, ops);
        Ok(())
    }

    fn create_entry(&mut self, command: Command, name: &str) -> Result<()> {
        let dir = self.current_dir()?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ExplorerError::precondition("the name is empty"));
        }
        let (op, done) = match command {
            Command::NewFolder => (
                FileOp::CreateFolder {
                    dir,
                    name: trimmed.to_string(),
                },
                format!("created folder {trimmed}"),
            ),
            _ => (
                FileOp::CreateFile {
                    dir,
                    name: trimmed.to_string(),
                },
                format!("created file {trimmed}"),
            ),
        };
        self.mutate(done, vec![op]);
        Ok(())
    }

    fn run_script(&mut self, slot: u8) -> Result<()> {
        let line = self
            .store
            .settings()
            .script(slot)
            .ok_or_else(|| {
                ExplorerError::precondition(format!("script {slot} is not configured"))
            })?
            .to_string();
        let cwd = self.current_dir()?;
        let paths = self.selection.paths(&self.files);
        self.info(format!("running script {slot}"));
        self.launch(LaunchOp::RunScript { line, cwd, paths });
        Ok(())
    }

    // --- Plumbing ---

    fn push_listing(&mut self, request: ListingRequest) {
        self.effects.push(Effect::Backend(Request::Listing {
            token: request.token,
            path: request.path,
            limit: self.limit,
        }));
    }

    fn mutate(&mut self, done: String, ops: Vec<FileOp>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.effects
            .push(Effect::Backend(Request::Mutate { id, done, ops }));
        id
    }

    fn launch(&mut self, op: LaunchOp) {
        self.effects.push(Effect::Backend(Request::Launch { op }));
    }

    fn require_selection(&self) -> Result<Vec<PathBuf>> {
        let paths = self.selection.paths(&self.files);
        if paths.is_empty() {
            Err(ExplorerError::precondition("nothing is selected"))
        } else {
            Ok(paths)
        }
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.nav
            .current_directory()
            .map(Path::to_path_buf)
            .ok_or_else(|| ExplorerError::precondition("no directory is open yet"))
    }

    fn info(&mut self, text: String) {
        self.notice = Some(Notice::Info(text));
    }

    fn report(&mut self, err: ExplorerError) {
        if matches!(err, ExplorerError::Stale) {
            return;
        }
        tracing::warn!(%err, "operation failed");
        self.notice = Some(Notice::Error(err.to_string()));
    }
}

fn items(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RawFileEntry;
    use crate::selection::Modifiers;

    fn new_explorer() -> (Explorer, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::load(dir.path().join("settings.json"));
        (Explorer::new(store, None), dir)
    }

    fn rows(dir: &str, names: &[(&str, bool)]) -> Vec<RawFileEntry> {
        names
            .iter()
            .map(|(name, is_directory)| RawFileEntry {
                name: name.to_string(),
                path: PathBuf::from(dir).join(name),
                is_directory: *is_directory,
                size_bytes: None,
            })
            .collect()
    }

    /// Pulls the listing token out of the newest queued listing request.
    fn last_listing_token(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .rev()
            .find_map(|e| match e {
                Effect::Backend(Request::Listing { token, .. }) => Some(*token),
                _ => None,
            })
            .expect("a listing request was queued")
    }

    fn mutate_parts(effects: &[Effect]) -> (u64, String, Vec<FileOp>) {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Backend(Request::Mutate { id, done, ops }) => {
                    Some((*id, done.clone(), ops.clone()))
                }
                _ => None,
            })
            .expect("a mutation request was queued")
    }

    fn enter(explorer: &mut Explorer, dir: &str, names: &[(&str, bool)]) {
        explorer.open_path(PathBuf::from(dir));
        let token = last_listing_token(&explorer.take_effects());
        let applied = explorer.apply(Completion::Listing {
            token,
            path: PathBuf::from(dir),
            result: Ok(rows(dir, names)),
        });
        assert_eq!(applied, Applied::FilesReplaced);
    }

    #[test]
    fn successful_open_replaces_the_listing_and_resets_selection() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("one", false), ("two", true)]);
        explorer.click(0, Modifiers::NONE);
        assert_eq!(explorer.selection().count(explorer.files()), 1);

        enter(&mut explorer, "/b", &[("three", false)]);
        assert_eq!(explorer.files().len(), 1);
        assert_eq!(explorer.selection().count(explorer.files()), 0);
        assert_eq!(explorer.selection().anchor(), None);
        assert_eq!(explorer.current_directory(), Some(Path::new("/b")));
    }

    #[test]
    fn failed_open_keeps_directory_listing_and_selection() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/x", &[("keep", false)]);
        explorer.click(0, Modifiers::NONE);

        explorer.open_path(PathBuf::from("/y"));
        let token = last_listing_token(&explorer.take_effects());
        let applied = explorer.apply(Completion::Listing {
            token,
            path: PathBuf::from("/y"),
            result: Err(ExplorerError::io_msg("cannot read /y")),
        });

        assert_eq!(applied, Applied::Nothing);
        assert_eq!(explorer.current_directory(), Some(Path::new("/x")));
        assert_eq!(explorer.selection().count(explorer.files()), 1);
        let notice = explorer.notice().expect("an error notice");
        assert!(notice.is_error());
        assert_eq!(notice.text(), "cannot read /y");
    }

    #[test]
    fn superseded_listing_reply_is_dropped_silently() {
        let (mut explorer, _guard) = new_explorer();
        explorer.open_path(PathBuf::from("/slow"));
        let slow = last_listing_token(&explorer.take_effects());
        explorer.open_path(PathBuf::from("/fast"));
        let fast = last_listing_token(&explorer.take_effects());

        let applied = explorer.apply(Completion::Listing {
            token: fast,
            path: PathBuf::from("/fast"),
            result: Ok(rows("/fast", &[("winner", false)])),
        });
        assert_eq!(applied, Applied::FilesReplaced);

        let applied = explorer.apply(Completion::Listing {
            token: slow,
            path: PathBuf::from("/slow"),
            result: Ok(rows("/slow", &[("loser", false), ("rows", false)])),
        });
        assert_eq!(applied, Applied::Nothing);
        assert_eq!(explorer.files().len(), 1);
        assert_eq!(explorer.current_directory(), Some(Path::new("/fast")));
        assert!(explorer.notice().is_none(), "stale replies are not surfaced");
    }

    #[test]
    fn cut_paste_is_single_use() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/src", &[("p1", false), ("p2", false)]);
        explorer.click(0, Modifiers::NONE);
        explorer.click(1, Modifiers::SHIFT);
        explorer.dispatch(Command::Cut);
        assert_eq!(explorer.intent().map(|i| i.len()), Some(2));

        explorer.dispatch(Command::Paste);
        let (id, done, ops) = mutate_parts(&explorer.take_effects());
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], FileOp::Move { .. }));
        assert!(explorer.intent().is_some(), "intent stays until the move lands");

        explorer.apply(Completion::Mutate {
            id,
            done,
            result: Ok(()),
        });
        assert!(explorer.intent().is_none(), "a cut is consumed by its paste");

        explorer.dispatch(Command::Paste);
        let notice = explorer.notice().expect("a precondition notice");
        assert!(notice.is_error());
        assert_eq!(notice.text(), "nothing staged to paste");
    }

    #[test]
    fn copy_intent_survives_repeated_pastes() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/src", &[("file", false)]);
        explorer.click(0, Modifiers::NONE);
        explorer.dispatch(Command::Copy);

        for _ in 0..2 {
            explorer.dispatch(Command::Paste);
            let (id, done, ops) = mutate_parts(&explorer.take_effects());
            assert!(matches!(ops[0], FileOp::Copy { .. }));
            explorer.apply(Completion::Mutate {
                id,
                done,
                result: Ok(()),
            });
            assert!(explorer.intent().is_some());
        }
    }

    #[test]
    fn failed_cut_paste_keeps_the_intent_for_retry() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/src", &[("file", false)]);
        explorer.click(0, Modifiers::NONE);
        explorer.dispatch(Command::Cut);
        explorer.dispatch(Command::Paste);
        let (id, done, _) = mutate_parts(&explorer.take_effects());

        explorer.apply(Completion::Mutate {
            id,
            done,
            result: Err(ExplorerError::io_msg("disk full")),
        });
        assert!(explorer.intent().is_some(), "a failed paste consumes nothing");
        let notice = explorer.notice().expect("an error notice");
        assert_eq!(notice.text(), "disk full");

        explorer.dispatch(Command::Paste);
        let (_, _, ops) = mutate_parts(&explorer.take_effects());
        assert!(matches!(ops[0], FileOp::Move { .. }), "retry is possible");
    }

    #[test]
    fn restaging_during_a_cut_paste_protects_the_new_intent() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/src", &[("a", false), ("b", false)]);
        explorer.click(0, Modifiers::NONE);
        explorer.dispatch(Command::Cut);
        explorer.dispatch(Command::Paste);
        let (id, done, _) = mutate_parts(&explorer.take_effects());

        // The user changes their mind while the move is still running.
        explorer.click(1, Modifiers::NONE);
        explorer.dispatch(Command::Copy);

        explorer.apply(Completion::Mutate {
            id,
            done,
            result: Ok(()),
        });
        let intent = explorer.intent().expect("the newer intent survives");
        assert_eq!(intent.kind, IntentKind::Copy);
    }

    #[test]
    fn second_paste_while_a_cut_is_in_flight_is_blocked() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/src", &[("a", false)]);
        explorer.click(0, Modifiers::NONE);
        explorer.dispatch(Command::Cut);
        explorer.dispatch(Command::Paste);
        explorer.take_effects();

        explorer.dispatch(Command::Paste);
        let notice = explorer.notice().expect("a precondition notice");
        assert!(notice.is_error());
        assert!(explorer.take_effects().is_empty(), "no second mutation is queued");
    }

    #[test]
    fn unknown_identifiers_are_ignored_without_state_changes() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("one", false)]);
        explorer.click(0, Modifiers::NONE);
        explorer.take_effects();

        assert_eq!(explorer.dispatch_id("rename"), DispatchOutcome::Handled);
        assert!(explorer.take_effects().is_empty());
        assert_eq!(explorer.selection().count(explorer.files()), 1);
        assert!(explorer.notice().is_none());
    }

    #[test]
    fn commands_needing_a_selection_fail_before_any_backend_call() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("one", false)]);
        explorer.take_effects();

        for command in [
            Command::Copy,
            Command::Cut,
            Command::MoveToBin,
            Command::DeleteForever,
            Command::Open,
            Command::CopyPath,
        ] {
            explorer.dispatch(command);
            let notice = explorer.notice().expect("a precondition notice");
            assert!(notice.is_error(), "{command} should be blocked");
            assert!(
                explorer.take_effects().is_empty(),
                "{command} must not reach the backend"
            );
        }
    }

    #[test]
    fn toggling_favourites_persists_write_through() {
        let (mut explorer, guard) = new_explorer();
        enter(&mut explorer, "/a", &[("docs", true)]);
        explorer.click(0, Modifiers::NONE);

        explorer.dispatch(Command::AddFavourite);
        assert_eq!(explorer.favourites().len(), 1);
        let saved = std::fs::read_to_string(guard.path().join("settings.json")).expect("settings");
        assert!(saved.contains("/a/docs"), "got {saved}");

        explorer.dispatch(Command::AddFavourite);
        assert_eq!(explorer.favourites().len(), 0);
        let saved = std::fs::read_to_string(guard.path().join("settings.json")).expect("settings");
        assert!(!saved.contains("/a/docs"), "got {saved}");
    }

    #[test]
    fn mutation_completions_queue_a_refresh_of_the_current_directory() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("junk", false)]);
        explorer.click(0, Modifiers::NONE);
        explorer.dispatch(Command::DeleteForever);
        let (id, done, ops) = mutate_parts(&explorer.take_effects());
        assert_eq!(ops, vec![FileOp::Delete { path: PathBuf::from("/a/junk") }]);

        explorer.apply(Completion::Mutate {
            id,
            done,
            result: Ok(()),
        });
        let notice = explorer.notice().expect("a success notice");
        assert!(!notice.is_error());
        assert_eq!(notice.text(), "deleted 1 item");

        let effects = explorer.take_effects();
        let refreshed = effects.iter().any(|e| {
            matches!(
                e,
                Effect::Backend(Request::Listing { path, .. }) if path == Path::new("/a")
            )
        });
        assert!(refreshed, "the listing is re-fetched after a mutation");
    }

    #[test]
    fn stale_volume_replies_are_dropped() {
        let (mut explorer, _guard) = new_explorer();
        explorer.refresh_volumes();
        explorer.refresh_volumes();
        let effects = explorer.take_effects();
        let tokens: Vec<u64> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Backend(Request::Volumes { token }) => Some(*token),
                _ => None,
            })
            .collect();
        assert_eq!(tokens.len(), 2);

        let stale = explorer.apply(Completion::Volumes {
            token: tokens[0],
            result: Ok(vec![]),
        });
        assert_eq!(stale, Applied::Nothing);

        let fresh = explorer.apply(Completion::Volumes {
            token: tokens[1],
            result: Ok(vec![crate::backend::RawVolume {
                path: PathBuf::from("/"),
                name: None,
                free_bytes: None,
                total_bytes: None,
            }]),
        });
        assert_eq!(fresh, Applied::VolumesReplaced);
        assert_eq!(explorer.volumes().len(), 1);
    }

    #[test]
    fn activating_a_directory_navigates_and_a_file_opens_externally() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("sub", true), ("file.txt", false)]);

        explorer.activate(0);
        let effects = explorer.take_effects();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Backend(Request::Listing { path, .. })] if path == Path::new("/a/sub")
        ));

        // No click first: activation selects the row itself.
        explorer.activate(1);
        let effects = explorer.take_effects();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Backend(Request::Launch {
                op: LaunchOp::Open { paths }
            })] if paths == &[PathBuf::from("/a/file.txt")]
        ));
        assert_eq!(explorer.selection().count(explorer.files()), 1);
    }

    #[test]
    fn scripts_need_configuration_and_then_launch_in_the_current_directory() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/work", &[("data.csv", false)]);

        explorer.dispatch(Command::Script(2));
        let notice = explorer.notice().expect("a precondition notice");
        assert!(notice.is_error());
        assert!(explorer.take_effects().is_empty());

        explorer
            .store
            .update(|s| s.scripts = vec![String::new(), "wc -l \"$FILEDECK_PATH\"".to_string()])
            .expect("save scripts");
        explorer.click(0, Modifiers::NONE);
        explorer.dispatch(Command::Script(2));
        let effects = explorer.take_effects();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Backend(Request::Launch {
                op: LaunchOp::RunScript { cwd, paths, .. }
            })] if cwd == Path::new("/work") && paths.len() == 1
        ));
    }

    #[test]
    fn copy_path_emits_a_clipboard_effect_in_listing_order() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("one", false), ("two", false)]);
        explorer.click(1, Modifiers::NONE);
        explorer.click(0, Modifiers::CTRL);

        explorer.dispatch(Command::CopyPath);
        let effects = explorer.take_effects();
        match effects.as_slice() {
            [Effect::CopyToClipboard(text)] => assert_eq!(text, "/a/one\n/a/two"),
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn select_all_none_and_invert_dispatch_to_the_controller() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("one", false), ("two", false), ("three", false)]);

        explorer.dispatch(Command::SelectAll);
        assert_eq!(explorer.selection().count(explorer.files()), 3);

        explorer.dispatch(Command::InvertSelection);
        assert_eq!(explorer.selection().count(explorer.files()), 0);

        explorer.dispatch(Command::InvertSelection);
        explorer.dispatch(Command::SelectNone);
        assert_eq!(explorer.selection().count(explorer.files()), 0);
    }

    #[test]
    fn history_demands_exactly_one_selected_item() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[("one", false), ("two", false)]);
        explorer.dispatch(Command::SelectAll);
        explorer.dispatch(Command::History);
        let notice = explorer.notice().expect("a precondition notice");
        assert!(notice.is_error());
        assert!(explorer.take_effects().is_empty());

        explorer.click(0, Modifiers::NONE);
        explorer.dispatch(Command::History);
        let effects = explorer.take_effects();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Backend(Request::Launch {
                op: LaunchOp::History { path }
            })] if path == Path::new("/a/one")
        ));
    }

    #[test]
    fn new_folder_asks_for_a_name_then_mutates() {
        let (mut explorer, _guard) = new_explorer();
        enter(&mut explorer, "/a", &[]);

        assert_eq!(
            explorer.dispatch(Command::NewFolder),
            DispatchOutcome::NeedsName(Command::NewFolder)
        );
        assert!(explorer.take_effects().is_empty());

        explorer.dispatch_with_name(Command::NewFolder, "fresh");
        let (_, done, ops) = mutate_parts(&explorer.take_effects());
        assert_eq!(done, "created folder fresh");
        assert_eq!(
            ops,
            vec![FileOp::CreateFolder {
                dir: PathBuf::from("/a"),
                name: "fresh".to_string(),
            }]
        );
    }

    #[test]
    fn pane_width_changes_are_persisted_and_clamped() {
        let (mut explorer, guard) = new_explorer();
        explorer.set_places_percent(90);
        assert_eq!(explorer.places_percent(), 70);
        let saved = std::fs::read_to_string(guard.path().join("settings.json")).expect("settings");
        assert!(saved.contains("\"places_percent\": 70"), "got {saved}");
    }
}
