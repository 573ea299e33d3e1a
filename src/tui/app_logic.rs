use super::app_state::{AppMode, PaneFocus, PromptKind};
use crate::backend::{Completion, Request};
use crate::clipboard;
use crate::command::Command;
use crate::explorer::{Applied, DispatchOutcome, Effect, Explorer};
use crate::selection::Modifiers;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

// --- TuiApp struct and impl ---
pub struct TuiApp {
    pub(super) explorer: Explorer,
    pub(super) requests: Sender<Request>,
    pub(super) completions: Receiver<Completion>,
    pub(super) quit: bool,
    pub(super) mode: AppMode,
    pub(super) focus: PaneFocus,
    pub(super) files_cursor: usize,
    pub(super) files_scroll: usize,
    pub(super) files_viewport_height: usize,
    pub(super) volumes_cursor: usize,
    pub(super) favourites_cursor: usize,
    pub(super) prompt_input: String,
    pub(super) prompt_cursor_pos: usize,
    pub(super) last_click: Option<(Instant, usize)>,
    // Pane rectangles from the last draw, for mouse hit-testing.
    pub(super) volumes_area: Rect,
    pub(super) favourites_area: Rect,
    pub(super) files_area: Rect,
}

impl TuiApp {
    pub fn new(
        explorer: Explorer,
        requests: Sender<Request>,
        completions: Receiver<Completion>,
    ) -> Self {
        TuiApp {
            explorer,
            requests,
            completions,
            quit: false,
            mode: AppMode::Normal,
            focus: PaneFocus::Files,
            files_cursor: 0,
            files_scroll: 0,
            files_viewport_height: 0, // Will be updated by ui_renderer
            volumes_cursor: 0,
            favourites_cursor: 0,
            prompt_input: String::new(),
            prompt_cursor_pos: 0,
            last_click: None,
            volumes_area: Rect::default(),
            favourites_area: Rect::default(),
            files_area: Rect::default(),
        }
    }

    // --- Worker plumbing ---

    /// Sends everything the explorer queued to the worker (or, for clipboard
    /// effects, straight to the OS).
    pub(super) fn flush_effects(&mut self) {
        for effect in self.explorer.take_effects() {
            match effect {
                Effect::Backend(request) => {
                    if self.requests.send(request).is_err() {
                        tracing::error!("backend worker is gone, shutting down");
                        self.quit = true;
                    }
                }
                Effect::CopyToClipboard(text) => {
                    if let Err(err) = clipboard::copy_text_to_clipboard(text) {
                        tracing::warn!(%err, "clipboard copy failed");
                    }
                }
            }
        }
    }

    /// Applies every completion the worker has delivered so far, keeping the
    /// cursors inside whichever listings got replaced.
    pub(super) fn drain_completions(&mut self) {
        loop {
            match self.completions.try_recv() {
                Ok(completion) => match self.explorer.apply(completion) {
                    Applied::FilesReplaced => {
                        let len = self.explorer.files().len();
                        self.files_cursor = self.files_cursor.min(len.saturating_sub(1));
                        self.clamp_files_scroll();
                    }
                    Applied::VolumesReplaced => {
                        let len = self.explorer.volumes().len();
                        self.volumes_cursor = self.volumes_cursor.min(len.saturating_sub(1));
                    }
                    Applied::Nothing => {}
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("backend worker is gone, shutting down");
                    self.quit = true;
                    break;
                }
            }
        }
    }

    // --- Cursor movement ---

    fn move_files_cursor(&mut self, delta: i32, shift: bool) {
        let len = self.explorer.files().len();
        if len == 0 {
            return;
        }
        let max = (len - 1) as i64;
        let next = (self.files_cursor as i64 + i64::from(delta)).clamp(0, max) as usize;
        self.files_cursor = next;
        self.ensure_files_cursor_visible();
        let modifiers = if shift { Modifiers::SHIFT } else { Modifiers::NONE };
        self.explorer.click(next, modifiers);
    }

    fn jump_files_cursor(&mut self, index: usize, shift: bool) {
        let len = self.explorer.files().len();
        if len == 0 {
            return;
        }
        let next = index.min(len - 1);
        self.files_cursor = next;
        self.ensure_files_cursor_visible();
        let modifiers = if shift { Modifiers::SHIFT } else { Modifiers::NONE };
        self.explorer.click(next, modifiers);
    }

    fn page(&self) -> i32 {
        self.files_viewport_height.max(2) as i32 - 1
    }

    fn ensure_files_cursor_visible(&mut self) {
        let height = self.files_viewport_height.max(1);
        if self.files_cursor < self.files_scroll {
            self.files_scroll = self.files_cursor;
        } else if self.files_cursor >= self.files_scroll + height {
            self.files_scroll = self.files_cursor + 1 - height;
        }
    }

    pub(super) fn clamp_files_scroll(&mut self) {
        let len = self.explorer.files().len();
        let height = self.files_viewport_height.max(1);
        self.files_scroll = self.files_scroll.min(len.saturating_sub(height));
    }

    fn scroll_files(&mut self, delta: i32) {
        let len = self.explorer.files().len();
        let height = self.files_viewport_height.max(1);
        let max = len.saturating_sub(height) as i64;
        self.files_scroll = (self.files_scroll as i64 + i64::from(delta)).clamp(0, max) as usize;
    }

    // --- Prompt handling ---

    fn open_prompt(&mut self, kind: PromptKind) {
        self.mode = AppMode::Prompt(kind);
        self.prompt_input.clear();
        self.prompt_cursor_pos = 0;
    }

    fn submit_prompt(&mut self, kind: PromptKind) {
        let input = std::mem::take(&mut self.prompt_input);
        self.prompt_cursor_pos = 0;
        match kind {
            PromptKind::Name(command) => self.explorer.dispatch_with_name(command, &input),
            PromptKind::Command => {
                let id = input.trim();
                if id.is_empty() {
                    return;
                }
                if let DispatchOutcome::NeedsName(command) = self.explorer.dispatch_id(id) {
                    self.open_prompt(PromptKind::Name(command));
                }
            }
            PromptKind::JumpTo => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return;
                }
                self.explorer.open_path(expand_home(trimmed));
            }
        }
    }

    /// Dispatches a command, switching into the name prompt when it needs one.
    fn dispatch(&mut self, command: Command) {
        if let DispatchOutcome::NeedsName(command) = self.explorer.dispatch(command) {
            self.open_prompt(PromptKind::Name(command));
        }
    }

    fn adjust_places_width(&mut self, delta: i16) {
        let current = self.explorer.places_percent() as i16;
        let next = (current + delta).clamp(15, 70) as u16;
        self.explorer.set_places_percent(next);
    }

    // --- Event handling sub-methods ---
    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) {
        let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if key_event.modifiers == KeyModifiers::CONTROL => self.quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Char(':') => self.open_prompt(PromptKind::Command),
            KeyCode::Char('g') => self.open_prompt(PromptKind::JumpTo),
            KeyCode::Char(',') => self.dispatch(Command::EditConfigFile),
            KeyCode::Char('<') => self.adjust_places_width(-4),
            KeyCode::Char('>') => self.adjust_places_width(4),
            KeyCode::F(5) | KeyCode::Char('R') => self.dispatch(Command::Refresh),
            KeyCode::Backspace | KeyCode::Char('u') => self.dispatch(Command::Up),
            KeyCode::Char('[') => self.dispatch(Command::Back),
            KeyCode::Char(']') => self.dispatch(Command::Forward),
            KeyCode::Left if self.focus == PaneFocus::Files => self.dispatch(Command::Back),
            KeyCode::Right if self.focus == PaneFocus::Files => self.dispatch(Command::Forward),
            _ => match self.focus {
                PaneFocus::Files => self.handle_files_key(key_event, shift),
                PaneFocus::Volumes => self.handle_volumes_key(key_event),
                PaneFocus::Favourites => self.handle_favourites_key(key_event),
            },
        }
    }

    fn handle_files_key(&mut self, key_event: KeyEvent, shift: bool) {
        match key_event.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_files_cursor(1, shift),
            KeyCode::Up | KeyCode::Char('k') => self.move_files_cursor(-1, shift),
            KeyCode::Char('J') => self.move_files_cursor(1, true),
            KeyCode::Char('K') => self.move_files_cursor(-1, true),
            KeyCode::PageDown => self.move_files_cursor(self.page(), shift),
            KeyCode::PageUp => self.move_files_cursor(-self.page(), shift),
            KeyCode::Home => self.jump_files_cursor(0, shift),
            KeyCode::End => self.jump_files_cursor(usize::MAX, shift),
            KeyCode::Char(' ') => self.explorer.click(self.files_cursor, Modifiers::CTRL),
            KeyCode::Enter => self.explorer.activate(self.files_cursor),
            KeyCode::Char('a') => self.dispatch(Command::SelectAll),
            KeyCode::Char('d') => self.dispatch(Command::SelectNone),
            KeyCode::Char('i') => self.dispatch(Command::InvertSelection),
            KeyCode::Char('y') => self.dispatch(Command::Copy),
            KeyCode::Char('x') => self.dispatch(Command::Cut),
            KeyCode::Char('p') => self.dispatch(Command::Paste),
            KeyCode::Char('s') => self.dispatch(Command::Symlink),
            KeyCode::Char('l') => self.dispatch(Command::Hardlink),
            KeyCode::Char('c') => self.dispatch(Command::CopyPath),
            KeyCode::Char('f') => self.dispatch(Command::AddFavourite),
            KeyCode::Char('r') => self.dispatch(Command::ReadOnly),
            KeyCode::Char('w') => self.dispatch(Command::ReadWrite),
            KeyCode::Char('o') => self.dispatch(Command::Open),
            KeyCode::Char('e') => self.dispatch(Command::Edit),
            KeyCode::Char('H') => self.dispatch(Command::History),
            KeyCode::Char('n') => self.dispatch(Command::NewFile),
            KeyCode::Char('N') => self.dispatch(Command::NewFolder),
            KeyCode::Delete if shift => self.dispatch(Command::DeleteForever),
            KeyCode::Delete => self.dispatch(Command::MoveToBin),
            KeyCode::Char(digit @ '1'..='9') => {
                self.dispatch(Command::Script(digit as u8 - b'0'));
            }
            _ => {}
        }
    }

    fn handle_volumes_key(&mut self, key_event: KeyEvent) {
        let len = self.explorer.volumes().len();
        match key_event.code {
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                self.volumes_cursor = (self.volumes_cursor + 1).min(len - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.volumes_cursor = self.volumes_cursor.saturating_sub(1);
            }
            KeyCode::Enter => self.explorer.activate_volume(self.volumes_cursor),
            KeyCode::Char('f') => self.explorer.toggle_favourite_volume(self.volumes_cursor),
            _ => {}
        }
    }

    fn handle_favourites_key(&mut self, key_event: KeyEvent) {
        let len = self.explorer.favourites().len();
        match key_event.code {
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                self.favourites_cursor = (self.favourites_cursor + 1).min(len - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.favourites_cursor = self.favourites_cursor.saturating_sub(1);
            }
            KeyCode::Enter => self.explorer.activate_favourite(self.favourites_cursor),
            KeyCode::Delete => {
                self.explorer.remove_favourite_at(self.favourites_cursor);
                let len = self.explorer.favourites().len();
                self.favourites_cursor = self.favourites_cursor.min(len.saturating_sub(1));
            }
            _ => {}
        }
    }

    pub(super) fn handle_prompt_mode_input(&mut self, kind: PromptKind, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
                self.submit_prompt(kind);
            }
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.prompt_input.clear();
                self.prompt_cursor_pos = 0;
            }
            KeyCode::Char(c) => {
                self.prompt_input.insert(self.prompt_cursor_pos, c);
                self.prompt_cursor_pos += 1;
            }
            KeyCode::Backspace => {
                if self.prompt_cursor_pos > 0 && !self.prompt_input.is_empty() {
                    self.prompt_cursor_pos -= 1;
                    self.prompt_input.remove(self.prompt_cursor_pos);
                }
            }
            KeyCode::Left => {
                if self.prompt_cursor_pos > 0 {
                    self.prompt_cursor_pos -= 1;
                }
            }
            KeyCode::Right => {
                if self.prompt_cursor_pos < self.prompt_input.len() {
                    self.prompt_cursor_pos += 1;
                }
            }
            _ => {}
        }
    }

    // --- Mouse handling ---

    pub(super) fn handle_mouse(&mut self, mouse_event: MouseEvent) {
        let position = Position {
            x: mouse_event.column,
            y: mouse_event.row,
        };
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.files_area.contains(position) {
                    self.handle_files_click(position.y, mouse_event.modifiers);
                } else if self.volumes_area.contains(position) {
                    self.focus = PaneFocus::Volumes;
                    if let Some(index) = row_to_index(self.volumes_area, position.y, 0) {
                        if index < self.explorer.volumes().len() {
                            self.volumes_cursor = index;
                            self.explorer.activate_volume(index);
                        }
                    }
                } else if self.favourites_area.contains(position) {
                    self.focus = PaneFocus::Favourites;
                    if let Some(index) = row_to_index(self.favourites_area, position.y, 0) {
                        if index < self.explorer.favourites().len() {
                            self.favourites_cursor = index;
                            self.explorer.activate_favourite(index);
                        }
                    }
                }
            }
            MouseEventKind::ScrollDown if self.files_area.contains(position) => {
                self.scroll_files(3);
            }
            MouseEventKind::ScrollUp if self.files_area.contains(position) => {
                self.scroll_files(-3);
            }
            _ => {}
        }
    }

    fn handle_files_click(&mut self, row: u16, key_modifiers: KeyModifiers) {
        self.focus = PaneFocus::Files;
        let Some(index) = row_to_index(self.files_area, row, self.files_scroll) else {
            return;
        };
        if index >= self.explorer.files().len() {
            return;
        }

        let modifiers = Modifiers {
            ctrl: key_modifiers.contains(KeyModifiers::CONTROL),
            shift: key_modifiers.contains(KeyModifiers::SHIFT),
        };
        let now = Instant::now();
        let is_double = modifiers == Modifiers::NONE
            && self
                .last_click
                .take()
                .is_some_and(|(at, idx)| idx == index && now.duration_since(at) <= DOUBLE_CLICK_WINDOW);

        self.files_cursor = index;
        if is_double {
            self.explorer.activate(index);
        } else {
            self.explorer.click(index, modifiers);
            self.last_click = Some((now, index));
        }
    }
}

/// Maps a terminal row inside a bordered pane to a listing index. Rows on the
/// border, or past the inner area, are not rows at all.
fn row_to_index(area: Rect, row: u16, scroll: usize) -> Option<usize> {
    let top = area.y + 1;
    let bottom = (area.y + area.height).saturating_sub(1);
    if area.height < 3 || row < top || row >= bottom {
        return None;
    }
    Some((row - top) as usize + scroll)
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') {
            if let Some(home) = std::env::var_os("HOME") {
                let mut expanded = PathBuf::from(home);
                let rest = rest.trim_start_matches(['/', '\\']);
                if !rest.is_empty() {
                    expanded.push(rest);
                }
                return expanded;
            }
        }
    }
    PathBuf::from(path)
}
