use super::app_logic::TuiApp;
use super::app_state::{AppMode, PaneFocus, PromptKind};
use crate::command::Command;
use crate::entry::Entry;
use crate::favourites::{Favourite, FavouriteKind};
use crate::utils::fmt_bytes;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn draw_help_block(f: &mut Frame, _app: &TuiApp, area: Rect) {
    let help_text_lines_content = vec![
        Line::from(
            "Tab: Pane | Enter: Open | Bksp/u: Up | [/]: Back/Fwd | R/F5: Refresh | Space: Mark | a/d/i: All/None/Invert",
        ),
        Line::from(
            "y/x/p: Copy/Cut/Paste | s/l: Sym/Hard | f: Fav | Del: Bin | n/N: New | c: Path | :: Cmd | g: Go to | q: Quit",
        ),
    ];
    let help_paragraph = Paragraph::new(help_text_lines_content)
        .block(Block::default().borders(Borders::ALL).title("Filedeck"));
    f.render_widget(help_paragraph, area);
}

fn draw_prompt_block(f: &mut Frame, app: &TuiApp, area: Rect, kind: PromptKind) {
    let title = match kind {
        PromptKind::Name(Command::NewFolder) => "New folder name (Esc to cancel, Enter to create)",
        PromptKind::Name(Command::NewFile) => "New file name (Esc to cancel, Enter to create)",
        PromptKind::Name(_) => "Name (Esc to cancel, Enter to apply)",
        PromptKind::Command => "Command (Esc to cancel, Enter to run)",
        PromptKind::JumpTo => "Go to (Esc to cancel, Enter to open)",
    };
    let prompt_paragraph = Paragraph::new(app.prompt_input.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(prompt_paragraph, area);
    f.set_cursor_position((area.x + 1 + app.prompt_cursor_pos as u16, area.y + 1));
}

fn volume_line(entry: &Entry) -> String {
    format!("{}  {} free", entry.name, fmt_bytes(entry.free_bytes))
}

fn favourite_line(favourite: &Favourite) -> String {
    match favourite.kind {
        FavouriteKind::Volume | FavouriteKind::Folder => format!("{}/", favourite.name),
        FavouriteKind::BookmarkedFile => favourite.name.clone(),
    }
}

fn file_line(entry: &Entry, selected: bool) -> String {
    let marker = if selected { "[x] " } else { "[ ] " };
    if entry.is_directory {
        format!("{marker}{}/", entry.name)
    } else if entry.size_bytes.is_some() {
        format!("{marker}{}  ({})", entry.name, fmt_bytes(entry.size_bytes))
    } else {
        format!("{marker}{}", entry.name)
    }
}

fn draw_volumes_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let focused = app.focus == PaneFocus::Volumes;
    let items: Vec<ListItem> = app
        .explorer
        .volumes()
        .iter()
        .map(|entry| ListItem::new(volume_line(entry)))
        .collect();
    let list_widget = List::new(items)
        .block(pane_block("Volumes".to_string(), focused))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut list_state = ListState::default();
    if focused && !app.explorer.volumes().is_empty() {
        list_state.select(Some(app.volumes_cursor));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state);
}

fn draw_favourites_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let focused = app.focus == PaneFocus::Favourites;
    let items: Vec<ListItem> = app
        .explorer
        .favourites()
        .entries()
        .iter()
        .map(|favourite| ListItem::new(favourite_line(favourite)))
        .collect();
    let list_widget = List::new(items)
        .block(pane_block("Favourites".to_string(), focused))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut list_state = ListState::default();
    if focused && !app.explorer.favourites().is_empty() {
        list_state.select(Some(app.favourites_cursor));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state);
}

fn draw_files_block(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    app.files_viewport_height = area.height.saturating_sub(2) as usize;
    app.clamp_files_scroll();

    let listing = app.explorer.files();
    let selection = app.explorer.selection();
    let end = (app.files_scroll + app.files_viewport_height).min(listing.len());
    let items: Vec<ListItem> = (app.files_scroll..end)
        .filter_map(|i| listing.get(i).map(|entry| (i, entry)))
        .map(|(i, entry)| ListItem::new(file_line(entry, selection.is_selected(listing, i))))
        .collect();

    let title = match app.explorer.current_directory() {
        Some(dir) => {
            let back = if app.explorer.can_go_back() { "‹ " } else { "" };
            let forward = if app.explorer.can_go_forward() { " ›" } else { "" };
            format!("{back}{}{forward}", dir.display())
        }
        None => "loading".to_string(),
    };
    let list_widget = List::new(items)
        .block(pane_block(title, app.focus == PaneFocus::Files))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut list_state = ListState::default();
    if app.files_cursor >= app.files_scroll && app.files_cursor < end {
        list_state.select(Some(app.files_cursor - app.files_scroll));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state);
}

fn draw_status_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let listing = app.explorer.files();
    let selected = app.explorer.selection().count(listing);
    let mut summary = format!("{} items, {} selected", listing.len(), selected);
    if let Some(intent) = app.explorer.intent() {
        summary.push_str(&format!(" | staged: {} {}", intent.kind.label(), intent.len()));
    }

    // Detail for the row under the cursor of whichever pane has focus.
    let detail = match app.focus {
        PaneFocus::Files => listing.get(app.files_cursor).map(|entry| {
            if entry.is_directory {
                format!("{}/", entry.name)
            } else {
                format!("{} {}", entry.name, fmt_bytes(entry.size_bytes))
            }
        }),
        PaneFocus::Volumes => app.explorer.volumes().get(app.volumes_cursor).map(|entry| {
            format!(
                "{}  {} free of {}",
                entry.name,
                fmt_bytes(entry.free_bytes),
                fmt_bytes(entry.total_bytes)
            )
        }),
        PaneFocus::Favourites => app
            .explorer
            .favourites()
            .get(app.favourites_cursor)
            .map(|favourite| favourite.path.display().to_string()),
    };
    if let Some(detail) = detail {
        summary.push_str(&format!(" | {detail}"));
    }

    let notice_line = match app.explorer.notice() {
        Some(notice) if notice.is_error() => Line::styled(
            notice.text().to_string(),
            Style::default().fg(Color::Red),
        ),
        Some(notice) => Line::styled(
            notice.text().to_string(),
            Style::default().fg(Color::Green),
        ),
        None => Line::from("ready"),
    };

    let status_paragraph = Paragraph::new(vec![notice_line, Line::from(summary)])
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status_paragraph, area);
}

pub(super) fn ui_frame(frame: &mut Frame, app: &mut TuiApp) {
    let help_lines = 2;
    let prompt_height = if matches!(app.mode, AppMode::Prompt(_)) { 3 } else { 0 };

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(help_lines + 2),
            Constraint::Length(prompt_height),
            Constraint::Min(0),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_help_block(frame, app, main_chunks[0]);
    if let AppMode::Prompt(kind) = app.mode {
        draw_prompt_block(frame, app, main_chunks[1], kind);
    }

    let places_percent = app.explorer.places_percent().clamp(15, 70);
    let middle_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(places_percent),
            Constraint::Percentage(100 - places_percent),
        ])
        .split(main_chunks[2]);

    let volumes_height =
        (app.explorer.volumes().len() as u16 + 2).clamp(3, (middle_chunks[0].height / 2).max(3));
    let places_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(volumes_height), Constraint::Min(0)])
        .split(middle_chunks[0]);

    // Remember where the panes landed so mouse events can be routed.
    app.volumes_area = places_chunks[0];
    app.favourites_area = places_chunks[1];
    app.files_area = middle_chunks[1];

    draw_volumes_block(frame, app, places_chunks[0]);
    draw_favourites_block(frame, app, places_chunks[1]);
    draw_files_block(frame, app, middle_chunks[1]);
    draw_status_block(frame, app, main_chunks[3]);
}
