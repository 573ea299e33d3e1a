use super::app_logic::TuiApp;
use super::app_state::AppMode;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

pub(super) fn handle_events(app: &mut TuiApp) -> Result<()> {
    // Worker replies first, so the frame the user is acting on is current.
    app.drain_completions();

    if event::poll(Duration::from_millis(50))? {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => match app.mode {
                AppMode::Normal => app.handle_normal_mode_input(key_event),
                AppMode::Prompt(kind) => app.handle_prompt_mode_input(kind, key_event),
            },
            Event::Mouse(mouse_event) => app.handle_mouse(mouse_event),
            _ => {}
        }
    }

    app.flush_effects();
    Ok(())
}
