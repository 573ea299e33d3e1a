mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

// The main function to run the TUI
pub use self::run_tui::run;

// This module contains the main TUI loop and terminal setup/teardown
mod run_tui {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use crate::backend::{Completion, Request};
    use crate::explorer::Explorer;
    use anyhow::Result;
    use crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};
    use std::sync::mpsc::{Receiver, Sender};

    pub fn run(
        explorer: Explorer,
        requests: Sender<Request>,
        completions: Receiver<Completion>,
    ) -> Result<()> {
        let mut app = TuiApp::new(explorer, requests, completions);
        // The startup fetches were queued before we got here; hand them to
        // the worker so the first frames have something to show.
        app.flush_effects();

        let mut terminal = init_terminal()?;
        while !app.quit {
            terminal.draw(|frame| ui_frame(frame, &mut app))?;
            handle_events(&mut app)?;
        }
        restore_terminal(terminal)?;
        Ok(())
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(Into::into)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor().map_err(Into::into)
    }
}
