pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use crate::store::ScoreStore;

/// Work a key press needs that can't happen inside the sync key handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Save,
}

pub async fn run_tui<S: ScoreStore>(mut app: App<S>) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let loop_result: anyhow::Result<()> = async {
        loop {
            terminal.draw(|frame| ui::draw(frame, &app))?;

            match events.next().await {
                Event::Key(key) => {
                    if let Some(Action::Save) = handle_key_event(&mut app, key) {
                        app.save_active().await;
                    }
                }
                Event::Tick => app.session.update_flash(),
            }

            if app.should_quit {
                break;
            }
        }
        Ok(())
    }
    .await;

    // Pending autosaves are written before leaving
    let close_result = app.session.close().await;

    ratatui::restore();

    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    loop_result?;
    close_result
}

pub fn handle_key_event<S: ScoreStore>(app: &mut App<S>, key: KeyEvent) -> Option<Action> {
    match app.input_mode {
        app::InputMode::Normal => {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => app.should_quit = true,
                KeyCode::Char('c') if ctrl => app.should_quit = true,
                KeyCode::Char('s') if ctrl => return Some(Action::Save),

                KeyCode::F(1) => app.show_help(),

                KeyCode::Right => app.next_tab(),
                KeyCode::Left => app.previous_tab(),
                KeyCode::Tab | KeyCode::Down => app.next_field(),
                KeyCode::BackTab | KeyCode::Up => app.previous_field(),

                KeyCode::Backspace => app.backspace(),
                KeyCode::Delete => app.clear_field(),
                KeyCode::Enter => app.next_field(),
                KeyCode::Char(c) if !ctrl => app.type_char(c),

                _ => {}
            }
        }
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
    None
}
