pub mod events;
pub mod runtime;
pub mod ui;

use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use ratatui::{
    DefaultTerminal,
    crossterm::{
        event::{self, DisableBracketedPaste, EnableBracketedPaste, Event as TermEvent, KeyEventKind},
        execute,
    },
};

use crate::app::{App, AppSettings};
use crate::gateway::ServerGateway;
use events::KeyAction;
use runtime::Runtime;

const TICK: Duration = Duration::from_millis(100);

/// Run the interactive client until the user quits.
pub fn run_tui(
    gateway: Arc<dyn ServerGateway>,
    settings: AppSettings,
    stored_api_key: Option<String>,
) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("installing panic hooks: {e}"))?;

    let mut app = App::new(settings);
    if let Some(key) = stored_api_key {
        app.state.auth.api_key_input.set(&key);
    }
    let runtime = Runtime::new(gateway);

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableBracketedPaste)?;
    let result = run(&mut terminal, &mut app, &runtime);
    let _ = execute!(stdout(), DisableBracketedPaste);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, app: &mut App, runtime: &Runtime) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, &app.state))?;

        if event::poll(TICK)? {
            let action = match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key(key, &mut app.state)
                }
                TermEvent::Paste(text) => events::handle_paste(&text, &mut app.state),
                _ => KeyAction::None,
            };
            match action {
                KeyAction::Quit => break,
                KeyAction::Emit(ev) => runtime.run(app.handle(ev)),
                KeyAction::None => {}
            }
        }

        while let Some(ev) = runtime.poll() {
            runtime.run(app.handle(ev));
        }
    }
    Ok(())
}
