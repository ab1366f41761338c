//! Terminal shell for running a wizard interactively

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::wizard::WizardContext;

pub mod input;
pub mod shell;
pub mod terminal_guard;

pub use shell::{ShellAction, WizardShell};
pub use terminal_guard::{install_panic_hook, TerminalGuard};

/// How an interactive session ended
#[derive(Debug)]
pub enum ShellOutcome {
    /// The terminal step was confirmed; carries the final context
    Completed(WizardContext),
    /// The user cancelled; the session is discarded
    Cancelled,
}

/// Run the shell until the wizard completes or is cancelled
pub fn run_shell(mut shell: WizardShell, tick_rate: Duration) -> Result<ShellOutcome> {
    install_panic_hook();
    let guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let outcome = loop {
        terminal.draw(|f| shell.render(f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match shell.handle_key(key) {
                    ShellAction::Completed => break ShellOutcome::Completed(shell.into_context()),
                    ShellAction::Cancelled => {
                        tracing::info!(
                            session_id = %shell.engine().context().session_id(),
                            step = shell.engine().current_step_id(),
                            "wizard cancelled"
                        );
                        break ShellOutcome::Cancelled;
                    }
                    _ => {}
                }
            }
        }
    };

    guard.restore();
    terminal.show_cursor()?;
    Ok(outcome)
}
