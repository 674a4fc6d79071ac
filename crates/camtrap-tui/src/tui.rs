//! Terminal ownership for the dashboard session.
//!
//! While the map and detail screens are up the terminal is in raw mode on
//! the alternate screen with the cursor hidden. Mouse capture is never
//! enabled (see [`crate::event`]), so restoring only has to undo those three
//! things. Restoration runs from three places, and every one is safe to
//! repeat:
//!
//! - the normal quit path in `App::run`
//! - `Drop` when an error unwinds out of the event loop
//! - the panic hook, before the report is printed
//!
//! Nothing in this module logs to stdout or stderr. Tracing goes to the file
//! configured in `main.rs`, because a single stray line written to the
//! alternate screen would corrupt the Braille map until the next full redraw.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};

pub type Backend = CrosstermBackend<Stdout>;

pub struct Tui {
    pub terminal: Terminal<Backend>,
}

impl Tui {
    /// Wrap stdout. The terminal is left untouched until [`Tui::enter`], so a
    /// catalog load failure before that point prints as a plain report.
    pub fn new() -> Result<Self> {
        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    /// Raw mode, alternate screen, hidden cursor, then a clear so the first
    /// frame does not diff against whatever the shell left behind.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Hand the terminal back to the shell.
    pub fn exit(&mut self) {
        restore();
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Best effort, in reverse order of [`Tui::enter`]. A failed step must not
/// stop the later ones, otherwise a half-restored shell stays in raw mode.
fn restore() {
    let _ = stdout().execute(cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Install color-eyre's report and panic hooks, with terminal restoration
/// spliced in front of the panic printer.
///
/// `main` calls this before loading the catalog, so panics at any stage of
/// startup print to a sane terminal. The `RUST_BACKTRACE` hint section is
/// suppressed to keep reports short.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        panic_hook(info);
    }));

    Ok(())
}
