mod keys;
pub mod paint;

pub use keys::handle_key;
pub use paint::{compose, Paint};

use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Stdout, Write};

use crate::editor::{Editor, Mode};

/// Input the main loop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Terminal handler responsible for rendering and input
pub struct Terminal {
    stdout: Stdout,
}

impl Terminal {
    pub fn new() -> anyhow::Result<Self> {
        let mut stdout = io::stdout();

        // Enter raw mode and alternate screen
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

        Ok(Self { stdout })
    }

    /// Get terminal size
    pub fn size() -> anyhow::Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    /// Render the editor state to the terminal
    pub fn render(&mut self, editor: &Editor) -> anyhow::Result<()> {
        for paint in compose(editor) {
            match paint {
                Paint::HideCursor => queue!(self.stdout, cursor::Hide)?,
                Paint::ShowCursor => queue!(self.stdout, cursor::Show)?,
                Paint::MoveTo { row, col } => queue!(self.stdout, cursor::MoveTo(col, row))?,
                Paint::Styled { fg, bg, text } => queue!(
                    self.stdout,
                    SetForegroundColor(fg),
                    SetBackgroundColor(bg),
                    Print(text)
                )?,
                Paint::ClearLine => queue!(
                    self.stdout,
                    SetBackgroundColor(editor.theme.background),
                    terminal::Clear(ClearType::UntilNewLine)
                )?,
            }
        }
        queue!(self.stdout, ResetColor)?;

        // Cursor shape based on mode
        match editor.mode {
            Mode::Insert => queue!(self.stdout, cursor::SetCursorStyle::BlinkingBar)?,
            Mode::Normal | Mode::Visual => queue!(self.stdout, cursor::SetCursorStyle::BlinkingBlock)?,
            Mode::Command | Mode::Search => queue!(self.stdout, cursor::SetCursorStyle::SteadyBar)?,
        }

        self.stdout.flush()?;
        Ok(())
    }

    /// Read the next key press or resize (blocking)
    pub fn read_event(&self) -> anyhow::Result<InputEvent> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(InputEvent::Key(key));
                }
                Event::Resize(width, height) => return Ok(InputEvent::Resize(width, height)),
                _ => {}
            }
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = execute!(
            self.stdout,
            ResetColor,
            cursor::SetCursorStyle::DefaultUserShape,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
