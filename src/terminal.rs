use std::io::{self, IsTerminal, Write};

use crossterm::{cursor, queue};

/// Output sink for the reporter. Cursor control is only emitted when the
/// sink is an interactive terminal; otherwise output is append-only.
#[derive(Debug)]
pub struct Terminal<W: Write> {
    out: W,
    is_tty: bool,
}

impl Terminal<io::Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let is_tty = out.is_terminal();
        Self::new(out, is_tty)
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, is_tty: bool) -> Self {
        Self { out, is_tty }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        if self.is_tty {
            queue!(self.out, cursor::Hide)?;
        }
        Ok(())
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        if self.is_tty {
            queue!(self.out, cursor::Show)?;
        }
        Ok(())
    }

    /// Move back to the start of the block just written so the next frame
    /// overwrites it.
    pub fn move_up(&mut self, lines: u16) -> io::Result<()> {
        if self.is_tty && lines > 0 {
            queue!(self.out, cursor::MoveUp(lines))?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
