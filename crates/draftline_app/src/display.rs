use std::io::{self, Write};

use draftline_core::DisplayResult;

/// Prints a growing result incrementally: new content to `out`, step changes to
/// `status`.
pub struct TerminalView<O: Write, S: Write> {
    out: O,
    status: S,
    printed: usize,
    last_step: Option<String>,
}

impl<O: Write, S: Write> TerminalView<O, S> {
    pub fn new(out: O, status: S) -> Self {
        Self {
            out,
            status,
            printed: 0,
            last_step: None,
        }
    }

    pub fn show(&mut self, result: &DisplayResult) -> io::Result<()> {
        if result.current_step != self.last_step {
            if let Some(step) = &result.current_step {
                writeln!(self.status, "[{step}]")?;
            }
            self.last_step = result.current_step.clone();
        }

        // Displayed content only grows, so everything past `printed` is new.
        if result.content.len() > self.printed && result.content.is_char_boundary(self.printed) {
            self.out.write_all(result.content[self.printed..].as_bytes())?;
            self.out.flush()?;
            self.printed = result.content.len();
        }

        if result.is_complete && self.printed > 0 && !result.content.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_parts(self) -> (O, S) {
        (self.out, self.status)
    }
}
