use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;

/// Where the interpreter gets its instruction lines from.
///
/// `Ok(None)` means the input is exhausted.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// Interactive line editor with history, used when stdin is a terminal.
pub struct EditorLines {
    editor: DefaultEditor,
    prompt: String,
}

impl EditorLines {
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialise the line editor")?;
        Ok(Self {
            editor,
            prompt: prompt.into(),
        })
    }
}

impl LineSource for EditorLines {
    fn next_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C and Ctrl-D both end the session without a `stop`.
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("failed to read a line"),
        }
    }
}

/// Lines from any buffered reader: piped stdin, files, or byte slices in tests.
pub struct ReaderLines<R> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut buf)
            .context("failed to read a line")?;
        if read == 0 {
            return Ok(None);
        }
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        // Invalid UTF-8 becomes U+FFFD and is rejected by the parser like any other typo.
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_lines_strip_line_endings() {
        let mut lines = ReaderLines::new("first\r\nsecond\n\nlast".as_bytes());
        assert_eq!(lines.next_line().unwrap(), Some("first".to_string()));
        assert_eq!(lines.next_line().unwrap(), Some("second".to_string()));
        assert_eq!(lines.next_line().unwrap(), Some(String::new()));
        assert_eq!(lines.next_line().unwrap(), Some("last".to_string()));
        assert_eq!(lines.next_line().unwrap(), None);
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn test_reader_lines_replace_invalid_utf8() {
        let mut lines = ReaderLines::new(&b"print_mat MAT_\xe9\nstop\n"[..]);
        assert_eq!(
            lines.next_line().unwrap(),
            Some("print_mat MAT_\u{FFFD}".to_string())
        );
        assert_eq!(lines.next_line().unwrap(), Some("stop".to_string()));
    }
}
