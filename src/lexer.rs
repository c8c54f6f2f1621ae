//! Character-level cursor over a single instruction line.
//!
//! The cursor only moves forward. Both the command reader and the instruction
//! parser drive it directly, deciding themselves what a separator means at
//! each point of the grammar.

/// Whitespace as the instruction grammar understands it.
///
/// Matches C's `isspace` in the ASCII range, which includes vertical tab.
pub(crate) fn is_space(ch: char) -> bool {
    ch.is_ascii_whitespace() || ch == '\x0b'
}

/// Characters that end a token: whitespace and the argument separator.
pub(crate) fn is_separator(ch: char) -> bool {
    is_space(ch) || ch == ','
}

#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    input: Vec<char>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(line: &str) -> Self {
        Cursor {
            input: line.chars().collect(),
            pos: 0,
        }
    }

    pub(crate) fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    pub(crate) fn read_char(&mut self) -> Option<char> {
        let ch = self.peek_char();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    /// Consume characters up to (not including) the next separator or end of line.
    pub(crate) fn read_token(&mut self) -> String {
        let mut token = String::new();
        while let Some(ch) = self.peek_char().filter(|c| !is_separator(*c)) {
            token.push(ch);
            self.pos += 1;
        }
        token
    }

    /// Everything not consumed yet.
    pub(crate) fn rest(&self) -> String {
        self.input[self.pos.min(self.input.len())..].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_token_stops_at_separators() {
        let mut cursor = Cursor::new("  add_mat MAT_A,MAT_B");
        cursor.skip_whitespace();
        assert_eq!(cursor.read_token(), "add_mat");
        assert_eq!(cursor.peek_char(), Some(' '));
        cursor.skip_whitespace();
        assert_eq!(cursor.read_token(), "MAT_A");
        assert_eq!(cursor.read_char(), Some(','));
        assert_eq!(cursor.read_token(), "MAT_B");
        assert!(cursor.at_end());
        assert_eq!(cursor.read_char(), None);
        assert_eq!(cursor.read_token(), "");
    }

    #[test]
    fn test_skip_whitespace_kinds() {
        let mut cursor = Cursor::new(" \t\x0b\r\nx y");
        cursor.skip_whitespace();
        assert_eq!(cursor.peek_char(), Some('x'));
        assert_eq!(cursor.rest(), "x y");
    }

    #[test]
    fn test_empty_line() {
        let mut cursor = Cursor::new("");
        assert!(cursor.at_end());
        cursor.skip_whitespace();
        assert_eq!(cursor.peek_char(), None);
        assert_eq!(cursor.rest(), "");
    }
}
