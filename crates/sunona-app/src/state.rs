//! Observable application state types.
//!
//! These structures serve as the "View Model" for frontends: the text being
//! edited and which surface has keyboard focus. Conversation state itself
//! lives in the session.

/// Which surface receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Identity prompt: typing edits the name.
    NamePrompt,
    /// Message composer: typing edits the draft.
    Draft,
    /// Emoji picker open over the composer.
    EmojiPicker {
        /// Highlighted entry in the quick emoji list.
        selected: usize,
    },
}

/// Single-line text buffer with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input (emoji,
/// accented names) edits cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    text: String,
    /// Cursor position in characters, `0..=char_count`.
    cursor: usize,
    /// Maximum length in characters. `None` is unbounded.
    max_chars: Option<usize>,
}

impl LineEditor {
    /// Create an unbounded editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor that refuses input beyond `max_chars` characters.
    pub fn with_limit(max_chars: usize) -> Self {
        Self { max_chars: Some(max_chars), ..Self::default() }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// True if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Insert a character at the cursor. Returns false at the length limit.
    pub fn insert(&mut self, c: char) -> bool {
        if self.max_chars.is_some_and(|max| self.char_count() >= max) {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
        true
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
        true
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
        true
    }

    /// Move the cursor one character left.
    pub fn left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move the cursor one character right.
    pub fn right(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Move the cursor to the start.
    pub fn home(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    /// Move the cursor to the end.
    pub fn end(&mut self) -> bool {
        let end = self.char_count();
        let moved = self.cursor != end;
        self.cursor = end;
        moved
    }

    /// Replace the text, truncating to the limit, with the cursor at the end.
    pub fn set(&mut self, text: &str) {
        self.text = match self.max_chars {
            Some(max) => text.chars().take(max).collect(),
            None => text.to_owned(),
        };
        self.cursor = self.char_count();
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text.char_indices().nth(chars).map_or(self.text.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_at_cursor() {
        let mut editor = LineEditor::new();
        editor.insert('a');
        editor.insert('c');
        editor.left();
        editor.insert('b');

        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.cursor(), 2);
    }

    #[test]
    fn multibyte_editing() {
        let mut editor = LineEditor::new();
        for c in "héllo🚀".chars() {
            editor.insert(c);
        }
        editor.backspace();
        editor.home();
        editor.right();
        editor.delete();

        assert_eq!(editor.text(), "hllo");
    }

    #[test]
    fn limit_refuses_extra_chars() {
        let mut editor = LineEditor::with_limit(3);
        assert!(editor.insert('a'));
        assert!(editor.insert('b'));
        assert!(editor.insert('c'));
        assert!(!editor.insert('d'));

        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn set_truncates_and_moves_cursor_to_end() {
        let mut editor = LineEditor::with_limit(4);
        editor.set("abcdef");

        assert_eq!(editor.text(), "abcd");
        assert_eq!(editor.cursor(), 4);
    }

    #[test]
    fn edges_are_noops() {
        let mut editor = LineEditor::new();
        assert!(!editor.backspace());
        assert!(!editor.delete());
        assert!(!editor.left());
        assert!(!editor.right());
        assert!(!editor.home());
        assert!(!editor.end());
    }
}
