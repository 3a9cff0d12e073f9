use crate::model::buffer::{BufferError, Position, TextBuffer};
use crate::model::event::{Action, ActionKind, EditLog};
use crate::view::viewport::Viewport;

/// The editing core: buffer, viewport and history, changed together.
///
/// Every edit method computes the absolute cursor from the viewport, mutates
/// the buffer, repositions the cursor and records one [`Action`]. They return
/// `Ok(true)` when something changed and `Ok(false)` for no-ops.
///
/// A [`BufferError`] from any of them means the cursor bookkeeping has drifted
/// from the buffer and the session cannot safely continue.
#[derive(Debug)]
pub struct EditorState {
    pub buffer: TextBuffer,
    pub viewport: Viewport,
    pub log: EditLog,
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Normalize clipboard text: `\n` line endings only, tabs expanded
pub fn normalize_pasted_text(text: &str, tab_size: usize) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "")
        .replace('\t', &" ".repeat(tab_size))
}

impl EditorState {
    pub fn new(buffer: TextBuffer, viewport: Viewport) -> Self {
        Self {
            buffer,
            viewport,
            log: EditLog::new(),
        }
    }

    /// Absolute cursor position
    pub fn cursor(&self) -> Position {
        self.viewport.to_absolute()
    }

    /// Replace the whole document, resetting cursor, scroll and history
    pub fn replace_buffer(&mut self, buffer: TextBuffer) {
        self.buffer = buffer;
        self.viewport = Viewport::new(self.viewport.width, self.viewport.height);
        self.log.clear();
    }

    fn char_at(&self, pos: Position) -> Result<char, BufferError> {
        self.buffer
            .char_at(pos)
            .ok_or_else(|| BufferError::ColumnOutOfRange {
                row: pos.row,
                start: pos.col,
                end: pos.col + 1,
                len: self.buffer.line_len(pos.row),
            })
    }

    fn chars_between(&self, row: usize, start: usize, end: usize) -> String {
        self.buffer
            .line(row)
            .map(|line| line.chars().skip(start).take(end - start).collect())
            .unwrap_or_default()
    }

    fn perform(
        &mut self,
        kind: ActionKind,
        before: Position,
        after: Position,
    ) -> Result<bool, BufferError> {
        tracing::debug!("edit {:?} cursor {:?} -> {:?}", kind, before, after);
        kind.apply(&mut self.buffer)?;
        self.viewport.reveal(after);
        self.log.record(Action::new(kind, before, after));
        Ok(true)
    }

    pub fn insert_char(&mut self, ch: char) -> Result<bool, BufferError> {
        if ch == '\n' {
            return self.insert_newline();
        }
        let at = self.cursor();
        self.perform(
            ActionKind::InsertChar { at, ch },
            at,
            Position::new(at.row, at.col + 1),
        )
    }

    pub fn insert_space(&mut self) -> Result<bool, BufferError> {
        self.insert_char(' ')
    }

    /// Insert `tab_size` spaces
    pub fn insert_tab(&mut self, tab_size: usize) -> Result<bool, BufferError> {
        self.insert_text(&" ".repeat(tab_size))
    }

    /// Insert text (possibly spanning lines) at the cursor as one action
    pub fn insert_text(&mut self, text: &str) -> Result<bool, BufferError> {
        if text.is_empty() {
            return Ok(false);
        }
        let at = self.cursor();
        let after = TextBuffer::text_end(at, text);
        self.perform(
            ActionKind::InsertRange {
                at,
                text: text.to_string(),
            },
            at,
            after,
        )
    }

    /// Paste clipboard text at the cursor
    pub fn paste(&mut self, text: &str, tab_size: usize) -> Result<bool, BufferError> {
        self.insert_text(&normalize_pasted_text(text, tab_size))
    }

    /// Break the line at the cursor; the cursor moves to the start of the new line
    pub fn insert_newline(&mut self) -> Result<bool, BufferError> {
        let at = self.cursor();
        self.perform(ActionKind::Split { at }, at, Position::new(at.row + 1, 0))
    }

    /// Delete the char left of the cursor, or join with the previous line at column 0
    pub fn backspace(&mut self) -> Result<bool, BufferError> {
        let at = self.cursor();
        if at.col > 0 {
            let target = Position::new(at.row, at.col - 1);
            let ch = self.char_at(target)?;
            self.perform(ActionKind::DeleteChar { at: target, ch }, at, target)
        } else if at.row > 0 {
            let join = Position::new(at.row - 1, self.buffer.line_len(at.row - 1));
            self.perform(ActionKind::Merge { at: join }, at, join)
        } else {
            Ok(false)
        }
    }

    /// Delete the char under the cursor, or join the next line at the line end
    pub fn delete_forward(&mut self) -> Result<bool, BufferError> {
        let at = self.cursor();
        if at.col < self.buffer.line_len(at.row) {
            let ch = self.char_at(at)?;
            self.perform(ActionKind::DeleteChar { at, ch }, at, at)
        } else if at.row + 1 < self.buffer.line_count() {
            self.perform(ActionKind::Merge { at }, at, at)
        } else {
            Ok(false)
        }
    }

    /// Delete back to the start of the previous word on this line
    pub fn delete_word_backward(&mut self) -> Result<bool, BufferError> {
        let at = self.cursor();
        if at.col == 0 {
            return self.backspace();
        }

        let before: Vec<char> = self
            .buffer
            .line(at.row)
            .map(|line| line.chars().take(at.col).collect())
            .unwrap_or_default();

        let mut start = before.len();
        while start > 0 && before[start - 1].is_whitespace() {
            start -= 1;
        }
        if start > 0 && is_word_char(before[start - 1]) {
            while start > 0 && is_word_char(before[start - 1]) {
                start -= 1;
            }
        } else if start > 0 && start == before.len() {
            // Punctuation directly left of the cursor goes one char at a time
            start -= 1;
        }

        let start = Position::new(at.row, start);
        let text = self.chars_between(at.row, start.col, at.col);
        self.perform(ActionKind::DeleteRange { start, text }, at, start)
    }

    /// Delete from the cursor to the end of the line (joins the next line at the end)
    pub fn delete_to_line_end(&mut self) -> Result<bool, BufferError> {
        let at = self.cursor();
        let len = self.buffer.line_len(at.row);
        if at.col >= len {
            return self.delete_forward();
        }
        let text = self.chars_between(at.row, at.col, len);
        self.perform(ActionKind::DeleteRange { start: at, text }, at, at)
    }

    /// Reverse the most recent edit. An empty history is a no-op.
    pub fn undo(&mut self) -> Result<bool, BufferError> {
        let Some(action) = self.log.undo() else {
            return Ok(false);
        };
        tracing::debug!("undo {:?}", action.kind);
        action.kind.revert(&mut self.buffer)?;
        self.viewport.reveal(action.cursor_before);
        Ok(true)
    }

    /// Replay the most recently undone edit. An empty redo history is a no-op.
    pub fn redo(&mut self) -> Result<bool, BufferError> {
        let Some(action) = self.log.redo() else {
            return Ok(false);
        };
        tracing::debug!("redo {:?}", action.kind);
        action.kind.apply(&mut self.buffer)?;
        self.viewport.reveal(action.cursor_after);
        Ok(true)
    }

    pub fn move_left(&mut self) -> bool {
        self.viewport.move_cursor(0, -1, &self.buffer)
    }

    pub fn move_right(&mut self) -> bool {
        self.viewport.move_cursor(0, 1, &self.buffer)
    }

    pub fn move_up(&mut self) -> bool {
        self.viewport.move_cursor(-1, 0, &self.buffer)
    }

    pub fn move_down(&mut self) -> bool {
        self.viewport.move_cursor(1, 0, &self.buffer)
    }

    pub fn move_line_start(&mut self) {
        self.viewport.move_to_line_start();
    }

    pub fn move_line_end(&mut self) {
        self.viewport.move_to_line_end(&self.buffer);
    }

    pub fn move_page_up(&mut self) -> bool {
        self.viewport.move_pages(-1, &self.buffer)
    }

    pub fn move_page_down(&mut self) -> bool {
        self.viewport.move_pages(1, &self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(lines: &[&str]) -> EditorState {
        EditorState::new(TextBuffer::from_lines(lines.iter().copied()), Viewport::new(40, 10))
    }

    fn state_at(lines: &[&str], row: usize, col: usize) -> EditorState {
        let mut state = state(lines);
        state.viewport.reveal(Position::new(row, col));
        state
    }

    fn type_str(state: &mut EditorState, text: &str) {
        for ch in text.chars() {
            state.insert_char(ch).unwrap();
        }
    }

    #[test]
    fn test_basic_typing_and_undo() {
        let mut state = state(&[""]);
        type_str(&mut state, "hi");
        assert_eq!(state.buffer.lines(), &["hi"]);
        assert_eq!(state.cursor(), Position::new(0, 2));

        assert!(state.undo().unwrap());
        assert!(state.undo().unwrap());
        assert_eq!(state.buffer.lines(), &[""]);
        assert_eq!(state.cursor(), Position::new(0, 0));
    }

    #[test]
    fn test_multi_line_paste_and_undo() {
        let mut state = state_at(&["ab"], 0, 1);
        state.paste("X\nY", 4).unwrap();
        assert_eq!(state.buffer.lines(), &["aX", "Yb"]);
        assert_eq!(state.cursor(), Position::new(1, 1));

        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["ab"]);
        assert_eq!(state.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_single_line_paste_is_one_action() {
        let mut state = state_at(&["ab"], 0, 1);
        state.paste("XYZ", 4).unwrap();
        assert_eq!(state.buffer.lines(), &["aXYZb"]);
        assert_eq!(state.cursor(), Position::new(0, 4));
        assert_eq!(state.log.undo_len(), 1);
        assert_eq!(state.log.last().unwrap().kind.text(), "XYZ");
        assert!(!state.log.last().unwrap().kind.is_deletion());
    }

    #[test]
    fn test_paste_normalizes_text() {
        let mut state = state(&[""]);
        state.paste("a\r\n\tb", 2).unwrap();
        assert_eq!(state.buffer.lines(), &["a", "  b"]);
        assert!(!state.paste("", 4).unwrap());
        assert_eq!(state.log.undo_len(), 1);
    }

    #[test]
    fn test_enter_then_undo() {
        let mut state = state_at(&["hello"], 0, 5);
        state.insert_newline().unwrap();
        assert_eq!(state.buffer.lines(), &["hello", ""]);
        assert_eq!(state.cursor(), Position::new(1, 0));
        assert_eq!(state.log.last().unwrap().kind.text(), "\n");

        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["hello"]);
        assert_eq!(state.cursor(), Position::new(0, 5));
    }

    #[test]
    fn test_enter_splits_mid_line() {
        let mut state = state_at(&["hello world"], 0, 5);
        state.insert_newline().unwrap();
        assert_eq!(state.buffer.lines(), &["hello", " world"]);
        assert_eq!(state.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_backspace_across_line_boundary() {
        let mut state = state_at(&["foo", "bar"], 1, 0);
        state.backspace().unwrap();
        assert_eq!(state.buffer.lines(), &["foobar"]);
        assert_eq!(state.cursor(), Position::new(0, 3));
        assert!(state.log.last().unwrap().kind.is_deletion());

        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["foo", "bar"]);
        assert_eq!(state.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_enter_then_backspace_restores_line() {
        let mut state = state_at(&["hello world"], 0, 5);
        state.insert_newline().unwrap();
        state.backspace().unwrap();
        assert_eq!(state.buffer.lines(), &["hello world"]);
        assert_eq!(state.cursor(), Position::new(0, 5));
    }

    #[test]
    fn test_backspace_mid_line_records_removed_char() {
        let mut state = state_at(&["abc"], 0, 2);
        state.backspace().unwrap();
        assert_eq!(state.buffer.lines(), &["ac"]);
        assert_eq!(state.cursor(), Position::new(0, 1));
        let last = state.log.last().unwrap();
        assert_eq!(last.kind.text(), "b");
        assert_eq!(last.cursor_before, Position::new(0, 2));

        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["abc"]);
        assert_eq!(state.cursor(), Position::new(0, 2));
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let mut state = state(&["abc"]);
        assert!(!state.backspace().unwrap());
        assert!(!state.log.can_undo());
    }

    #[test]
    fn test_delete_forward() {
        let mut state = state_at(&["abc", "def"], 0, 1);
        state.delete_forward().unwrap();
        assert_eq!(state.buffer.lines(), &["ac", "def"]);
        assert_eq!(state.cursor(), Position::new(0, 1));

        // At line end the next line is joined
        state.move_line_end();
        state.delete_forward().unwrap();
        assert_eq!(state.buffer.lines(), &["acdef"]);
        assert_eq!(state.cursor(), Position::new(0, 2));

        // At document end nothing happens
        state.move_line_end();
        assert!(!state.delete_forward().unwrap());

        state.undo().unwrap();
        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["abc", "def"]);
        assert_eq!(state.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_space_and_tab() {
        let mut state = state(&["x"]);
        state.insert_space().unwrap();
        state.insert_tab(4).unwrap();
        assert_eq!(state.buffer.lines(), &["     x"]);
        assert_eq!(state.cursor(), Position::new(0, 5));
        assert_eq!(state.log.last().unwrap().kind.text(), "    ");

        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &[" x"]);
        assert_eq!(state.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_delete_word_backward() {
        let mut state = state_at(&["let value = 42;"], 0, 9);
        state.delete_word_backward().unwrap();
        assert_eq!(state.buffer.lines(), &["let  = 42;"]);
        assert_eq!(state.cursor(), Position::new(0, 4));

        state.delete_word_backward().unwrap();
        assert_eq!(state.buffer.lines(), &[" = 42;"]);
        assert_eq!(state.cursor(), Position::new(0, 0));

        state.undo().unwrap();
        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["let value = 42;"]);
        assert_eq!(state.cursor(), Position::new(0, 9));
    }

    #[test]
    fn test_delete_word_backward_punctuation_and_line_start() {
        let mut state = state_at(&["a", "b;"], 1, 2);
        state.delete_word_backward().unwrap();
        assert_eq!(state.buffer.lines(), &["a", "b"]);

        state.move_line_start();
        state.delete_word_backward().unwrap();
        assert_eq!(state.buffer.lines(), &["ab"]);
    }

    #[test]
    fn test_delete_to_line_end() {
        let mut state = state_at(&["hello world", "next"], 0, 5);
        state.delete_to_line_end().unwrap();
        assert_eq!(state.buffer.lines(), &["hello", "next"]);
        assert_eq!(state.cursor(), Position::new(0, 5));

        state.delete_to_line_end().unwrap();
        assert_eq!(state.buffer.lines(), &["hellonext"]);

        state.undo().unwrap();
        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["hello world", "next"]);
    }

    #[test]
    fn test_redo_replays_and_is_invalidated_by_new_edit() {
        let mut state = state(&[""]);
        type_str(&mut state, "ab");
        state.undo().unwrap();
        assert_eq!(state.buffer.lines(), &["a"]);

        assert!(state.redo().unwrap());
        assert_eq!(state.buffer.lines(), &["ab"]);
        assert_eq!(state.cursor(), Position::new(0, 2));

        state.undo().unwrap();
        state.insert_char('c').unwrap();
        assert!(!state.log.can_redo());
        assert!(!state.redo().unwrap());
        assert_eq!(state.buffer.lines(), &["ac"]);
    }

    #[test]
    fn test_undo_redo_on_empty_logs_change_nothing() {
        let mut state = state_at(&["abc"], 0, 2);
        let before = (state.buffer.clone(), state.viewport.clone());
        assert!(!state.undo().unwrap());
        assert!(!state.redo().unwrap());
        assert_eq!((state.buffer.clone(), state.viewport.clone()), before);
    }

    #[test]
    fn test_undo_scrolls_restored_cursor_into_view() {
        let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let mut state =
            EditorState::new(TextBuffer::from_lines(lines.iter()), Viewport::new(20, 4));
        state.viewport.reveal(Position::new(50, 0));
        state.insert_char('x').unwrap();

        // Scroll far away, then undo
        for _ in 0..10 {
            state.move_page_up();
        }
        assert!(!state.viewport.is_visible(Position::new(50, 0)));

        state.undo().unwrap();
        assert_eq!(state.cursor(), Position::new(50, 0));
        assert!(state.viewport.is_visible(Position::new(50, 0)));
        assert_eq!(state.viewport.scroll_row, 46);
    }

    #[test]
    fn test_typing_past_width_scrolls_horizontally() {
        let mut state = EditorState::new(TextBuffer::new(), Viewport::new(3, 2));
        type_str(&mut state, "abcdef");
        assert_eq!(state.cursor(), Position::new(0, 6));
        assert_eq!((state.viewport.cursor_col, state.viewport.scroll_col), (3, 3));

        for _ in 0..6 {
            state.undo().unwrap();
        }
        assert_eq!((state.viewport.cursor_col, state.viewport.scroll_col), (0, 0));
    }

    #[test]
    fn test_enter_resets_horizontal_scroll() {
        let mut state = EditorState::new(TextBuffer::new(), Viewport::new(3, 2));
        type_str(&mut state, "abcdef");
        state.insert_newline().unwrap();
        assert_eq!(state.viewport.scroll_col, 0);
        assert_eq!(state.cursor(), Position::new(1, 0));

        state.undo().unwrap();
        assert_eq!(state.cursor(), Position::new(0, 6));
        assert_eq!((state.viewport.cursor_col, state.viewport.scroll_col), (3, 3));
    }

    #[test]
    fn test_replace_buffer_resets_session() {
        let mut state = state_at(&["abc"], 0, 3);
        state.insert_char('d').unwrap();
        state.replace_buffer(TextBuffer::from_lines(["x", "y"]));
        assert_eq!(state.cursor(), Position::new(0, 0));
        assert!(!state.log.can_undo());
        assert!(!state.log.is_modified());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum EditOp {
            Char(char),
            Enter,
            Backspace,
            Delete,
            Paste(String),
            WordBackward,
            KillLine,
            Left,
            Right,
            Up,
            Down,
        }

        fn edit_op() -> impl Strategy<Value = EditOp> {
            prop_oneof![
                4 => "[a-z ]".prop_map(|s| EditOp::Char(s.chars().next().unwrap_or('a'))),
                2 => Just(EditOp::Enter),
                2 => Just(EditOp::Backspace),
                1 => Just(EditOp::Delete),
                1 => "[a-z\n]{1,8}".prop_map(EditOp::Paste),
                1 => Just(EditOp::WordBackward),
                1 => Just(EditOp::KillLine),
                1 => Just(EditOp::Left),
                1 => Just(EditOp::Right),
                1 => Just(EditOp::Up),
                1 => Just(EditOp::Down),
            ]
        }

        fn apply(state: &mut EditorState, op: &EditOp) {
            match op {
                EditOp::Char(ch) => {
                    state.insert_char(*ch).unwrap();
                }
                EditOp::Enter => {
                    state.insert_newline().unwrap();
                }
                EditOp::Backspace => {
                    state.backspace().unwrap();
                }
                EditOp::Delete => {
                    state.delete_forward().unwrap();
                }
                EditOp::Paste(text) => {
                    state.paste(text, 4).unwrap();
                }
                EditOp::WordBackward => {
                    state.delete_word_backward().unwrap();
                }
                EditOp::KillLine => {
                    state.delete_to_line_end().unwrap();
                }
                EditOp::Left => {
                    state.move_left();
                }
                EditOp::Right => {
                    state.move_right();
                }
                EditOp::Up => {
                    state.move_up();
                }
                EditOp::Down => {
                    state.move_down();
                }
            }
        }

        fn assert_invariants(state: &EditorState) {
            let vp = &state.viewport;
            let cursor = state.cursor();
            assert!(vp.cursor_row <= vp.height);
            assert!(vp.cursor_col <= vp.width);
            assert!(cursor.row < state.buffer.line_count());
            assert!(cursor.col <= state.buffer.line_len(cursor.row));
            assert!(state.buffer.lines().iter().all(|line| !line.contains('\n')));
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Undoing every recorded edit restores the initial buffer, and the
            /// cursor returns to where it was when the first edit happened
            #[test]
            fn undo_all_restores_initial_state(ops in prop::collection::vec(edit_op(), 1..40)) {
                let mut state = EditorState::new(
                    TextBuffer::from_lines(["seed text", "more"]),
                    Viewport::new(6, 3),
                );
                let initial_buffer = state.buffer.clone();

                let mut first_edit_cursor = None;
                for op in &ops {
                    let cursor = state.cursor();
                    let before = state.log.undo_len();
                    apply(&mut state, op);
                    assert_invariants(&state);
                    if first_edit_cursor.is_none() && state.log.undo_len() > before {
                        first_edit_cursor = Some(cursor);
                    }
                }

                let edits = state.log.undo_len();
                for _ in 0..edits {
                    prop_assert!(state.undo().unwrap());
                    assert_invariants(&state);
                }
                prop_assert_eq!(&state.buffer, &initial_buffer);
                prop_assert!(!state.undo().unwrap());
                if let Some(cursor) = first_edit_cursor {
                    prop_assert_eq!(state.cursor(), cursor);
                }
            }

            /// Redoing everything after undoing everything reproduces the edited buffer
            #[test]
            fn redo_all_reproduces_edits(ops in prop::collection::vec(edit_op(), 1..40)) {
                let mut state = EditorState::new(TextBuffer::new(), Viewport::new(5, 2));
                for op in &ops {
                    apply(&mut state, op);
                }
                let edited = state.buffer.clone();
                let edits = state.log.undo_len();

                while state.undo().unwrap() {}
                for _ in 0..edits {
                    prop_assert!(state.redo().unwrap());
                    assert_invariants(&state);
                }
                prop_assert_eq!(&state.buffer, &edited);
                if edits > 0 {
                    prop_assert_eq!(state.log.last().map(|a| a.cursor_after), Some(state.cursor()));
                }
            }

            /// Inserting a char and undoing leaves the buffer byte-identical
            #[test]
            fn insert_then_undo_is_identity(
                lines in prop::collection::vec("[a-zé ]{0,10}", 1..5),
                row_seed in any::<usize>(),
                col_seed in any::<usize>(),
                ch in any::<char>().prop_filter("no newline", |c| *c != '\n'),
            ) {
                let buffer = TextBuffer::from_lines(lines.iter());
                let row = row_seed % buffer.line_count();
                let col = col_seed % (buffer.line_len(row) + 1);
                let mut state = EditorState::new(buffer.clone(), Viewport::new(4, 2));
                state.viewport.reveal(Position::new(row, col));

                state.insert_char(ch).unwrap();
                state.undo().unwrap();
                prop_assert_eq!(state.buffer.to_text(), buffer.to_text());
                prop_assert_eq!(state.cursor(), Position::new(row, col));
            }
        }
    }
}
