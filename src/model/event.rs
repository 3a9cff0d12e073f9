use crate::model::buffer::{BufferError, Position, TextBuffer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// The buffer change carried by an [`Action`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// A single char typed at `at`
    InsertChar { at: Position, ch: char },

    /// Text (possibly spanning lines) inserted at `at`
    InsertRange { at: Position, text: String },

    /// Line broken at `at`; the tail moved to a new line below
    Split { at: Position },

    /// The char that was at `at` was removed
    DeleteChar { at: Position, ch: char },

    /// `text` was removed starting at `start`
    DeleteRange { start: Position, text: String },

    /// Line `at.row + 1` was joined onto `at.row`; `at.col` is the join column
    Merge { at: Position },
}

impl ActionKind {
    /// The change that undoes this one
    pub fn inverse(&self) -> Self {
        match self {
            Self::InsertChar { at, ch } => Self::DeleteChar { at: *at, ch: *ch },
            Self::DeleteChar { at, ch } => Self::InsertChar { at: *at, ch: *ch },
            Self::InsertRange { at, text } => Self::DeleteRange {
                start: *at,
                text: text.clone(),
            },
            Self::DeleteRange { start, text } => Self::InsertRange {
                at: *start,
                text: text.clone(),
            },
            Self::Split { at } => Self::Merge { at: *at },
            Self::Merge { at } => Self::Split { at: *at },
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            Self::DeleteChar { .. } | Self::DeleteRange { .. } | Self::Merge { .. }
        )
    }

    /// The text this change inserts or removes (`"\n"` for splits and merges)
    pub fn text(&self) -> String {
        match self {
            Self::InsertChar { ch, .. } | Self::DeleteChar { ch, .. } => ch.to_string(),
            Self::InsertRange { text, .. } | Self::DeleteRange { text, .. } => text.clone(),
            Self::Split { .. } | Self::Merge { .. } => "\n".to_string(),
        }
    }

    /// Perform the change on `buffer`
    pub fn apply(&self, buffer: &mut TextBuffer) -> Result<(), BufferError> {
        match self {
            Self::InsertChar { at, ch } => {
                let mut encoded = [0u8; 4];
                buffer.splice(at.row, at.col, at.col, ch.encode_utf8(&mut encoded))?;
            }
            Self::InsertRange { at, text } => {
                buffer.insert_text(*at, text)?;
            }
            Self::Split { at } => buffer.split_line(at.row, at.col)?,
            Self::DeleteChar { at, .. } => {
                buffer.splice(at.row, at.col, at.col + 1, "")?;
            }
            Self::DeleteRange { start, text } => {
                buffer.delete_range(*start, TextBuffer::text_end(*start, text))?;
            }
            Self::Merge { at } => {
                buffer.merge_lines(at.row)?;
            }
        }
        Ok(())
    }

    /// Undo the change on `buffer`
    pub fn revert(&self, buffer: &mut TextBuffer) -> Result<(), BufferError> {
        self.inverse().apply(buffer)
    }
}

/// One reversible unit of edit history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,

    /// Absolute cursor before the edit (restored on undo)
    pub cursor_before: Position,

    /// Absolute cursor after the edit (restored on redo)
    pub cursor_after: Position,
}

impl Action {
    pub fn new(kind: ActionKind, cursor_before: Position, cursor_after: Position) -> Self {
        Self {
            kind,
            cursor_before,
            cursor_after,
        }
    }
}

/// What happened to an action, as written to the event stream
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum LogOp {
    Record,
    Undo,
    Redo,
}

/// Linear undo/redo history
///
/// Both stacks keep the most recent action last. Recording a new action
/// discards the redo stack.
#[derive(Debug)]
pub struct EditLog {
    undo: Vec<Action>,
    redo: Vec<Action>,

    /// Depth of the undo stack when the document was last saved.
    /// `None` once that state can no longer be reached.
    saved_depth: Option<usize>,

    /// Optional JSON-lines stream of every record/undo/redo
    stream_file: Option<File>,
    stream_index: usize,
}

impl Default for EditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EditLog {
    pub fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            saved_depth: Some(0),
            stream_file: None,
            stream_index: 0,
        }
    }

    /// Stream every logged operation to `path` as JSON lines
    pub fn enable_streaming<P: AsRef<Path>>(&mut self, path: P) -> std::io::Result<()> {
        let file = File::create(path.as_ref())?;
        self.stream_file = Some(file);
        self.stream_index = 0;
        Ok(())
    }

    pub fn disable_streaming(&mut self) {
        self.stream_file = None;
    }

    fn stream(&mut self, op: LogOp, action: &Action) {
        let Some(ref mut file) = self.stream_file else {
            return;
        };

        let entry = serde_json::json!({
            "index": self.stream_index,
            "timestamp": chrono::Local::now().to_rfc3339(),
            "op": op,
            "action": action,
        });
        self.stream_index += 1;

        if let Err(e) = writeln!(file, "{entry}") {
            tracing::trace!("Warning: Failed to write to event stream: {e}");
        }
        if let Err(e) = file.flush() {
            tracing::trace!("Warning: Failed to flush event stream: {e}");
        }
    }

    /// Append a freshly performed edit, invalidating the redo history
    pub fn record(&mut self, action: Action) {
        if self.saved_depth.is_some_and(|depth| depth > self.undo.len()) {
            // The saved state lived in the redo branch we are about to drop
            self.saved_depth = None;
        }
        self.redo.clear();
        self.stream(LogOp::Record, &action);
        self.undo.push(action);
    }

    /// Move the most recent action to the redo stack and return it for reversal
    pub fn undo(&mut self) -> Option<&Action> {
        let action = self.undo.pop()?;
        self.stream(LogOp::Undo, &action);
        self.redo.push(action);
        self.redo.last()
    }

    /// Move the most recently undone action back to the undo stack and return it for replay
    pub fn redo(&mut self) -> Option<&Action> {
        let action = self.redo.pop()?;
        self.stream(LogOp::Redo, &action);
        self.undo.push(action);
        self.undo.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// The action the next undo would reverse
    pub fn last(&self) -> Option<&Action> {
        self.undo.last()
    }

    /// Remember the current history depth as the on-disk state
    pub fn mark_saved(&mut self) {
        self.saved_depth = Some(self.undo.len());
    }

    /// Whether the document differs from the last saved (or loaded) state
    pub fn is_modified(&self) -> bool {
        self.saved_depth != Some(self.undo.len())
    }

    /// Drop all history; the current state becomes the saved state
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.saved_depth = Some(0);
    }
}
