use crate::config::Config;
use crate::input::keybindings::{Command, KeybindingResolver};
use crate::model::buffer::{BufferError, TextBuffer};
use crate::model::filesystem::FileSystem;
use crate::primitives::highlighter::Highlighter;
use crate::services::clipboard::Clipboard;
use crate::state::EditorState;
use crate::view::render::{EditorRenderer, StatusLine};
use crate::view::theme::Theme;
use crate::view::viewport::Viewport;
use anyhow::{Context, Result as AnyhowResult};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shown in the status bar for a buffer with no file
pub const UNTITLED_DISPLAY_NAME: &str = "[untitled]";

/// One editing session over a single document
pub struct Editor {
    state: EditorState,

    config: Config,

    keybindings: KeybindingResolver,

    /// None when syntax highlighting is disabled
    highlighter: Option<Highlighter>,

    theme: Theme,

    clipboard: Box<dyn Clipboard>,

    filesystem: Arc<dyn FileSystem>,

    /// File backing the buffer; None until first save for a new document
    file_path: Option<PathBuf>,

    status_message: Option<String>,

    should_quit: bool,
}

impl Editor {
    /// Create an editor with an empty buffer sized for a `width` x `height` terminal
    pub fn new(
        config: Config,
        width: u16,
        height: u16,
        clipboard: Box<dyn Clipboard>,
        filesystem: Arc<dyn FileSystem>,
    ) -> Self {
        let keybindings = KeybindingResolver::new(&config);
        let highlighter = config
            .editor
            .syntax_highlighting
            .then(|| Highlighter::for_path(None));

        Self {
            state: EditorState::new(TextBuffer::new(), Viewport::for_terminal(width, height)),
            config,
            keybindings,
            highlighter,
            theme: Theme::default(),
            clipboard,
            filesystem,
            file_path: None,
            status_message: None,
            should_quit: false,
        }
    }

    /// Load `path` into the buffer. A file that does not exist yet starts
    /// empty and is created on save.
    pub fn open(&mut self, path: &Path) -> AnyhowResult<()> {
        let buffer = match self.filesystem.read_to_string(path) {
            Ok(contents) => {
                tracing::info!("Opened {}", path.display());
                TextBuffer::from_text(&contents, self.config.editor.tab_size)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("{} does not exist, starting empty", path.display());
                self.set_status_message(format!("New file {}", path.display()));
                TextBuffer::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", path.display()));
            }
        };

        self.state.replace_buffer(buffer);
        self.set_file_path(path.to_path_buf());
        Ok(())
    }

    fn set_file_path(&mut self, path: PathBuf) {
        if self.config.editor.syntax_highlighting {
            self.highlighter = Some(Highlighter::for_path(Some(&path)));
        }
        self.file_path = Some(path);
    }

    /// Stream the edit history to `path` as JSON lines
    pub fn enable_event_log<P: AsRef<Path>>(&mut self, path: P) -> AnyhowResult<()> {
        let path = path.as_ref();
        self.state
            .log
            .enable_streaming(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))
    }

    /// Write the buffer to its file, or to the untitled name if it has none.
    ///
    /// Failures are reported in the status bar; the buffer is left untouched.
    pub fn save(&mut self) -> bool {
        let path = self
            .file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.config.editor.untitled_name));

        match self.filesystem.write(&path, &self.state.buffer.to_text()) {
            Ok(()) => {
                tracing::info!("Saved {}", path.display());
                self.state.log.mark_saved();
                self.set_status_message(format!("Saved {}", path.display()));
                if self.file_path.is_none() {
                    self.set_file_path(path);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", path.display(), e);
                self.set_status_message(format!("Error saving {}: {}", path.display(), e));
                false
            }
        }
    }

    pub fn handle_event(&mut self, event: Event) -> AnyhowResult<()> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.handle_key(key.code, key.modifiers)
            }
            Event::Resize(width, height) => {
                self.resize(width, height);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> AnyhowResult<()> {
        let command = self.keybindings.resolve(&KeyEvent::new(code, modifiers));
        self.dispatch(command)
            .with_context(|| format!("Buffer state became inconsistent during {command:?}"))
    }

    /// Run one command against the session
    pub fn dispatch(&mut self, command: Command) -> Result<(), BufferError> {
        let tab_size = self.config.editor.tab_size;
        let state = &mut self.state;

        match command {
            Command::InsertChar(ch) => {
                state.insert_char(ch)?;
            }
            Command::InsertSpace => {
                state.insert_space()?;
            }
            Command::InsertTab => {
                state.insert_tab(tab_size)?;
            }
            Command::InsertNewline => {
                state.insert_newline()?;
            }
            Command::Backspace => {
                state.backspace()?;
            }
            Command::Delete => {
                state.delete_forward()?;
            }
            Command::DeleteWordBackward => {
                state.delete_word_backward()?;
            }
            Command::DeleteToLineEnd => {
                state.delete_to_line_end()?;
            }
            Command::Paste => match self.clipboard.get_text() {
                Some(text) => {
                    self.state.paste(&text, tab_size)?;
                }
                None => tracing::debug!("Paste with empty clipboard"),
            },
            Command::Undo => {
                if !state.undo()? {
                    tracing::debug!("Undo with empty history");
                }
            }
            Command::Redo => {
                if !state.redo()? {
                    tracing::debug!("Redo with empty history");
                }
            }
            Command::Save => {
                self.save();
            }
            Command::Quit => self.quit(),
            Command::MoveLeft => {
                state.move_left();
            }
            Command::MoveRight => {
                state.move_right();
            }
            Command::MoveUp => {
                state.move_up();
            }
            Command::MoveDown => {
                state.move_down();
            }
            Command::MoveLineStart => state.move_line_start(),
            Command::MoveLineEnd => state.move_line_end(),
            Command::MovePageUp => {
                state.move_page_up();
            }
            Command::MovePageDown => {
                state.move_page_down();
            }
            Command::None => {}
        }

        Ok(())
    }

    /// Request the editor to quit
    pub fn quit(&mut self) {
        if self.is_modified() {
            tracing::info!("Quitting with unsaved changes");
        }
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Track a new terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = Viewport::dimensions_for_terminal(width, height);
        self.state.viewport.on_resize(width, height);
    }

    pub fn render(&self, frame: &mut Frame) {
        let renderer = EditorRenderer {
            theme: &self.theme,
            highlighter: self.highlighter.as_ref(),
        };
        let display_name = self.display_name();
        let status = StatusLine {
            file_name: &display_name,
            modified: self.is_modified(),
            message: self.status_message.as_deref(),
        };
        renderer.render(frame, &self.state, status);
    }

    /// Set a status message to display in the status bar
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn display_name(&self) -> String {
        self.file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| UNTITLED_DISPLAY_NAME.to_string())
    }

    pub fn is_modified(&self) -> bool {
        self.state.log.is_modified()
    }
}
