// EditorTestHarness - Virtual terminal environment for E2E testing

use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use std::path::Path;
use std::sync::Arc;
use tern::app::Editor;
use tern::config::Config;
use tern::model::buffer::Position;
use tern::model::filesystem::StdFileSystem;
use tern::services::clipboard::MemoryClipboard;

/// Terminal layout constants
pub mod layout {
    /// Columns taken by the gutter left of the text
    pub const GUTTER_WIDTH: u16 = 2;

    /// Get the status bar row for a given terminal height
    #[inline]
    pub const fn status_bar_row(terminal_height: u16) -> u16 {
        terminal_height - 1
    }
}

/// Test harness that drives an [`Editor`] and renders it into a `TestBackend`
pub struct EditorTestHarness {
    editor: Editor,
    terminal: Terminal<TestBackend>,
}

impl EditorTestHarness {
    pub fn new(width: u16, height: u16) -> anyhow::Result<Self> {
        Self::with_config(width, height, Config::default())
    }

    pub fn with_config(width: u16, height: u16, config: Config) -> anyhow::Result<Self> {
        let editor = Editor::new(
            config,
            width,
            height,
            Box::new(MemoryClipboard::new()),
            Arc::new(StdFileSystem),
        );
        let terminal = Terminal::new(TestBackend::new(width, height))?;
        Ok(Self { editor, terminal })
    }

    /// Create a harness whose buffer starts with `text` (no file attached)
    pub fn with_text(width: u16, height: u16, text: &str) -> anyhow::Result<Self> {
        let mut harness = Self::new(width, height)?;
        let buffer = tern::model::buffer::TextBuffer::from_text(text, 4);
        harness.editor.state_mut().replace_buffer(buffer);
        harness.render()?;
        Ok(harness)
    }

    pub fn open_file(&mut self, path: &Path) -> anyhow::Result<()> {
        self.editor.open(path)?;
        self.render()
    }

    pub fn set_clipboard_text(&mut self, text: &str) {
        self.editor
            .set_clipboard(Box::new(MemoryClipboard::with_text(text)));
    }

    /// Simulate a key press
    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> anyhow::Result<()> {
        self.editor.handle_key(code, modifiers)?;
        self.render()
    }

    /// Send the same key press multiple times, rendering once at the end
    pub fn send_key_repeat(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        count: usize,
    ) -> anyhow::Result<()> {
        for _ in 0..count {
            self.editor.handle_key(code, modifiers)?;
        }
        self.render()
    }

    /// Simulate typing a string of text, rendering once at the end
    pub fn type_text(&mut self, text: &str) -> anyhow::Result<()> {
        for ch in text.chars() {
            self.editor.handle_key(KeyCode::Char(ch), KeyModifiers::NONE)?;
        }
        self.render()
    }

    /// Resize both the virtual terminal and the editor
    pub fn resize(&mut self, width: u16, height: u16) -> anyhow::Result<()> {
        self.terminal.backend_mut().resize(width, height);
        self.editor.handle_event(Event::Resize(width, height))?;
        self.render()
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        self.terminal.draw(|frame| {
            self.editor.render(frame);
        })?;
        Ok(())
    }

    /// Get the current terminal buffer (what would be displayed)
    pub fn buffer(&self) -> &ratatui::buffer::Buffer {
        self.terminal.backend().buffer()
    }

    /// Get text at specific cell position
    pub fn get_cell(&self, x: u16, y: u16) -> Option<String> {
        self.buffer().cell((x, y)).map(|cell| cell.symbol().to_string())
    }

    /// Get the style (color, modifiers) of a specific cell
    pub fn get_cell_style(&self, x: u16, y: u16) -> Option<ratatui::style::Style> {
        self.buffer().cell((x, y)).map(|cell| cell.style())
    }

    /// Get the text content of a specific screen row
    pub fn get_row_text(&self, y: u16) -> String {
        let width = self.buffer().area.width;
        (0..width)
            .filter_map(|x| self.get_cell(x, y))
            .collect()
    }

    /// Get entire screen as string (for debugging)
    pub fn screen_to_string(&self) -> String {
        let height = self.buffer().area.height;
        (0..height)
            .map(|y| self.get_row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Verify text appears on screen
    pub fn assert_screen_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            screen.contains(text),
            "Expected screen to contain '{text}'\nScreen content:\n{screen}"
        );
    }

    /// Verify text does not appear on screen
    pub fn assert_screen_not_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            !screen.contains(text),
            "Expected screen to not contain '{text}'\nScreen content:\n{screen}"
        );
    }

    /// Get the buffer content (not screen, actual buffer text)
    pub fn get_buffer_content(&self) -> String {
        self.editor.state().buffer.to_text()
    }

    /// Verify buffer content matches expected
    pub fn assert_buffer_content(&self, expected: &str) {
        let actual = self.get_buffer_content();
        assert_eq!(
            actual, expected,
            "Buffer content mismatch\nExpected: {expected:?}\nActual: {actual:?}",
        );
    }

    /// Absolute cursor position in the document
    pub fn cursor(&self) -> Position {
        self.editor.state().cursor()
    }

    /// Where the terminal cursor was placed by the last render
    pub fn screen_cursor_position(&mut self) -> (u16, u16) {
        let pos = self
            .terminal
            .get_cursor_position()
            .expect("TestBackend cursor position");
        (pos.x, pos.y)
    }

    /// Access the editor directly (for advanced testing)
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Access the editor mutably (for advanced testing)
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn should_quit(&self) -> bool {
        self.editor.should_quit()
    }
}
