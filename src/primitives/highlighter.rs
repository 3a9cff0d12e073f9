//! Syntax highlighting with tree-sitter
//!
//! # Design
//! - **Window parsing**: the renderer hands over the visible lines plus some
//!   context above them, so block comments and multi-line strings that start
//!   off screen still classify correctly without parsing the whole file.
//! - **Per-char output**: results are returned per line and per char, the
//!   unit the buffer and the renderer address cells by.
//!
//! Classification never affects buffer contents.

use std::cell::RefCell;
use std::path::Path;
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent, Highlighter as TSHighlighter};

/// Display category of a single char
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightCategory {
    #[default]
    Normal,
    Keyword,
    String,
    /// Numeric literals, and the builtin literal constants some grammars
    /// group with them
    Number,
    Comment,
}

/// Capture names handed to tree-sitter, in highlight index order.
/// Sub-captures such as `string.special` resolve to the longest listed prefix.
const HIGHLIGHT_NAMES: &[(&str, HighlightCategory)] = &[
    ("comment", HighlightCategory::Comment),
    ("keyword", HighlightCategory::Keyword),
    ("string", HighlightCategory::String),
    ("number", HighlightCategory::Number),
    ("constant.builtin", HighlightCategory::Number),
];

/// Languages with a tree-sitter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Rust,
    Go,
    JavaScript,
    Python,
    PlainText,
}

impl Language {
    /// Detect the language from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("rs") => Self::Rust,
            Some("go") => Self::Go,
            Some("js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx") => Self::JavaScript,
            Some("py" | "pyi") => Self::Python,
            _ => Self::PlainText,
        }
    }

    /// Tree-sitter highlight configuration, None for plain text
    fn highlight_config(self) -> Result<Option<HighlightConfiguration>, String> {
        let (language, name, query) = match self {
            Self::Rust => (
                tree_sitter_rust::LANGUAGE.into(),
                "rust",
                tree_sitter_rust::HIGHLIGHTS_QUERY,
            ),
            Self::Go => (
                tree_sitter_go::LANGUAGE.into(),
                "go",
                tree_sitter_go::HIGHLIGHTS_QUERY,
            ),
            Self::JavaScript => (
                tree_sitter_javascript::LANGUAGE.into(),
                "javascript",
                tree_sitter_javascript::HIGHLIGHT_QUERY,
            ),
            Self::Python => (
                tree_sitter_python::LANGUAGE.into(),
                "python",
                tree_sitter_python::HIGHLIGHTS_QUERY,
            ),
            Self::PlainText => return Ok(None),
        };

        let mut config = HighlightConfiguration::new(language, name, query, "", "")
            .map_err(|e| format!("Failed to create {name} highlight config: {e}"))?;
        let names: Vec<&str> = HIGHLIGHT_NAMES.iter().map(|(name, _)| *name).collect();
        config.configure(&names[..]);
        Ok(Some(config))
    }
}

/// Classifier for one language
pub struct Highlighter {
    language: Language,
    config: Option<HighlightConfiguration>,
    ts_highlighter: RefCell<TSHighlighter>,
}

impl Highlighter {
    pub fn new(language: Language) -> Result<Self, String> {
        Ok(Self {
            language,
            config: language.highlight_config()?,
            ts_highlighter: RefCell::new(TSHighlighter::new()),
        })
    }

    /// Highlighter that classifies everything as Normal
    pub fn plain() -> Self {
        Self {
            language: Language::PlainText,
            config: None,
            ts_highlighter: RefCell::new(TSHighlighter::new()),
        }
    }

    /// Highlighter for a file, plain text when there is no path or the
    /// grammar fails to load
    pub fn for_path(path: Option<&Path>) -> Self {
        let language = path.map(Language::from_path).unwrap_or(Language::PlainText);
        Self::new(language).unwrap_or_else(|e| {
            tracing::warn!("{}, highlighting as plain text", e);
            Self::plain()
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Category of the char at `col` (Normal past the end of the line)
    pub fn classify(&self, line: &str, col: usize) -> HighlightCategory {
        self.highlight_line(line)
            .get(col)
            .copied()
            .unwrap_or_default()
    }

    /// One category per char of `line`, with the line parsed on its own
    pub fn highlight_line(&self, line: &str) -> Vec<HighlightCategory> {
        self.highlight_lines(&[line]).pop().unwrap_or_default()
    }

    /// One category vector per line, one entry per char. The lines are
    /// parsed together as consecutive lines of a document.
    pub fn highlight_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Vec<HighlightCategory>> {
        let source = lines
            .iter()
            .map(|line| line.as_ref())
            .collect::<Vec<&str>>()
            .join("\n");
        let by_byte = self.classify_bytes(&source);

        let mut offset = 0;
        lines
            .iter()
            .map(|line| {
                let line: &str = line.as_ref();
                let categories = line
                    .char_indices()
                    .map(|(i, _)| by_byte.get(offset + i).copied().unwrap_or_default())
                    .collect();
                offset += line.len() + 1;
                categories
            })
            .collect()
    }

    /// One category per byte of `source`
    fn classify_bytes(&self, source: &str) -> Vec<HighlightCategory> {
        let mut categories = vec![HighlightCategory::Normal; source.len()];
        let Some(config) = &self.config else {
            return categories;
        };

        let mut ts_highlighter = self.ts_highlighter.borrow_mut();
        let events = match ts_highlighter.highlight(config, source.as_bytes(), None, |_| None) {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Failed to highlight: {}", e);
                return categories;
            }
        };

        // Highlights nest: an escape inside a string ends back in the string
        let mut active: Vec<usize> = Vec::new();
        for event in events {
            match event {
                Ok(HighlightEvent::Source { start, end }) => {
                    let Some((_, category)) =
                        active.last().and_then(|&index| HIGHLIGHT_NAMES.get(index))
                    else {
                        continue;
                    };
                    if let Some(bytes) = categories.get_mut(start..end) {
                        bytes.fill(*category);
                    }
                }
                Ok(HighlightEvent::HighlightStart(highlight)) => active.push(highlight.0),
                Ok(HighlightEvent::HighlightEnd) => {
                    active.pop();
                }
                Err(e) => {
                    tracing::warn!("Highlight error: {}", e);
                    break;
                }
            }
        }
        categories
    }
}
