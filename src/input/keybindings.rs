use crate::config::{Config, Keybinding};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Editor commands a key press can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    InsertChar(char),
    InsertSpace,
    InsertTab,
    InsertNewline,

    Backspace,
    Delete,
    DeleteWordBackward,
    DeleteToLineEnd,

    Paste,
    Undo,
    Redo,
    Save,
    Quit,

    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveLineStart,
    MoveLineEnd,
    MovePageUp,
    MovePageDown,

    // No-op
    None,
}

impl Command {
    /// Parse a command name (used when loading from config)
    pub fn from_name(name: &str) -> Option<Command> {
        match name {
            "insert_space" => Some(Command::InsertSpace),
            "insert_tab" => Some(Command::InsertTab),
            "insert_newline" => Some(Command::InsertNewline),

            "backspace" | "delete_backward" => Some(Command::Backspace),
            "delete" | "delete_forward" => Some(Command::Delete),
            "delete_word_backward" => Some(Command::DeleteWordBackward),
            "delete_to_line_end" => Some(Command::DeleteToLineEnd),

            "paste" => Some(Command::Paste),
            "undo" => Some(Command::Undo),
            "redo" => Some(Command::Redo),
            "save" => Some(Command::Save),
            "quit" => Some(Command::Quit),

            "move_left" => Some(Command::MoveLeft),
            "move_right" => Some(Command::MoveRight),
            "move_up" => Some(Command::MoveUp),
            "move_down" => Some(Command::MoveDown),
            "move_line_start" => Some(Command::MoveLineStart),
            "move_line_end" => Some(Command::MoveLineEnd),
            "move_page_up" => Some(Command::MovePageUp),
            "move_page_down" => Some(Command::MovePageDown),

            "none" => Some(Command::None),
            _ => None,
        }
    }
}

type KeyCombo = (KeyCode, KeyModifiers);

/// Resolves key events to commands: user bindings first, then the defaults,
/// then plain character input.
#[derive(Debug, Clone)]
pub struct KeybindingResolver {
    bindings: HashMap<KeyCombo, Command>,
    default_bindings: HashMap<KeyCombo, Command>,
}

impl KeybindingResolver {
    pub fn new(config: &Config) -> Self {
        let mut resolver = Self {
            bindings: HashMap::new(),
            default_bindings: Self::default_map(),
        };
        resolver.load_bindings_from_vec(&config.keybindings);
        resolver
    }

    fn default_map() -> HashMap<KeyCombo, Command> {
        let none = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        HashMap::from([
            ((KeyCode::Enter, none), Command::InsertNewline),
            ((KeyCode::Backspace, none), Command::Backspace),
            ((KeyCode::Backspace, ctrl), Command::DeleteWordBackward),
            ((KeyCode::Delete, none), Command::Delete),
            ((KeyCode::Tab, none), Command::InsertTab),
            ((KeyCode::Char(' '), none), Command::InsertSpace),
            ((KeyCode::Left, none), Command::MoveLeft),
            ((KeyCode::Right, none), Command::MoveRight),
            ((KeyCode::Up, none), Command::MoveUp),
            ((KeyCode::Down, none), Command::MoveDown),
            ((KeyCode::Home, none), Command::MoveLineStart),
            ((KeyCode::End, none), Command::MoveLineEnd),
            ((KeyCode::PageUp, none), Command::MovePageUp),
            ((KeyCode::PageDown, none), Command::MovePageDown),
            ((KeyCode::Char('s'), ctrl), Command::Save),
            ((KeyCode::Char('z'), ctrl), Command::Undo),
            ((KeyCode::Char('y'), ctrl), Command::Redo),
            ((KeyCode::Char('v'), ctrl), Command::Paste),
            ((KeyCode::Char('q'), ctrl), Command::Quit),
            ((KeyCode::Char('w'), ctrl), Command::DeleteWordBackward),
            ((KeyCode::Char('k'), ctrl), Command::DeleteToLineEnd),
            ((KeyCode::Esc, none), Command::Quit),
        ])
    }

    fn load_bindings_from_vec(&mut self, bindings: &[Keybinding]) {
        for binding in bindings {
            let Some(key) = Self::parse_key(&binding.key) else {
                tracing::warn!("Skipping keybinding with unknown key '{}'", binding.key);
                continue;
            };
            let Some(command) = Command::from_name(&binding.action) else {
                tracing::warn!(
                    "Skipping keybinding with unknown action '{}'",
                    binding.action
                );
                continue;
            };
            let modifiers = Self::parse_modifiers(&binding.modifiers);
            self.bindings.insert((key, modifiers), command);
        }
    }

    pub fn resolve(&self, event: &KeyEvent) -> Command {
        tracing::trace!(
            "KeybindingResolver.resolve: code={:?}, modifiers={:?}",
            event.code,
            event.modifiers
        );

        let combo = (event.code, event.modifiers);
        if let Some(command) = self.bindings.get(&combo) {
            tracing::trace!("  -> Found in custom bindings: {:?}", command);
            return *command;
        }
        if let Some(command) = self.default_bindings.get(&combo) {
            tracing::trace!("  -> Found in default bindings: {:?}", command);
            return *command;
        }

        if event.modifiers.is_empty() || event.modifiers == KeyModifiers::SHIFT {
            if let KeyCode::Char(c) = event.code {
                tracing::trace!("  -> Character input: '{}'", c);
                return Command::InsertChar(c);
            }
        }

        tracing::trace!("  -> No binding found, returning Command::None");
        Command::None
    }

    fn parse_key(key: &str) -> Option<KeyCode> {
        let lower = key.to_lowercase();
        match lower.as_str() {
            "enter" => Some(KeyCode::Enter),
            "backspace" => Some(KeyCode::Backspace),
            "delete" | "del" => Some(KeyCode::Delete),
            "tab" => Some(KeyCode::Tab),
            "esc" | "escape" => Some(KeyCode::Esc),
            "space" => Some(KeyCode::Char(' ')),

            "left" => Some(KeyCode::Left),
            "right" => Some(KeyCode::Right),
            "up" => Some(KeyCode::Up),
            "down" => Some(KeyCode::Down),
            "home" => Some(KeyCode::Home),
            "end" => Some(KeyCode::End),
            "pageup" => Some(KeyCode::PageUp),
            "pagedown" => Some(KeyCode::PageDown),

            s if s.chars().count() == 1 => s.chars().next().map(KeyCode::Char),
            s if s.starts_with('f') && s.len() >= 2 => s[1..].parse::<u8>().ok().map(KeyCode::F),
            _ => None,
        }
    }

    fn parse_modifiers(modifiers: &[String]) -> KeyModifiers {
        let mut result = KeyModifiers::empty();
        for m in modifiers {
            match m.to_lowercase().as_str() {
                "ctrl" | "control" => result |= KeyModifiers::CONTROL,
                "shift" => result |= KeyModifiers::SHIFT,
                "alt" => result |= KeyModifiers::ALT,
                other => tracing::warn!("Ignoring unknown modifier '{}'", other),
            }
        }
        result
    }
}
