//! User-defined commands and the key notation they are written in

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Action bound to a user command name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Execute a command line (e.g., ":w", ":wq")
    CommandLine(String),
    /// Replay a key sequence through the editor
    Keys(Vec<KeyEvent>),
}

/// Lookup table for user commands entered on the command line
#[derive(Debug, Clone, Default)]
pub struct UserCommands {
    commands: HashMap<String, UserCommand>,
}

impl UserCommands {
    /// Build lookup table from the `[commands]` settings table
    pub fn from_settings(table: &HashMap<String, String>) -> Self {
        let commands = table
            .iter()
            .map(|(name, action)| (name.clone(), parse_action(action)))
            .collect();
        Self { commands }
    }

    /// Look up a command by the name typed after ':'
    pub fn get(&self, name: &str) -> Option<&UserCommand> {
        self.commands.get(name)
    }
}

/// Parse an action string into a UserCommand
pub fn parse_action(action: &str) -> UserCommand {
    // If it starts with ':', it's a command
    if let Some(cmd) = action.strip_prefix(':') {
        // Strip the trailing <CR> if present
        let cmd = if cmd.to_lowercase().ends_with("<cr>") {
            &cmd[..cmd.len() - 4]
        } else {
            cmd
        };
        return UserCommand::CommandLine(cmd.to_string());
    }

    UserCommand::Keys(parse_key_sequence(action))
}

/// Parse a run of keys such as `ihello<Esc>` into events
pub fn parse_key_sequence(sequence: &str) -> Vec<KeyEvent> {
    let mut keys = Vec::new();
    let mut remaining = sequence;

    while let Some(c) = remaining.chars().next() {
        if c == '<' {
            // Find the closing >
            if let Some(end) = remaining.find('>') {
                if let Some(key) = parse_key_notation(&remaining[..=end]) {
                    keys.push(key);
                    remaining = &remaining[end + 1..];
                    continue;
                }
            }
        }
        // Single character
        keys.push(char_to_key_event(c));
        remaining = &remaining[c.len_utf8()..];
    }

    keys
}

/// Parse a key notation string into a KeyEvent
///
/// Supported formats:
/// - Single characters: "a", "H", ";", "0"
/// - Control keys: "<C-r>", "<C-s>"
/// - Special keys: "<CR>", "<Esc>", "<Tab>", "<BS>", "<Space>", arrows, paging
pub fn parse_key_notation(s: &str) -> Option<KeyEvent> {
    let s = s.trim();

    if s.is_empty() {
        return None;
    }

    // Handle special notation <...>
    if s.len() > 2 && s.starts_with('<') && s.ends_with('>') {
        let inner = &s[1..s.len() - 1];
        return parse_special_notation(inner);
    }

    // Handle single character
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(char_to_key_event(c)),
        _ => None,
    }
}

/// Parse special notation (content inside < >)
fn parse_special_notation(inner: &str) -> Option<KeyEvent> {
    let inner_lower = inner.to_lowercase();

    // Control key: <C-x>
    if inner_lower.starts_with("c-") && inner.chars().count() == 3 {
        let c = inner.chars().nth(2)?;
        return Some(KeyEvent::new(
            KeyCode::Char(c.to_ascii_lowercase()),
            KeyModifiers::CONTROL,
        ));
    }

    // Special named keys
    let code = match inner_lower.as_str() {
        "cr" | "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => return None,
    };
    Some(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Convert a single character to a KeyEvent
fn char_to_key_event(c: char) -> KeyEvent {
    // Uppercase letters carry SHIFT the way the terminal reports them
    if c.is_ascii_uppercase() {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
    } else {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }
}
