pub mod motion;

pub use motion::{apply_motion, Motion};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Largest count a digit prefix can build up to
pub const MAX_COUNT: usize = 99_999;

/// Type of find char command (f, F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindCharType {
    Forward,  // f - first occurrence after the cursor
    Backward, // F - last occurrence before the cursor
}

/// Input state machine for Normal-mode key sequences.
///
/// The pending-find and pending-replace states are sub-states of Normal:
/// the next key completes them.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Accumulated count (e.g., "23" in "23j")
    pub count: Option<usize>,
    /// First `d` of `dd` seen
    pub pending_delete: bool,
    /// Pending find char type (f, F waiting for target char)
    pub pending_find_char: Option<FindCharType>,
    /// Pending replace char (r waiting for replacement char)
    pub pending_replace: bool,
}

/// Where the cursor lands when entering Insert mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    AtCursor,     // i
    AfterCursor,  // a
    LineStart,    // I
    LineEnd,      // A
    NewLineBelow, // o
    NewLineAbove, // O
}

/// Result of processing a key in normal mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// No action (key was consumed but needs more input)
    Pending,
    /// Execute a motion
    Motion(Motion, usize),
    /// Scroll a screenful up
    PageUp(usize),
    /// Scroll a screenful down
    PageDown(usize),
    /// Enter insert mode
    EnterInsert(InsertPosition),
    /// Delete the contents of the innermost bracket pair and insert (c)
    ChangeInner,
    /// Delete the current line into the register (dd)
    DeleteLine,
    /// Delete characters forward from the cursor (x)
    DeleteChars(usize),
    /// Insert the register as a new line below (p)
    Paste,
    /// Replace character at cursor with given char (r)
    ReplaceChar(char),
    EnterVisual,
    EnterCommand,
    EnterSearch,
    /// Ctrl-Q
    Quit,
    /// Pending state was cleared (Esc or an aborted sequence)
    Cancel,
    /// Key is not bound
    Unknown,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset input state
    pub fn reset(&mut self) {
        self.count = None;
        self.pending_delete = false;
        self.pending_find_char = None;
        self.pending_replace = false;
    }

    /// Get the effective count (1 if not specified)
    pub fn effective_count(&self) -> usize {
        self.count.unwrap_or(1)
    }

    /// Whether a multi-key sequence is in progress
    pub fn is_pending(&self) -> bool {
        self.count.is_some()
            || self.pending_delete
            || self.pending_find_char.is_some()
            || self.pending_replace
    }

    /// Short description of the pending sequence for the status bar
    pub fn pending_display(&self) -> String {
        let mut out = self.count.map(|c| c.to_string()).unwrap_or_default();
        if self.pending_delete {
            out.push('d');
        }
        match self.pending_find_char {
            Some(FindCharType::Forward) => out.push('f'),
            Some(FindCharType::Backward) => out.push('F'),
            None => {}
        }
        if self.pending_replace {
            out.push('r');
        }
        out
    }

    /// Process a digit for count accumulation
    fn accumulate_count(&mut self, digit: u32) {
        let count = self.count.unwrap_or(0);
        self.count = Some((count * 10 + digit as usize).min(MAX_COUNT));
    }

    /// Finish a sequence: clear pending state and hand back the action
    fn done(&mut self, action: KeyAction) -> KeyAction {
        self.reset();
        action
    }

    /// Process a key in normal mode
    pub fn process_normal_key(&mut self, key: KeyEvent) -> KeyAction {
        let count = self.effective_count();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Handle replace char target after 'r'
        if self.pending_replace {
            return match key.code {
                KeyCode::Char(c) if !ctrl => self.done(KeyAction::ReplaceChar(c)),
                _ => self.done(KeyAction::Cancel),
            };
        }

        // Handle find char target after f/F
        if let Some(find_type) = self.pending_find_char {
            return match key.code {
                KeyCode::Char(c) if !ctrl => {
                    let motion = match find_type {
                        FindCharType::Forward => Motion::FindChar(c),
                        FindCharType::Backward => Motion::FindCharBack(c),
                    };
                    self.done(KeyAction::Motion(motion, count))
                }
                _ => self.done(KeyAction::Cancel),
            };
        }

        // Second key of dd; anything else silently drops the delete
        if self.pending_delete {
            return match key.code {
                KeyCode::Char('d') if !ctrl => self.done(KeyAction::DeleteLine),
                _ => self.done(KeyAction::Cancel),
            };
        }

        if ctrl {
            return match key.code {
                KeyCode::Char('q') => self.done(KeyAction::Quit),
                KeyCode::Char('f') => self.done(KeyAction::EnterSearch),
                _ => self.done(KeyAction::Unknown),
            };
        }

        let action = match key.code {
            KeyCode::Esc => KeyAction::Cancel,

            // Count prefix; a leading 0 is the line-start motion
            KeyCode::Char('0') if self.count.is_none() => KeyAction::Motion(Motion::LineStart, 1),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.accumulate_count(c.to_digit(10).unwrap_or(0));
                return KeyAction::Pending;
            }

            // Motions
            KeyCode::Char('h') | KeyCode::Left => KeyAction::Motion(Motion::Left, count),
            KeyCode::Char('l') | KeyCode::Right => KeyAction::Motion(Motion::Right, count),
            KeyCode::Char('j') | KeyCode::Down => KeyAction::Motion(Motion::Down, count),
            KeyCode::Char('k') | KeyCode::Up => KeyAction::Motion(Motion::Up, count),
            KeyCode::Char('w') => KeyAction::Motion(Motion::WordForward, count),
            KeyCode::Char('b') => KeyAction::Motion(Motion::WordBackward, count),
            KeyCode::Char('$') | KeyCode::End => KeyAction::Motion(Motion::LineEnd, 1),
            KeyCode::Home => KeyAction::Motion(Motion::LineStart, 1),
            KeyCode::Char('g') => KeyAction::Motion(Motion::FileStart, 1),
            KeyCode::Char('G') => KeyAction::Motion(Motion::FileEnd, 1),
            KeyCode::PageUp => KeyAction::PageUp(count),
            KeyCode::PageDown => KeyAction::PageDown(count),

            // Insert mode entry
            KeyCode::Char('i') => KeyAction::EnterInsert(InsertPosition::AtCursor),
            KeyCode::Char('a') => KeyAction::EnterInsert(InsertPosition::AfterCursor),
            KeyCode::Char('I') => KeyAction::EnterInsert(InsertPosition::LineStart),
            KeyCode::Char('A') => KeyAction::EnterInsert(InsertPosition::LineEnd),
            KeyCode::Char('o') => KeyAction::EnterInsert(InsertPosition::NewLineBelow),
            KeyCode::Char('O') => KeyAction::EnterInsert(InsertPosition::NewLineAbove),
            KeyCode::Char('c') => KeyAction::ChangeInner,

            // Editing
            KeyCode::Char('d') => {
                self.pending_delete = true;
                return KeyAction::Pending;
            }
            KeyCode::Char('x') => KeyAction::DeleteChars(count),
            KeyCode::Char('p') => KeyAction::Paste,
            KeyCode::Char('f') => {
                self.pending_find_char = Some(FindCharType::Forward);
                return KeyAction::Pending;
            }
            KeyCode::Char('F') => {
                self.pending_find_char = Some(FindCharType::Backward);
                return KeyAction::Pending;
            }
            KeyCode::Char('r') => {
                self.pending_replace = true;
                return KeyAction::Pending;
            }

            // Mode switches
            KeyCode::Char('v') => KeyAction::EnterVisual,
            KeyCode::Char(':') => KeyAction::EnterCommand,
            KeyCode::Char('/') => KeyAction::EnterSearch,

            _ => KeyAction::Unknown,
        };

        self.done(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn feed(state: &mut InputState, keys: &str) -> Vec<KeyAction> {
        keys.chars().map(|c| state.process_normal_key(key(c))).collect()
    }

    #[test]
    fn test_count_accumulates_left_to_right() {
        let mut state = InputState::new();
        let actions = feed(&mut state, "12j");
        assert_eq!(actions[2], KeyAction::Motion(Motion::Down, 12));
        assert_eq!(state.count, None);
    }

    #[test]
    fn test_count_is_capped() {
        let mut state = InputState::new();
        let actions = feed(&mut state, "99999999999999999999j");
        assert_eq!(actions.last(), Some(&KeyAction::Motion(Motion::Down, MAX_COUNT)));
    }

    #[test]
    fn test_zero_without_count_is_line_start() {
        let mut state = InputState::new();
        assert_eq!(state.process_normal_key(key('0')), KeyAction::Motion(Motion::LineStart, 1));
        let actions = feed(&mut state, "10k");
        assert_eq!(actions[2], KeyAction::Motion(Motion::Up, 10));
    }

    #[test]
    fn test_dd_and_cancelled_d() {
        let mut state = InputState::new();
        assert_eq!(feed(&mut state, "dd"), vec![KeyAction::Pending, KeyAction::DeleteLine]);
        assert_eq!(feed(&mut state, "dj"), vec![KeyAction::Pending, KeyAction::Cancel]);
        assert!(!state.is_pending());
    }

    #[test]
    fn test_find_and_replace_take_next_key() {
        let mut state = InputState::new();
        assert_eq!(feed(&mut state, "fx")[1], KeyAction::Motion(Motion::FindChar('x'), 1));
        assert_eq!(feed(&mut state, "2F(")[2], KeyAction::Motion(Motion::FindCharBack('('), 2));
        assert_eq!(feed(&mut state, "rd")[1], KeyAction::ReplaceChar('d'));
        // the key after f is a target, not a command
        assert_eq!(feed(&mut state, "fd")[1], KeyAction::Motion(Motion::FindChar('d'), 1));
    }

    #[test]
    fn test_escape_clears_pending() {
        let mut state = InputState::new();
        feed(&mut state, "3r");
        assert_eq!(state.pending_display(), "3r");
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(state.process_normal_key(esc), KeyAction::Cancel);
        assert!(!state.is_pending());
    }

    #[test]
    fn test_shifted_letters() {
        let mut state = InputState::new();
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(state.process_normal_key(shifted), KeyAction::EnterInsert(InsertPosition::LineEnd));
    }

    #[test]
    fn test_count_reset_after_any_action() {
        let mut state = InputState::new();
        assert_eq!(feed(&mut state, "3x")[1], KeyAction::DeleteChars(3));
        assert_eq!(state.process_normal_key(key('x')), KeyAction::DeleteChars(1));
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(state.process_normal_key(ctrl_q), KeyAction::Quit);
    }
}
