//! Key dispatch: routes each key event to the handler for the current mode

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::commands::{parse_command, Command, CommandResult};
use crate::config::UserCommand;
use crate::editor::{Direction, Editor, Mode};
use crate::input::{KeyAction, Motion};

/// How deep user commands may expand into further user commands
const MAX_USER_COMMAND_DEPTH: usize = 16;

/// Handle a key event and update editor state
pub fn handle_key(editor: &mut Editor, key: KeyEvent) {
    dispatch(editor, key, 0);
    editor.scroll();
}

fn dispatch(editor: &mut Editor, key: KeyEvent, depth: usize) {
    if !is_ctrl(key, 'q') {
        editor.reset_quit_countdown();
    }

    // Messages last until the next key, except while a sequence or prompt is open
    if matches!(editor.mode, Mode::Normal | Mode::Insert) && !editor.input_state.is_pending() {
        editor.clear_status();
    }

    match editor.mode {
        Mode::Normal => handle_normal_mode(editor, key),
        Mode::Insert => handle_insert_mode(editor, key),
        Mode::Visual => handle_visual_mode(editor, key),
        Mode::Command => handle_command_mode(editor, key, depth),
        Mode::Search => handle_search_mode(editor, key),
    }
}

fn is_ctrl(key: KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Control keys shared by Normal and Insert mode. Returns true if handled.
fn handle_control_key(editor: &mut Editor, key: KeyEvent) -> bool {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key.code {
        KeyCode::Char('s') => {
            editor.save();
        }
        KeyCode::Char('k') => {
            editor.delete_line();
        }
        KeyCode::Char('l') => editor.center_cursor(),
        KeyCode::Char(' ') | KeyCode::Char('@') | KeyCode::Null => editor.set_mark(),
        KeyCode::Char('u') => editor.pop_mark(),
        _ => return false,
    }
    true
}

fn handle_normal_mode(editor: &mut Editor, key: KeyEvent) {
    if !editor.input_state.is_pending() && handle_control_key(editor, key) {
        return;
    }

    match editor.input_state.process_normal_key(key) {
        KeyAction::Pending | KeyAction::Cancel | KeyAction::Unknown => {}
        KeyAction::Motion(motion, count) => editor.apply_motion(motion, count),
        KeyAction::PageUp(count) => editor.page_up(count),
        KeyAction::PageDown(count) => editor.page_down(count),
        KeyAction::EnterInsert(position) => editor.enter_insert_mode(position),
        KeyAction::ChangeInner => editor.change_inner(),
        KeyAction::DeleteLine => editor.delete_line(),
        KeyAction::DeleteChars(count) => editor.delete_chars(count),
        KeyAction::Paste => editor.paste(),
        KeyAction::ReplaceChar(c) => editor.replace_char(c),
        KeyAction::EnterVisual => editor.enter_visual_mode(),
        KeyAction::EnterCommand => editor.enter_command_mode(),
        KeyAction::EnterSearch => editor.enter_search_mode(),
        KeyAction::Quit => editor.quit_key(),
    }
}

fn handle_insert_mode(editor: &mut Editor, key: KeyEvent) {
    if handle_control_key(editor, key) {
        return;
    }

    match (key.modifiers, key.code) {
        // Exit insert mode
        (KeyModifiers::NONE, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('[')) => {
            editor.enter_normal_mode();
        }

        (KeyModifiers::CONTROL, KeyCode::Char('q')) => editor.quit_key(),
        (KeyModifiers::CONTROL, KeyCode::Char('f')) => editor.enter_search_mode(),

        (_, KeyCode::Enter) => editor.insert_newline(),
        (_, KeyCode::Backspace) => editor.delete_char_before(),
        (_, KeyCode::Delete) => editor.delete_char_at(),
        (_, KeyCode::Tab) => editor.insert_tab(),

        // Regular character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => editor.insert_char(c),

        // Arrow keys wrap across line ends in insert mode
        (_, KeyCode::Left) => editor.move_left_wrapping(),
        (_, KeyCode::Right) => editor.move_right_wrapping(),
        (_, KeyCode::Up) => editor.apply_motion(Motion::Up, 1),
        (_, KeyCode::Down) => editor.apply_motion(Motion::Down, 1),
        (_, KeyCode::Home) => editor.apply_motion(Motion::LineStart, 1),
        (_, KeyCode::End) => editor.apply_motion(Motion::LineEnd, 1),
        (_, KeyCode::PageUp) => editor.page_up(1),
        (_, KeyCode::PageDown) => editor.page_down(1),

        _ => {}
    }
}

fn handle_visual_mode(editor: &mut Editor, key: KeyEvent) {
    if !editor.input_state.is_pending() {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) | (KeyModifiers::NONE, KeyCode::Char('v')) => {
                editor.exit_visual_mode();
                return;
            }
            _ => {}
        }
    }

    // Only cursor movement is meaningful while a selection is shown
    match editor.input_state.process_normal_key(key) {
        KeyAction::Motion(motion, count) => editor.apply_motion(motion, count),
        KeyAction::PageUp(count) => editor.page_up(count),
        KeyAction::PageDown(count) => editor.page_down(count),
        KeyAction::Quit => editor.quit_key(),
        _ => {}
    }
}

fn handle_command_mode(editor: &mut Editor, key: KeyEvent, depth: usize) {
    match (key.modifiers, key.code) {
        // Cancel command
        (KeyModifiers::NONE, KeyCode::Esc)
        | (KeyModifiers::CONTROL, KeyCode::Char('['))
        | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            editor.exit_command_mode();
        }

        // Execute command
        (_, KeyCode::Enter) => {
            let cmd = editor.command_line.execute();
            editor.mode = Mode::Normal;
            execute_command(editor, cmd, depth);
        }

        // Backspace
        (_, KeyCode::Backspace) => {
            if editor.command_line.input.is_empty() {
                editor.exit_command_mode();
            } else {
                editor.command_line.delete_char_before();
            }
        }

        // Cursor movement
        (_, KeyCode::Left) => editor.command_line.move_left(),
        (_, KeyCode::Right) => editor.command_line.move_right(),

        // Regular character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            editor.command_line.insert_char(c);
        }

        _ => {}
    }
}

fn handle_search_mode(editor: &mut Editor, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Cancel search
        (KeyModifiers::NONE, KeyCode::Esc)
        | (KeyModifiers::CONTROL, KeyCode::Char('['))
        | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            editor.finish_search(false);
        }

        // Keep the match
        (_, KeyCode::Enter) => editor.finish_search(true),

        (_, KeyCode::Backspace) => editor.search_pop(),

        (_, KeyCode::Right) | (_, KeyCode::Down) => editor.search_step(Direction::Forward),
        (_, KeyCode::Left) | (_, KeyCode::Up) => editor.search_step(Direction::Backward),

        // Regular character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => editor.search_push(c),

        _ => {}
    }
}

fn execute_command(editor: &mut Editor, cmd: Command, depth: usize) {
    let result = match cmd {
        Command::Write(path) => {
            match path {
                Some(p) => editor.save_as(p),
                None => editor.save(),
            };
            CommandResult::Ok
        }

        Command::Quit => {
            if editor.quit_command() {
                CommandResult::Quit
            } else {
                CommandResult::Error("Unsaved changes use 'q!' to override.".to_string())
            }
        }

        Command::ForceQuit => CommandResult::Quit,

        Command::WriteQuit => {
            if editor.save() {
                CommandResult::Quit
            } else {
                CommandResult::Ok
            }
        }

        Command::Edit { path, force } => {
            if editor.buffer().dirty && !force {
                CommandResult::Error("No write since last change (add ! to override)".to_string())
            } else {
                match path.or_else(|| editor.buffer().path.clone()) {
                    Some(p) => match editor.open_file(p) {
                        Ok(()) => CommandResult::Message(format!(
                            "\"{}\" {} lines",
                            editor.buffer().display_name(),
                            editor.buffer().len_lines()
                        )),
                        Err(e) => CommandResult::Error(e.to_string()),
                    },
                    None => CommandResult::Error(crate::Error::NoFileName.to_string()),
                }
            }
        }

        Command::Source => match editor.reload_config() {
            Ok(()) => CommandResult::Message("config reloaded".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "config reload failed");
                CommandResult::Error(e.to_string())
            }
        },

        Command::GotoLine(line) => {
            editor.goto_line(line);
            CommandResult::Ok
        }

        Command::User(input) => run_user_command(editor, &input, depth),

        Command::Nop => CommandResult::Ok,
    };

    match result {
        CommandResult::Ok => {}
        CommandResult::Message(msg) | CommandResult::Error(msg) => editor.set_status(msg),
        CommandResult::Quit => editor.request_quit(),
    }
}

/// Resolve a name against the `[commands]` table and run its action
fn run_user_command(editor: &mut Editor, input: &str, depth: usize) -> CommandResult {
    let name = input.split_whitespace().next().unwrap_or(input);
    let Some(action) = editor.user_commands.get(name).cloned() else {
        tracing::debug!(command = input, "unknown command");
        return CommandResult::Error(crate::Error::UnknownCommand(input.to_string()).to_string());
    };
    if depth >= MAX_USER_COMMAND_DEPTH {
        tracing::warn!(command = name, "user command recursion limit reached");
        return CommandResult::Error(format!("recursive user command: {}", name));
    }

    tracing::debug!(command = name, "running user command");
    match action {
        UserCommand::CommandLine(line) => {
            execute_command(editor, parse_command(&line), depth + 1);
        }
        UserCommand::Keys(keys) => {
            for key in keys {
                dispatch(editor, key, depth + 1);
                if editor.should_quit() {
                    break;
                }
            }
        }
    }
    CommandResult::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, UserCommands};
    use crate::editor::{Buffer, Cursor};
    use crate::syntax::Highlight;
    use crossterm::style::Color;
    use std::collections::HashMap;

    fn editor(lines: &[&str]) -> Editor {
        let mut editor = Editor::with_buffer(Settings::default(), Buffer::from_lines(lines.to_vec()));
        editor.set_size(80, 24);
        editor
    }

    fn key(c: char) -> KeyEvent {
        if c.is_ascii_uppercase() {
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
        } else {
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn special(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_keys(editor: &mut Editor, keys: &str) {
        for c in keys.chars() {
            handle_key(editor, key(c));
        }
    }

    fn command(editor: &mut Editor, text: &str) {
        type_keys(editor, ":");
        type_keys(editor, text);
        handle_key(editor, special(KeyCode::Enter));
    }

    #[test]
    fn test_count_prefix_moves_down() {
        let mut ed = editor(&["a", "b", "c", "d", "e"]);
        type_keys(&mut ed, "3j");
        assert_eq!(ed.cursor.cy, 3);
        assert!(!ed.input_state.is_pending());
    }

    #[test]
    fn test_huge_count_clamps_instead_of_overflowing() {
        let mut ed = editor(&["one", "two", "three"]);
        type_keys(&mut ed, "99999999999999999999j");
        assert_eq!(ed.cursor.cy, 2);
        type_keys(&mut ed, "99999999999999999999l");
        assert_eq!(ed.cursor.cx, 5);
        type_keys(&mut ed, "99999999999999999999b");
        assert_eq!(ed.cursor, Cursor::new(0, 0));
        type_keys(&mut ed, "99999999999999999999w");
        assert_eq!(ed.cursor, Cursor::new(2, 5));
        handle_key(&mut ed, KeyEvent::new(KeyCode::Char('9'), KeyModifiers::NONE));
        handle_key(&mut ed, special(KeyCode::PageUp));
        assert_eq!(ed.cursor.cy, 0);
        assert!(!ed.input_state.is_pending());
    }

    #[test]
    fn test_d_then_other_key_cancels() {
        let mut ed = editor(&["one", "two"]);
        type_keys(&mut ed, "dj");
        assert_eq!(ed.buffer().len_lines(), 2);
        assert_eq!(ed.cursor.cy, 0);
        type_keys(&mut ed, "dd");
        assert_eq!(ed.buffer().len_lines(), 1);
    }

    #[test]
    fn test_insert_and_escape() {
        let mut ed = editor(&[""]);
        type_keys(&mut ed, "ihi");
        assert_eq!(ed.mode, Mode::Insert);
        handle_key(&mut ed, special(KeyCode::Esc));
        assert_eq!(ed.mode, Mode::Normal);
        assert_eq!(ed.buffer().line(0).unwrap().raw(), "hi");
        assert_eq!(ed.cursor.cx, 1);
    }

    #[test]
    fn test_insert_arrow_wraps() {
        let mut ed = editor(&["ab", "cd"]);
        ed.cursor.set(1, 0);
        type_keys(&mut ed, "i");
        handle_key(&mut ed, special(KeyCode::Left));
        assert_eq!(ed.cursor, Cursor::new(0, 2));
        handle_key(&mut ed, special(KeyCode::Right));
        assert_eq!(ed.cursor, Cursor::new(1, 0));
    }

    #[test]
    fn test_replace_and_find() {
        let mut ed = editor(&["hello world"]);
        type_keys(&mut ed, "fo");
        assert_eq!(ed.cursor.cx, 4);
        type_keys(&mut ed, "rX");
        assert_eq!(ed.buffer().line(0).unwrap().raw(), "hellX world");
        type_keys(&mut ed, "Fh");
        assert_eq!(ed.cursor.cx, 0);
        type_keys(&mut ed, "fz");
        assert_eq!(ed.cursor.cx, 0);
    }

    #[test]
    fn test_command_backspace_on_empty_cancels() {
        let mut ed = editor(&["x"]);
        type_keys(&mut ed, ":");
        assert_eq!(ed.mode, Mode::Command);
        handle_key(&mut ed, special(KeyCode::Backspace));
        assert_eq!(ed.mode, Mode::Normal);
    }

    #[test]
    fn test_goto_line_command() {
        let mut ed = editor(&["a", "b", "c"]);
        command(&mut ed, "3");
        assert_eq!(ed.cursor.cy, 2);
        command(&mut ed, "99");
        assert_eq!(ed.cursor.cy, 2);
    }

    #[test]
    fn test_unknown_command_reports() {
        let mut ed = editor(&["x"]);
        command(&mut ed, "Frobnicate");
        assert_eq!(ed.status_message.as_deref(), Some("unknown command: Frobnicate"));
        assert_eq!(ed.mode, Mode::Normal);
    }

    #[test]
    fn test_user_command_keys_and_command_line() {
        let mut ed = editor(&["one", "two", "three"]);
        let mut table = HashMap::new();
        table.insert("Bottom".to_string(), "G".to_string());
        table.insert("Kill".to_string(), ":Bottom".to_string());
        table.insert("Stamp".to_string(), "O// ok<Esc>".to_string());
        ed.user_commands = UserCommands::from_settings(&table);

        command(&mut ed, "Kill");
        assert_eq!(ed.cursor.cy, 2);

        command(&mut ed, "Stamp");
        assert_eq!(ed.buffer().line(2).unwrap().raw(), "// ok");
        assert_eq!(ed.mode, Mode::Normal);
    }

    #[test]
    fn test_recursive_user_command_stops() {
        let mut ed = editor(&["x"]);
        let mut table = HashMap::new();
        table.insert("Loop".to_string(), ":Loop".to_string());
        ed.user_commands = UserCommands::from_settings(&table);
        command(&mut ed, "Loop");
        assert_eq!(ed.status_message.as_deref(), Some("recursive user command: Loop"));
    }

    #[test]
    fn test_quit_countdown_resets_on_other_key() {
        let mut ed = editor(&["x"]);
        type_keys(&mut ed, "ia");
        handle_key(&mut ed, ctrl('q'));
        handle_key(&mut ed, ctrl('q'));
        handle_key(&mut ed, special(KeyCode::Left));
        handle_key(&mut ed, ctrl('q'));
        assert!(!ed.should_quit());
        handle_key(&mut ed, ctrl('q'));
        handle_key(&mut ed, ctrl('q'));
        assert!(ed.should_quit());
    }

    #[test]
    fn test_ctrl_k_kills_line() {
        let mut ed = editor(&["first", "second"]);
        type_keys(&mut ed, "i");
        handle_key(&mut ed, ctrl('k'));
        assert_eq!(ed.register.get(), Some("first"));
        assert_eq!(ed.buffer().len_lines(), 1);
        assert_eq!(ed.mode, Mode::Insert);
    }

    #[test]
    fn test_edit_refused_when_dirty() {
        let mut ed = editor(&["x"]);
        type_keys(&mut ed, "x");
        command(&mut ed, "e other.txt");
        assert_eq!(
            ed.status_message.as_deref(),
            Some("No write since last change (add ! to override)")
        );
    }

    #[test]
    fn test_source_applies_config_and_keeps_it_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[editor]\ntab_stop = 4\n\n[colors]\ncomment = 100\n\n[commands]\nTop = \"g\"\n",
        )
        .unwrap();

        let mut ed = editor(&["\tx"]);
        ed.config_path = Some(path.clone());
        command(&mut ed, "source");
        assert_eq!(ed.status_message.as_deref(), Some("config reloaded"));
        assert_eq!(ed.settings.editor.tab_stop, 4);
        assert_eq!(ed.buffer().renderer().tab_stop(), 4);
        let render: String = ed.buffer().line(0).unwrap().render().iter().collect();
        assert_eq!(render, "    x");
        assert_eq!(ed.theme.color(Highlight::Comment), Color::AnsiValue(100));
        assert!(ed.user_commands.get("Top").is_some());

        std::fs::write(&path, "[editor\ntab_stop = 8\n").unwrap();
        command(&mut ed, "source");
        assert_eq!(ed.mode, Mode::Normal);
        let status = ed.status_message.clone().unwrap_or_default();
        assert!(status.contains("config.toml"), "{status}");
        assert_eq!(ed.settings.editor.tab_stop, 4);
        assert_eq!(ed.buffer().renderer().tab_stop(), 4);
        assert!(ed.user_commands.get("Top").is_some());
    }

    #[test]
    fn test_visual_escape_returns_to_anchor() {
        let mut ed = editor(&["abc", "def"]);
        type_keys(&mut ed, "vjl");
        assert_eq!(ed.mode, Mode::Visual);
        assert_eq!(ed.cursor, Cursor::new(1, 1));
        handle_key(&mut ed, special(KeyCode::Esc));
        assert_eq!(ed.mode, Mode::Normal);
        assert_eq!(ed.cursor, Cursor::new(0, 0));
    }
}
