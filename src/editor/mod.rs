mod buffer;
mod cursor;
mod file;
mod line;
mod register;
mod render;
mod search;

pub use buffer::Buffer;
pub use cursor::{Cursor, Viewport};
pub use line::Line;
pub use register::Register;
pub use render::{TabRenderer, DEFAULT_TAB_STOP};
pub use search::{find_in_render, Direction, Search};

use std::path::PathBuf;

use crate::commands::CommandLine;
use crate::config::{self, Settings, UserCommands};
use crate::error::Result;
use crate::input::{apply_motion, InputState, InsertPosition, Motion};
use crate::syntax::{Highlight, Theme};

/// Editor mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual,
    Command,
    Search,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
            Mode::Command => "COMMAND",
            Mode::Search => "SEARCH",
        }
    }
}

/// Brackets that `c` clears the inside of
const BRACKET_PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// Characters auto-pairs closes
const AUTO_PAIRS: [(char, char); 6] = [
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('"', '"'),
    ('\'', '\''),
    ('<', '>'),
];

/// The editor state: one buffer, its cursor and viewport, and the modal
/// input machinery that edits them.
pub struct Editor {
    buffer: Buffer,
    pub cursor: Cursor,
    pub view: Viewport,
    pub mode: Mode,
    pub input_state: InputState,
    pub register: Register,
    pub command_line: CommandLine,
    pub search: Option<Search>,
    pub settings: Settings,
    pub theme: Theme,
    pub user_commands: UserCommands,
    /// Where `:source` reads settings from
    pub config_path: Option<PathBuf>,
    pub status_message: Option<String>,
    pub term_width: u16,
    pub term_height: u16,
    visual_anchor: Option<Cursor>,
    overlay_rows: Vec<usize>,
    mark: Option<(Cursor, Viewport)>,
    quit_countdown: usize,
    quit_confirm_version: Option<u64>,
    should_quit: bool,
}

impl Editor {
    pub fn new(settings: Settings) -> Self {
        Self::with_buffer(settings, Buffer::new())
    }

    pub fn with_buffer(settings: Settings, mut buffer: Buffer) -> Self {
        buffer.set_tab_stop(settings.editor.tab_stop);
        let theme = Theme::from_settings(&settings.colors);
        let user_commands = UserCommands::from_settings(&settings.commands);
        let quit_countdown = settings.editor.quit_times;
        Self {
            buffer,
            cursor: Cursor::default(),
            view: Viewport::default(),
            mode: Mode::Normal,
            input_state: InputState::new(),
            register: Register::new(),
            command_line: CommandLine::new(),
            search: None,
            settings,
            theme,
            user_commands,
            config_path: config::config_path(),
            status_message: None,
            term_width: 80,
            term_height: 24,
            visual_anchor: None,
            overlay_rows: Vec::new(),
            mark: None,
            quit_countdown,
            quit_confirm_version: None,
            should_quit: false,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Replace the buffer with the contents of `path`
    pub fn open_file(&mut self, path: PathBuf) -> Result<()> {
        let mut buffer = Buffer::from_file(path)?;
        buffer.set_tab_stop(self.settings.editor.tab_stop);
        self.buffer = buffer;
        self.cursor = Cursor::default();
        self.view.row_offset = 0;
        self.view.col_offset = 0;
        self.visual_anchor = None;
        self.overlay_rows.clear();
        self.mark = None;
        self.quit_confirm_version = None;
        Ok(())
    }

    /// Save to the buffer's path and report the outcome in the status bar
    pub fn save(&mut self) -> bool {
        match self.buffer.save() {
            Ok(bytes) => {
                self.set_status(format!("{} bytes written to disk", bytes));
                true
            }
            Err(crate::Error::NoFileName) => {
                self.set_status("No file name");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.set_status(format!("Can't save! I/O error: {}", e));
                false
            }
        }
    }

    /// Bind the buffer to `path` (picking its language) and save
    pub fn save_as(&mut self, path: PathBuf) -> bool {
        self.buffer.set_path(path);
        self.save()
    }

    /// Re-read the configuration file and apply it
    pub fn reload_config(&mut self) -> Result<()> {
        let path = self.config_path.clone().ok_or(crate::Error::NoFileName)?;
        let settings = config::try_load_config(&path)?;
        self.apply_settings(settings);
        tracing::info!(path = %path.display(), "config reloaded");
        Ok(())
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.theme = Theme::from_settings(&settings.colors);
        self.user_commands = UserCommands::from_settings(&settings.commands);
        self.quit_countdown = settings.editor.quit_times;
        if settings.editor.tab_stop != self.buffer.renderer().tab_stop() {
            self.buffer.set_tab_stop(settings.editor.tab_stop);
        }
        self.settings = settings;
    }

    /// Set terminal size
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.term_width = width;
        self.term_height = height;
        self.view.rows = self.text_rows();
        self.view.cols = self.text_cols();
    }

    /// Get the number of rows available for text (excluding status line)
    pub fn text_rows(&self) -> usize {
        self.term_height.saturating_sub(2) as usize // 1 for status, 1 for messages
    }

    /// Width of the line number gutter including its trailing space
    pub fn gutter_width(&self) -> usize {
        if self.settings.editor.line_numbers {
            self.buffer.len_lines().to_string().len().max(3) + 1
        } else {
            0
        }
    }

    pub fn text_cols(&self) -> usize {
        (self.term_width as usize).saturating_sub(self.gutter_width())
    }

    /// Render column of the cursor
    pub fn cursor_rx(&self) -> usize {
        self.buffer
            .line(self.cursor.cy)
            .map(|line| self.buffer.renderer().cx_to_rx(line.raw(), self.cursor.cx))
            .unwrap_or(0)
    }

    /// Scroll the viewport so the cursor is visible
    pub fn scroll(&mut self) {
        self.view.rows = self.text_rows();
        self.view.cols = self.text_cols();
        let rx = self.cursor_rx();
        self.view.follow(self.cursor.cy, rx);
    }

    /// Clamp cursor to valid buffer positions
    pub fn clamp_cursor(&mut self) {
        let max_line = self.buffer.len_lines().saturating_sub(1);
        self.cursor.cy = self.cursor.cy.min(max_line);
        self.cursor.cx = self.cursor.cx.min(self.buffer.line_len(self.cursor.cy));
    }

    pub fn apply_motion(&mut self, motion: Motion, count: usize) {
        let (cy, cx) = apply_motion(&self.buffer, motion, self.cursor.cy, self.cursor.cx, count);
        self.cursor.set(cy, cx);
        self.refresh_visual();
    }

    pub fn goto_line(&mut self, line: usize) {
        self.cursor.set(line.saturating_sub(1), 0);
        self.clamp_cursor();
        self.refresh_visual();
    }

    pub fn page_up(&mut self, count: usize) {
        let rows = self.text_rows().max(1);
        for _ in 0..count.clamp(1, self.buffer.len_lines()) {
            self.cursor.cy = self.view.row_offset;
            self.cursor.move_up(rows);
            self.view.row_offset = self.cursor.cy;
        }
        self.clamp_cursor();
        self.refresh_visual();
    }

    pub fn page_down(&mut self, count: usize) {
        let rows = self.text_rows().max(1);
        let last = self.buffer.len_lines().saturating_sub(1);
        for _ in 0..count.clamp(1, self.buffer.len_lines()) {
            self.cursor.cy = (self.view.row_offset + rows - 1).min(last);
            self.cursor.cy = (self.cursor.cy + rows).min(last);
            self.view.row_offset = self.cursor.cy.saturating_sub(rows - 1);
        }
        self.clamp_cursor();
        self.refresh_visual();
    }

    /// Left arrow in Insert mode: wraps to the end of the previous line
    pub fn move_left_wrapping(&mut self) {
        if self.cursor.cx > 0 {
            self.cursor.cx -= 1;
        } else if self.cursor.cy > 0 {
            self.cursor.cy -= 1;
            self.cursor.cx = self.buffer.line_len(self.cursor.cy);
        }
    }

    /// Right arrow in Insert mode: wraps to the start of the next line
    pub fn move_right_wrapping(&mut self) {
        if self.cursor.cx < self.buffer.line_len(self.cursor.cy) {
            self.cursor.cx += 1;
        } else if self.cursor.cy + 1 < self.buffer.len_lines() {
            self.cursor.cy += 1;
            self.cursor.cx = 0;
        }
    }

    /// Ctrl-L
    pub fn center_cursor(&mut self) {
        self.view.rows = self.text_rows();
        self.view.center_on(self.cursor.cy);
    }

    /// Ctrl-Space
    pub fn set_mark(&mut self) {
        self.mark = Some((self.cursor, self.view));
        self.set_status("Mark set");
    }

    /// Ctrl-U: jump back to the mark and forget it
    pub fn pop_mark(&mut self) {
        match self.mark.take() {
            Some((cursor, view)) => {
                self.cursor = cursor;
                self.view = view;
                self.clamp_cursor();
            }
            None => self.set_status("No mark set"),
        }
    }

    /// Exit to normal mode
    pub fn enter_normal_mode(&mut self) {
        self.mode = Mode::Normal;
        self.cursor.cx = self.cursor.cx.saturating_sub(1);
        self.clamp_cursor();
    }

    pub fn enter_insert_mode(&mut self, position: InsertPosition) {
        match position {
            InsertPosition::AtCursor => {}
            InsertPosition::AfterCursor => {
                self.cursor.cx = (self.cursor.cx + 1).min(self.buffer.line_len(self.cursor.cy));
            }
            InsertPosition::LineStart => self.cursor.cx = 0,
            InsertPosition::LineEnd => self.cursor.cx = self.buffer.line_len(self.cursor.cy),
            InsertPosition::NewLineBelow => self.open_line(self.cursor.cy + 1),
            InsertPosition::NewLineAbove => self.open_line(self.cursor.cy),
        }
        self.mode = Mode::Insert;
    }

    /// Insert a line at `at` carrying the current line's indentation
    fn open_line(&mut self, at: usize) {
        let indent = if self.settings.editor.auto_indent {
            self.buffer
                .line(self.cursor.cy)
                .map(|l| l.indent().to_string())
                .unwrap_or_default()
        } else {
            String::new()
        };
        self.buffer.insert_line(at, &indent);
        self.cursor.set(at, indent.chars().count());
    }

    pub fn enter_command_mode(&mut self) {
        self.command_line.clear();
        self.mode = Mode::Command;
    }

    pub fn exit_command_mode(&mut self) {
        self.command_line.clear();
        self.mode = Mode::Normal;
    }

    pub fn enter_visual_mode(&mut self) {
        self.visual_anchor = Some(self.cursor);
        self.mode = Mode::Visual;
        self.refresh_visual();
    }

    /// Leave Visual, putting the cursor back on the anchor and clearing the overlay
    pub fn exit_visual_mode(&mut self) {
        if let Some(anchor) = self.visual_anchor.take() {
            self.cursor = anchor;
        }
        let rows = std::mem::take(&mut self.overlay_rows);
        self.buffer.clear_overlays(rows);
        self.mode = Mode::Normal;
        self.clamp_cursor();
    }

    pub fn visual_anchor(&self) -> Option<Cursor> {
        self.visual_anchor
    }

    /// Repaint the selection overlay between the anchor and the cursor
    fn refresh_visual(&mut self) {
        let Some(anchor) = self.visual_anchor else {
            return;
        };
        let previous = std::mem::take(&mut self.overlay_rows);
        self.buffer.clear_overlays(previous);

        let (start, end) = if (anchor.cy, anchor.cx) <= (self.cursor.cy, self.cursor.cx) {
            (anchor, self.cursor)
        } else {
            (self.cursor, anchor)
        };
        let renderer = self.buffer.renderer();
        for row in start.cy..=end.cy {
            let Some(line) = self.buffer.line(row) else {
                break;
            };
            let from = if row == start.cy {
                renderer.cx_to_rx(line.raw(), start.cx)
            } else {
                0
            };
            let to = if row == end.cy {
                renderer.cx_to_rx(line.raw(), end.cx + 1)
            } else {
                line.render().len()
            };
            self.buffer.overlay(row, from, to, Highlight::Visual);
            self.overlay_rows.push(row);
        }
    }

    /// dd: kill the current line into the register
    pub fn delete_line(&mut self) {
        if let Some(text) = self.buffer.delete_line(self.cursor.cy) {
            self.register.set(text);
        }
        self.clamp_cursor();
    }

    /// x: delete `count` characters forward
    pub fn delete_chars(&mut self, count: usize) {
        for _ in 0..count.max(1) {
            if self.buffer.delete_char(self.cursor.cy, self.cursor.cx).is_none() {
                break;
            }
        }
    }

    /// p: put the register below the current line
    pub fn paste(&mut self) {
        let Some(text) = self.register.get().map(str::to_string) else {
            return;
        };
        let at = self.cursor.cy + 1;
        self.buffer.insert_line(at, &text);
        self.cursor.set(at, 0);
    }

    /// r: overwrite the character under the cursor
    pub fn replace_char(&mut self, ch: char) {
        self.buffer.replace_char(self.cursor.cy, self.cursor.cx, ch);
    }

    /// c: clear the innermost bracket pair around (or else after) the cursor and insert
    pub fn change_inner(&mut self) {
        if let Some((open, close)) = self.find_bracket_pair() {
            self.buffer.delete_range(self.cursor.cy, open + 1, close);
            self.cursor.cx = open + 1;
        }
        self.mode = Mode::Insert;
    }

    /// Columns of the bracket pair `c` acts on, on the cursor line
    fn find_bracket_pair(&self) -> Option<(usize, usize)> {
        let chars: Vec<char> = self.buffer.line(self.cursor.cy)?.raw().chars().collect();
        let cx = self.cursor.cx;

        let mut stack: Vec<(char, usize)> = Vec::new();
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for (col, &c) in chars.iter().enumerate() {
            if BRACKET_PAIRS.iter().any(|(open, _)| *open == c) {
                stack.push((c, col));
            } else if let Some((open, _)) = BRACKET_PAIRS.iter().find(|(_, close)| *close == c) {
                if let Some(idx) = stack.iter().rposition(|(o, _)| o == open) {
                    let (_, open_col) = stack[idx];
                    stack.truncate(idx);
                    pairs.push((open_col, col));
                }
            }
        }

        let enclosing = pairs
            .iter()
            .filter(|(open, close)| *open <= cx && cx <= *close)
            .max_by_key(|(open, _)| *open);
        let following = || {
            pairs
                .iter()
                .filter(|(open, _)| *open > cx)
                .min_by_key(|(open, _)| *open)
        };
        enclosing.or_else(following).copied()
    }

    pub fn insert_char(&mut self, ch: char) {
        let closer = self
            .settings
            .editor
            .auto_pairs
            .then(|| AUTO_PAIRS.iter().find(|(open, _)| *open == ch))
            .flatten()
            .map(|(_, close)| *close);

        self.buffer.insert_char(self.cursor.cy, self.cursor.cx, ch);
        self.cursor.cx += 1;
        if let Some(close) = closer {
            self.buffer.insert_char(self.cursor.cy, self.cursor.cx, close);
        }
    }

    pub fn insert_tab(&mut self) {
        if self.settings.editor.expand_tab {
            let spaces = " ".repeat(self.buffer.renderer().tab_stop());
            self.buffer.insert_str(self.cursor.cy, self.cursor.cx, &spaces);
            self.cursor.cx += spaces.len();
        } else {
            self.insert_char('\t');
        }
    }

    /// Enter: split the line, carrying indentation onto the new line
    pub fn insert_newline(&mut self) {
        let Some(line) = self.buffer.line(self.cursor.cy) else {
            return;
        };
        let cx = self.cursor.cx.min(line.len());
        let mut indent = String::new();
        if self.settings.editor.auto_indent && cx > 0 {
            let head: String = line.raw().chars().take(cx).collect();
            indent = line.indent().chars().take(cx).collect();
            if head.trim_end().ends_with('{') {
                indent.push_str(&" ".repeat(self.buffer.renderer().tab_stop()));
            }
        }

        self.buffer.split_line(self.cursor.cy, cx);
        self.cursor.set(self.cursor.cy + 1, 0);
        if !indent.is_empty() {
            self.buffer.insert_str(self.cursor.cy, 0, &indent);
            self.cursor.cx = indent.chars().count();
        }
    }

    /// Backspace: delete before the cursor, joining lines at column 0
    pub fn delete_char_before(&mut self) {
        if self.cursor.cx > 0 {
            self.cursor.cx -= 1;
            self.buffer.delete_char(self.cursor.cy, self.cursor.cx);
        } else if self.cursor.cy > 0 {
            let prev = self.cursor.cy - 1;
            let prev_len = self.buffer.line_len(prev);
            self.buffer.join_with_next(prev);
            self.cursor.set(prev, prev_len);
        }
    }

    /// Delete: remove under the cursor, joining the next line at the end
    pub fn delete_char_at(&mut self) {
        if self.cursor.cx < self.buffer.line_len(self.cursor.cy) {
            self.buffer.delete_char(self.cursor.cy, self.cursor.cx);
        } else {
            self.buffer.join_with_next(self.cursor.cy);
        }
    }

    pub fn enter_search_mode(&mut self) {
        self.search = Some(Search::begin(self.cursor, self.view, self.mode));
        self.mode = Mode::Search;
    }

    /// Re-run the search after the query or direction changed
    pub fn search_update(&mut self, advance: bool) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        if let Some(hit) = search.evaluate(&mut self.buffer, advance) {
            self.cursor = hit;
            // forces the next scroll to put the match at the top
            self.view.row_offset = self.buffer.len_lines();
        }
    }

    pub fn search_push(&mut self, ch: char) {
        if let Some(search) = self.search.as_mut() {
            search.query.push(ch);
        }
        self.search_update(false);
    }

    pub fn search_pop(&mut self) {
        if let Some(search) = self.search.as_mut() {
            search.query.pop();
        }
        self.search_update(false);
    }

    pub fn search_step(&mut self, direction: Direction) {
        if let Some(search) = self.search.as_mut() {
            search.direction = direction;
        }
        self.search_update(true);
    }

    /// Close the prompt; a cancelled search returns to where it started
    pub fn finish_search(&mut self, accept: bool) {
        let Some(mut search) = self.search.take() else {
            return;
        };
        search.restore_highlight(&mut self.buffer);
        if !accept {
            let (cursor, view) = search.origin;
            self.cursor = cursor;
            self.view = view;
        }
        self.mode = search.return_mode;
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search.as_ref().map(|s| s.query.as_str())
    }

    /// Ctrl-Q: quit, after `quit_times` warnings when there are unsaved changes
    pub fn quit_key(&mut self) {
        if self.buffer.dirty && self.quit_countdown > 0 {
            self.set_status(format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                self.quit_countdown
            ));
            self.quit_countdown -= 1;
            return;
        }
        self.should_quit = true;
    }

    pub fn reset_quit_countdown(&mut self) {
        self.quit_countdown = self.settings.editor.quit_times;
    }

    /// :q: refused once while the buffer is dirty; repeating it unchanged quits
    pub fn quit_command(&mut self) -> bool {
        if self.buffer.dirty && self.quit_confirm_version != Some(self.buffer.version()) {
            self.quit_confirm_version = Some(self.buffer.version());
            tracing::debug!("quit refused, unsaved changes");
            return false;
        }
        self.should_quit = true;
        true
    }
}
