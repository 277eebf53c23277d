use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::file;
use super::line::Line;
use super::render::TabRenderer;
use crate::error::Result;
use crate::syntax::{highlight_line, select_profile, Highlight, SyntaxProfile};

/// The document: an ordered sequence of lines.
///
/// All row/column arguments are clamped rather than rejected. The buffer
/// always holds at least one line, and every mutation re-renders and
/// re-highlights the touched lines before returning.
#[derive(Debug, Clone)]
pub struct Buffer {
    lines: Vec<Line>,
    /// File path (None if unsaved new buffer)
    pub path: Option<PathBuf>,
    /// Whether the buffer has unsaved changes
    pub dirty: bool,
    /// Monotonic version for change tracking
    version: u64,
    renderer: TabRenderer,
    syntax: Option<&'static SyntaxProfile>,
    /// The document has no lines; the single empty line is only there to edit into
    placeholder: bool,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_lines(Vec::<String>::new())
    }

    /// Create a buffer holding the given lines, not marked dirty
    pub fn from_lines<S: Into<String>>(lines: Vec<S>) -> Self {
        let mut lines: Vec<Line> = lines.into_iter().map(|l| Line::new(l)).collect();
        let placeholder = lines.is_empty();
        if placeholder {
            lines.push(Line::new(""));
        }
        let mut buffer = Self {
            lines,
            path: None,
            dirty: false,
            version: 0,
            renderer: TabRenderer::default(),
            syntax: None,
            placeholder,
        };
        buffer.refresh_all();
        buffer
    }

    /// Create a buffer from a file; a missing file gives an empty buffer bound to `path`
    pub fn from_file(path: PathBuf) -> Result<Self> {
        let lines = file::load_lines(&path)?;
        tracing::info!(path = %path.display(), lines = lines.len(), "file opened");
        let mut buffer = Self::from_lines(lines);
        buffer.set_path(path);
        Ok(buffer)
    }

    /// Save buffer to its file path, returning the number of bytes written
    pub fn save(&mut self) -> Result<usize> {
        let path = self.path.clone().ok_or(crate::Error::NoFileName)?;
        let bytes = file::write_content(&path, &self.content())?;
        tracing::info!(path = %path.display(), bytes, "file saved");
        self.dirty = false;
        Ok(bytes)
    }

    /// Bind the buffer to a new path and pick its language profile
    pub fn set_path(&mut self, path: PathBuf) {
        self.set_syntax(select_profile(&path));
        self.path = Some(path);
    }

    /// File name for the status bar
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "[No Name]".to_string())
    }

    pub fn syntax(&self) -> Option<&'static SyntaxProfile> {
        self.syntax
    }

    pub fn set_syntax(&mut self, syntax: Option<&'static SyntaxProfile>) {
        self.syntax = syntax;
        self.refresh_all();
    }

    pub fn renderer(&self) -> TabRenderer {
        self.renderer
    }

    pub fn set_tab_stop(&mut self, tab_stop: usize) {
        self.renderer = TabRenderer::new(tab_stop);
        self.refresh_all();
    }

    /// Get total number of lines
    pub fn len_lines(&self) -> usize {
        self.lines.len()
    }

    /// Get a specific line (0-indexed)
    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Get the length of a specific line in raw columns
    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx).map(Line::len).unwrap_or(0)
    }

    pub fn char_at(&self, row: usize, col: usize) -> Option<char> {
        self.line(row).and_then(|l| l.char_at(col))
    }

    /// Get the current version of the buffer
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Every line followed by a newline, as written to disk.
    /// A document with no lines is written as an empty file.
    pub fn content(&self) -> String {
        let mut out = String::new();
        if self.placeholder {
            return out;
        }
        for line in &self.lines {
            out.push_str(line.raw());
            out.push('\n');
        }
        out
    }

    fn clamp_row(&self, row: usize) -> usize {
        row.min(self.lines.len() - 1)
    }

    fn touch(&mut self) {
        self.placeholder = false;
        self.dirty = true;
        self.version = self.version.wrapping_add(1);
    }

    /// Insert a new line so that it ends up at index `at`
    pub fn insert_line(&mut self, at: usize, text: &str) {
        let at = at.min(self.lines.len());
        let mut line = Line::new(text);
        line.update_render(&self.renderer);
        self.lines.insert(at, line);
        self.touch();
        self.rehighlight(&[at, at + 1]);
    }

    /// Remove line `at`, returning its raw content.
    ///
    /// Removing the only line leaves a single empty line behind.
    pub fn delete_line(&mut self, at: usize) -> Option<String> {
        if at >= self.lines.len() {
            return None;
        }
        let removed = self.lines.remove(at);
        self.touch();
        if self.lines.is_empty() {
            let mut line = Line::new("");
            line.update_render(&self.renderer);
            self.lines.push(line);
            self.placeholder = true;
        }
        self.rehighlight(&[at.min(self.lines.len() - 1)]);
        Some(removed.raw().to_string())
    }

    /// Insert a character at the given line and column
    pub fn insert_char(&mut self, row: usize, col: usize, ch: char) {
        let row = self.clamp_row(row);
        let col = col.min(self.line_len(row));
        self.lines[row].insert_char(col, ch);
        self.refresh_line(row);
    }

    /// Insert text (without newlines) at the given line and column
    pub fn insert_str(&mut self, row: usize, col: usize, text: &str) {
        let row = self.clamp_row(row);
        let col = col.min(self.line_len(row));
        self.lines[row].insert_str(col, text);
        self.refresh_line(row);
    }

    /// Delete the character at the given line and column
    pub fn delete_char(&mut self, row: usize, col: usize) -> Option<char> {
        if row >= self.lines.len() {
            return None;
        }
        let removed = self.lines[row].remove_char(col)?;
        self.refresh_line(row);
        Some(removed)
    }

    /// Overwrite the character at the given position; no-op past the end
    pub fn replace_char(&mut self, row: usize, col: usize, ch: char) -> bool {
        if row >= self.lines.len() || !self.lines[row].replace_char(col, ch) {
            return false;
        }
        self.refresh_line(row);
        true
    }

    /// Delete raw columns `start..end` of a line, returning the removed text
    pub fn delete_range(&mut self, row: usize, start: usize, end: usize) -> String {
        if row >= self.lines.len() || start >= end {
            return String::new();
        }
        let removed = self.lines[row].drain(start, end);
        if !removed.is_empty() {
            self.refresh_line(row);
        }
        removed
    }

    pub fn append_text(&mut self, row: usize, text: &str) {
        let row = self.clamp_row(row);
        self.lines[row].push_str(text);
        self.refresh_line(row);
    }

    /// Break a line at `col`; the tail becomes a new line below
    pub fn split_line(&mut self, row: usize, col: usize) {
        let row = self.clamp_row(row);
        let col = col.min(self.line_len(row));
        let tail = self.lines[row].split_off(col);
        self.lines[row].update_render(&self.renderer);
        let mut line = Line::new(tail);
        line.update_render(&self.renderer);
        self.lines.insert(row + 1, line);
        self.touch();
        self.rehighlight(&[row, row + 1, row + 2]);
    }

    /// Merge the next line onto the end of `row`; false if `row` is the last line
    pub fn join_with_next(&mut self, row: usize) -> bool {
        if row + 1 >= self.lines.len() {
            return false;
        }
        let next = self.lines.remove(row + 1);
        self.lines[row].push_str(next.raw());
        self.lines[row].update_render(&self.renderer);
        self.touch();
        self.rehighlight(&[row, row + 1]);
        true
    }

    /// Re-run the scanner on rows whose tags were overlaid, clearing the overlay
    pub fn clear_overlays(&mut self, rows: impl IntoIterator<Item = usize>) {
        let rows: Vec<usize> = rows.into_iter().collect();
        self.rehighlight(&rows);
    }

    /// Paint a transient overlay over render columns of a line
    pub fn overlay(&mut self, row: usize, start: usize, end: usize, tag: Highlight) {
        if let Some(line) = self.lines.get_mut(row) {
            line.overlay(start, end, tag);
        }
    }

    /// Put back tags previously copied from [`Line::hl`]
    pub fn restore_hl(&mut self, row: usize, hl: Vec<Highlight>) {
        if let Some(line) = self.lines.get_mut(row) {
            line.restore_hl(hl);
        }
    }

    fn refresh_line(&mut self, row: usize) {
        self.lines[row].update_render(&self.renderer);
        self.touch();
        self.rehighlight(&[row]);
    }

    fn refresh_all(&mut self) {
        for line in &mut self.lines {
            line.update_render(&self.renderer);
        }
        let rows: Vec<usize> = (0..self.lines.len()).collect();
        self.rehighlight(&rows);
    }

    /// Highlight the seed rows, then keep going downwards while the
    /// carried block-comment state changes.
    fn rehighlight(&mut self, seeds: &[usize]) {
        let total = self.lines.len();
        let mut pending: VecDeque<usize> = seeds.iter().copied().filter(|&r| r < total).collect();
        let mut scanned = 0usize;

        while let Some(row) = pending.pop_front() {
            scanned += 1;
            if self.highlight_row(row) && row + 1 < total && !pending.contains(&(row + 1)) {
                pending.push_back(row + 1);
            }
        }

        if scanned > seeds.len() {
            tracing::trace!(seeds = seeds.len(), scanned, "highlight cascade");
        }
    }

    fn highlight_row(&mut self, row: usize) -> bool {
        let starts_in_comment = row > 0 && self.lines[row - 1].open_comment();
        let line = &mut self.lines[row];
        let (hl, open) = highlight_line(line.render(), self.syntax, starts_in_comment);
        line.set_highlight(hl, open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::HLDB;
    use proptest::prelude::*;

    fn c_buffer(lines: &[&str]) -> Buffer {
        let mut buffer = Buffer::from_lines(lines.to_vec());
        buffer.set_syntax(HLDB.iter().find(|p| p.filetype == "C"));
        buffer
    }

    fn raw_lines(buffer: &Buffer) -> Vec<String> {
        buffer.lines().map(|l| l.raw().to_string()).collect()
    }

    fn all(buffer: &Buffer, row: usize, tag: Highlight) -> bool {
        buffer.line(row).unwrap().hl().iter().all(|h| *h == tag)
    }

    #[test]
    fn test_new_buffer_has_one_empty_line() {
        let buffer = Buffer::new();
        assert_eq!(buffer.len_lines(), 1);
        assert_eq!(buffer.line_len(0), 0);
        assert!(!buffer.dirty);
    }

    #[test]
    fn test_insert_and_delete_lines_shift_indices() {
        let mut buffer = Buffer::from_lines(vec!["a", "b", "c"]);
        buffer.insert_line(1, "x");
        assert_eq!(raw_lines(&buffer), vec!["a", "x", "b", "c"]);
        assert_eq!(buffer.delete_line(0), Some("a".to_string()));
        assert_eq!(raw_lines(&buffer), vec!["x", "b", "c"]);
        assert!(buffer.dirty);
    }

    #[test]
    fn test_positions_are_clamped() {
        let mut buffer = Buffer::from_lines(vec!["ab"]);
        buffer.insert_line(99, "end");
        buffer.insert_char(0, 99, '!');
        buffer.insert_char(42, 0, '>');
        assert_eq!(raw_lines(&buffer), vec!["ab!", ">end"]);
        assert_eq!(buffer.delete_char(7, 0), None);
        assert_eq!(buffer.delete_char(0, 7), None);
        assert_eq!(buffer.delete_line(5), None);
    }

    #[test]
    fn test_deleting_last_line_leaves_empty_line() {
        let mut buffer = Buffer::from_lines(vec!["only"]);
        assert_eq!(buffer.delete_line(0), Some("only".to_string()));
        assert_eq!(buffer.len_lines(), 1);
        assert_eq!(buffer.line_len(0), 0);
    }

    #[test]
    fn test_split_and_join() {
        let mut buffer = Buffer::from_lines(vec!["hello world"]);
        buffer.split_line(0, 5);
        assert_eq!(raw_lines(&buffer), vec!["hello", " world"]);
        assert!(buffer.join_with_next(0));
        assert_eq!(raw_lines(&buffer), vec!["hello world"]);
        assert!(!buffer.join_with_next(0));
    }

    #[test]
    fn test_content_terminates_every_line() {
        let buffer = Buffer::from_lines(vec!["a", "", "b"]);
        assert_eq!(buffer.content(), "a\n\nb\n");
    }

    #[test]
    fn test_empty_file_saves_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();
        let mut buffer = Buffer::from_file(path.clone()).unwrap();
        assert_eq!(buffer.len_lines(), 1);
        assert_eq!(buffer.save().unwrap(), 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"");

        // a file holding one empty line keeps its newline
        std::fs::write(&path, b"\n").unwrap();
        let mut buffer = Buffer::from_file(path.clone()).unwrap();
        buffer.save().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"\n");
    }

    #[test]
    fn test_content_tracks_placeholder_line() {
        let mut buffer = Buffer::new();
        assert_eq!(buffer.content(), "");
        buffer.insert_char(0, 0, 'a');
        assert_eq!(buffer.content(), "a\n");
        buffer.delete_char(0, 0);
        assert_eq!(buffer.content(), "\n");
        buffer.delete_line(0);
        assert_eq!(buffer.content(), "");
    }

    #[test]
    fn test_version_bumps_on_mutation() {
        let mut buffer = Buffer::from_lines(vec!["a"]);
        let v = buffer.version();
        buffer.append_text(0, "bc");
        assert!(buffer.version() > v);
        assert_eq!(buffer.line(0).unwrap().raw(), "abc");
    }

    #[test]
    fn test_block_comment_cascade_across_lines() {
        let buffer = c_buffer(&["int a = 1; /* start", "still comment", "end */ int b;"]);
        assert!(all(&buffer, 1, Highlight::MlComment));
        let last = buffer.line(2).unwrap().hl();
        assert!(last[..6].iter().all(|h| *h == Highlight::MlComment));
        assert_eq!(last[6], Highlight::Normal);
        assert_eq!(&last[7..10], &[Highlight::Keyword2; 3]);
    }

    #[test]
    fn test_opening_comment_cascades_down() {
        let mut buffer = c_buffer(&["int a;", "int b;", "int c;", "int d; */ int e;"]);
        assert!(!all(&buffer, 2, Highlight::MlComment));

        buffer.insert_str(0, 6, " /*");
        assert!(all(&buffer, 1, Highlight::MlComment));
        assert!(all(&buffer, 2, Highlight::MlComment));
        assert_eq!(buffer.line(3).unwrap().hl()[12], Highlight::Keyword2);

        // closing it again un-comments the following lines
        buffer.delete_range(0, 6, 9);
        assert_eq!(buffer.line(1).unwrap().hl()[0], Highlight::Keyword2);
        assert_eq!(buffer.line(2).unwrap().hl()[0], Highlight::Keyword2);
    }

    #[test]
    fn test_deleting_opener_line_reflows() {
        let mut buffer = c_buffer(&["/*", "int x;", "*/"]);
        assert!(all(&buffer, 1, Highlight::MlComment));
        buffer.delete_line(0);
        assert_eq!(buffer.line(0).unwrap().hl()[0], Highlight::Keyword2);
    }

    #[test]
    fn test_overlay_cleared_by_rehighlight() {
        let mut buffer = c_buffer(&["int foo;"]);
        let before = buffer.line(0).unwrap().hl().to_vec();
        buffer.overlay(0, 4, 7, Highlight::Match);
        assert_eq!(buffer.line(0).unwrap().hl()[5], Highlight::Match);
        buffer.clear_overlays([0]);
        assert_eq!(buffer.line(0).unwrap().hl(), &before[..]);
    }

    #[test]
    fn test_tab_stop_change_rerenders() {
        let mut buffer = Buffer::from_lines(vec!["\tx"]);
        assert_eq!(buffer.line(0).unwrap().render().len(), 3);
        buffer.set_tab_stop(8);
        assert_eq!(buffer.line(0).unwrap().render().len(), 9);
        assert_eq!(buffer.line(0).unwrap().hl().len(), 9);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.c");
        let mut buffer = Buffer::from_file(path.clone()).unwrap();
        assert_eq!(buffer.len_lines(), 1);
        assert_eq!(buffer.syntax().map(|p| p.filetype), Some("C"));

        buffer.delete_line(0);
        buffer.insert_line(0, "\tint x;  ");
        buffer.insert_line(1, "  \t\ttrailing\t ");
        buffer.delete_line(2);
        let written = buffer.save().unwrap();
        assert!(!buffer.dirty);

        let original = std::fs::read(&path).unwrap();
        assert_eq!(written, original.len());

        let mut reloaded = Buffer::from_file(path.clone()).unwrap();
        assert_eq!(raw_lines(&reloaded), raw_lines(&buffer));
        reloaded.save().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut buffer = Buffer::from_lines(vec!["x"]);
        assert!(matches!(buffer.save(), Err(crate::Error::NoFileName)));
    }

    #[derive(Debug, Clone)]
    enum Edit {
        InsertLine(usize, String),
        DeleteLine(usize),
        InsertChar(usize, usize, char),
        DeleteChar(usize, usize),
        Split(usize, usize),
        Join(usize),
    }

    fn edit_strategy() -> impl Strategy<Value = Edit> {
        let text = "[a-z \t/*\"{}0-9]{0,12}";
        let ch = prop_oneof![Just('\t'), Just('/'), Just('*'), Just('"'), Just('a'), Just(' ')];
        prop_oneof![
            (0usize..8, text).prop_map(|(at, t)| Edit::InsertLine(at, t)),
            (0usize..8).prop_map(Edit::DeleteLine),
            (0usize..8, 0usize..16, ch).prop_map(|(r, c, ch)| Edit::InsertChar(r, c, ch)),
            (0usize..8, 0usize..16).prop_map(|(r, c)| Edit::DeleteChar(r, c)),
            (0usize..8, 0usize..16).prop_map(|(r, c)| Edit::Split(r, c)),
            (0usize..8).prop_map(Edit::Join),
        ]
    }

    proptest! {
        #[test]
        fn derived_state_stays_consistent(edits in proptest::collection::vec(edit_strategy(), 0..30)) {
            let mut buffer = c_buffer(&["int a; /* x", "y */ b"]);
            for edit in edits {
                match edit {
                    Edit::InsertLine(at, t) => buffer.insert_line(at, &t),
                    Edit::DeleteLine(at) => { buffer.delete_line(at); }
                    Edit::InsertChar(r, c, ch) => buffer.insert_char(r, c, ch),
                    Edit::DeleteChar(r, c) => { buffer.delete_char(r, c); }
                    Edit::Split(r, c) => buffer.split_line(r, c),
                    Edit::Join(r) => { buffer.join_with_next(r); }
                }
            }

            prop_assert!(buffer.len_lines() >= 1);
            let renderer = buffer.renderer();
            let mut open = false;
            for line in buffer.lines() {
                let expected = renderer.expand(line.raw());
                prop_assert_eq!(line.render().iter().collect::<String>(), expected);
                prop_assert_eq!(line.hl().len(), line.render().len());
                // cascade leaves every line as a fresh scan would
                let (hl, next_open) = highlight_line(line.render(), buffer.syntax(), open);
                prop_assert_eq!(line.hl(), &hl[..]);
                prop_assert_eq!(line.open_comment(), next_open);
                open = next_open;
            }
        }
    }
}
