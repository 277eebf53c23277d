use super::render::TabRenderer;
use crate::syntax::Highlight;

/// One document line with its derived display form and highlight tags.
///
/// A line has no stored index; its position in the buffer is its index.
#[derive(Debug, Clone, Default)]
pub struct Line {
    raw: String,
    render: Vec<char>,
    hl: Vec<Highlight>,
    open_comment: bool,
}

impl Line {
    /// A line whose render and tags are not computed yet
    pub(super) fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Self::default()
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Length in raw columns
    pub fn len(&self) -> usize {
        self.raw.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn render(&self) -> &[char] {
        &self.render
    }

    pub fn hl(&self) -> &[Highlight] {
        &self.hl
    }

    /// Whether the line ends inside a block comment
    pub fn open_comment(&self) -> bool {
        self.open_comment
    }

    pub fn char_at(&self, cx: usize) -> Option<char> {
        self.raw.chars().nth(cx)
    }

    /// Leading spaces and tabs
    pub fn indent(&self) -> &str {
        let end = self
            .raw
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(self.raw.len());
        &self.raw[..end]
    }

    /// Byte offset of raw column `cx`, clamped to the end of the line
    fn byte_index(&self, cx: usize) -> usize {
        self.raw
            .char_indices()
            .nth(cx)
            .map(|(idx, _)| idx)
            .unwrap_or(self.raw.len())
    }

    pub(super) fn insert_char(&mut self, cx: usize, ch: char) {
        let idx = self.byte_index(cx);
        self.raw.insert(idx, ch);
    }

    pub(super) fn insert_str(&mut self, cx: usize, text: &str) {
        let idx = self.byte_index(cx);
        self.raw.insert_str(idx, text);
    }

    pub(super) fn remove_char(&mut self, cx: usize) -> Option<char> {
        if cx >= self.len() {
            return None;
        }
        let idx = self.byte_index(cx);
        Some(self.raw.remove(idx))
    }

    pub(super) fn replace_char(&mut self, cx: usize, ch: char) -> bool {
        if cx >= self.len() {
            return false;
        }
        let idx = self.byte_index(cx);
        let end = self.byte_index(cx + 1);
        self.raw.replace_range(idx..end, ch.encode_utf8(&mut [0; 4]));
        true
    }

    pub(super) fn push_str(&mut self, text: &str) {
        self.raw.push_str(text);
    }

    /// Split at raw column `cx`, keeping the head and returning the tail
    pub(super) fn split_off(&mut self, cx: usize) -> String {
        let idx = self.byte_index(cx);
        self.raw.split_off(idx)
    }

    /// Remove raw columns `start..end`, returning the removed text
    pub(super) fn drain(&mut self, start: usize, end: usize) -> String {
        let start = self.byte_index(start);
        let end = self.byte_index(end).max(start);
        self.raw.drain(start..end).collect()
    }

    pub(super) fn update_render(&mut self, renderer: &TabRenderer) {
        self.render = renderer.expand(&self.raw).chars().collect();
    }

    /// Install structural tags, returning whether the carried comment state changed
    pub(super) fn set_highlight(&mut self, hl: Vec<Highlight>, open_comment: bool) -> bool {
        self.hl = hl;
        let changed = self.open_comment != open_comment;
        self.open_comment = open_comment;
        changed
    }

    /// Replace the tags wholesale (used to restore a cached copy)
    pub(super) fn restore_hl(&mut self, hl: Vec<Highlight>) {
        if hl.len() == self.render.len() {
            self.hl = hl;
        }
    }

    /// Paint `tag` over render columns `start..end`, clamped to the line
    pub(super) fn overlay(&mut self, start: usize, end: usize, tag: Highlight) {
        let end = end.min(self.hl.len());
        if start < end {
            self.hl[start..end].fill(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_use_char_columns() {
        let mut line = Line::new("héllo");
        line.insert_char(2, 'x');
        assert_eq!(line.raw(), "héxllo");
        assert_eq!(line.remove_char(1), Some('é'));
        assert_eq!(line.raw(), "hxllo");
        assert_eq!(line.remove_char(10), None);
    }

    #[test]
    fn test_split_and_drain() {
        let mut line = Line::new("foo(bar)");
        assert_eq!(line.drain(4, 7), "bar");
        assert_eq!(line.raw(), "foo()");
        let tail = line.split_off(3);
        assert_eq!(line.raw(), "foo");
        assert_eq!(tail, "()");
    }

    #[test]
    fn test_indent() {
        assert_eq!(Line::new("\t  x = 1").indent(), "\t  ");
        assert_eq!(Line::new("   ").indent(), "   ");
        assert_eq!(Line::new("x").indent(), "");
    }

    #[test]
    fn test_overlay_is_clamped() {
        let mut line = Line::new("abc");
        line.update_render(&TabRenderer::new(4));
        line.set_highlight(vec![Highlight::Normal; 3], false);
        line.overlay(1, 10, Highlight::Match);
        assert_eq!(line.hl(), &[Highlight::Normal, Highlight::Match, Highlight::Match]);
        line.overlay(5, 8, Highlight::Visual);
        assert_eq!(line.hl().len(), 3);
    }
}
