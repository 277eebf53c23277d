//! Incremental search state.
//!
//! The overlay a search paints is transient: the tags it covers are cached
//! and put back before every new evaluation and when the prompt closes.

use super::buffer::Buffer;
use super::cursor::{Cursor, Viewport};
use super::Mode;
use crate::syntax::Highlight;

/// Search direction through the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// State of an active search prompt
#[derive(Debug, Clone)]
pub struct Search {
    pub query: String,
    pub direction: Direction,
    /// Row of the last match, if any
    pub last_match: Option<usize>,
    /// Cursor and viewport when the prompt opened
    pub origin: (Cursor, Viewport),
    /// Mode to go back to when the prompt closes
    pub return_mode: Mode,
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

impl Search {
    pub fn begin(cursor: Cursor, viewport: Viewport, return_mode: Mode) -> Self {
        Self {
            query: String::new(),
            direction: Direction::Forward,
            last_match: None,
            origin: (cursor, viewport),
            return_mode,
            saved_hl: None,
        }
    }

    /// Put back the tags hidden under the match overlay
    pub fn restore_highlight(&mut self, buffer: &mut Buffer) {
        if let Some((row, hl)) = self.saved_hl.take() {
            buffer.restore_hl(row, hl);
        }
    }

    /// Look for the query and overlay the match.
    ///
    /// With `advance` the search starts on the row after (or before) the last
    /// match; otherwise the last match row (or the origin row) is included.
    /// Returns the cursor position of the match.
    pub fn evaluate(&mut self, buffer: &mut Buffer, advance: bool) -> Option<Cursor> {
        self.restore_highlight(buffer);
        if self.query.is_empty() {
            return None;
        }

        let needle: Vec<char> = self.query.chars().collect();
        let start = self.last_match.unwrap_or(self.origin.0.cy);
        let advance = advance && self.last_match.is_some();
        let (row, rx) = find_match(buffer, &needle, start, self.direction, advance)?;

        let line = buffer.line(row)?;
        let cx = buffer.renderer().rx_to_cx(line.raw(), rx);
        self.saved_hl = Some((row, line.hl().to_vec()));
        self.last_match = Some(row);
        buffer.overlay(row, rx, rx + needle.len(), Highlight::Match);
        Some(Cursor::new(row, cx))
    }
}

/// Case-insensitive position of `needle` in a render line
pub fn find_in_render(render: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > render.len() {
        return None;
    }
    render.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
    })
}

/// Visit every row once, wrapping around, and return the first hit as (row, rx)
fn find_match(
    buffer: &Buffer,
    needle: &[char],
    start: usize,
    direction: Direction,
    skip_start: bool,
) -> Option<(usize, usize)> {
    let total = buffer.len_lines();
    let start = start.min(total - 1);
    let first = usize::from(skip_start);

    (first..first + total).find_map(|step| {
        let step = step % total;
        let row = match direction {
            Direction::Forward => (start + step) % total,
            Direction::Backward => (start + total - step) % total,
        };
        let line = buffer.line(row)?;
        find_in_render(line.render(), needle).map(|rx| (row, rx))
    })
}
