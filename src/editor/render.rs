//! Tab expansion and raw/render column mapping.
//!
//! Raw columns (`cx`) index characters of a line as stored; render columns
//! (`rx`) index the display form where every tab advances to the next
//! multiple of the tab stop.

/// Tab stop used when no configuration overrides it
pub const DEFAULT_TAB_STOP: usize = 2;

/// Maps between raw and render columns for a fixed tab stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabRenderer {
    tab_stop: usize,
}

impl Default for TabRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_STOP)
    }
}

impl TabRenderer {
    /// A tab stop of zero is treated as one
    pub fn new(tab_stop: usize) -> Self {
        Self {
            tab_stop: tab_stop.max(1),
        }
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Width a tab occupies when it starts at render column `rx`
    fn tab_width_at(&self, rx: usize) -> usize {
        self.tab_stop - (rx % self.tab_stop)
    }

    /// Render column of raw column `cx`
    pub fn cx_to_rx(&self, raw: &str, cx: usize) -> usize {
        let mut rx = 0;
        for ch in raw.chars().take(cx) {
            rx += if ch == '\t' { self.tab_width_at(rx) } else { 1 };
        }
        // Columns past the end of the line keep advancing one per column
        rx + cx.saturating_sub(raw.chars().count())
    }

    /// First raw column whose expanded extent passes `rx`.
    ///
    /// Returns the line length when `rx` lies beyond the rendered line.
    pub fn rx_to_cx(&self, raw: &str, rx: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, ch) in raw.chars().enumerate() {
            cur_rx += if ch == '\t' { self.tab_width_at(cur_rx) } else { 1 };
            if cur_rx > rx {
                return cx;
            }
        }
        raw.chars().count()
    }

    /// Display form of a raw line with tabs replaced by spaces
    pub fn expand(&self, raw: &str) -> String {
        let mut render = String::with_capacity(raw.len());
        let mut rx = 0;
        for ch in raw.chars() {
            if ch == '\t' {
                let width = self.tab_width_at(rx);
                render.extend(std::iter::repeat(' ').take(width));
                rx += width;
            } else {
                render.push(ch);
                rx += 1;
            }
        }
        render
    }
}
