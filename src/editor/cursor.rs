/// Cursor position in the buffer (0-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Raw column
    pub cx: usize,
    /// Row
    pub cy: usize,
}

impl Cursor {
    pub fn new(cy: usize, cx: usize) -> Self {
        Self { cx, cy }
    }

    /// Move cursor up by n rows
    pub fn move_up(&mut self, n: usize) {
        self.cy = self.cy.saturating_sub(n);
    }

    /// Set cursor to a specific position
    pub fn set(&mut self, cy: usize, cx: usize) {
        self.cy = cy;
        self.cx = cx;
    }
}

/// Visible window onto the buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row
    pub row_offset: usize,
    /// First visible render column
    pub col_offset: usize,
    /// Number of text rows on screen
    pub rows: usize,
    /// Number of text columns on screen (after the gutter)
    pub cols: usize,
}

impl Viewport {
    /// Scroll so that row `cy` and render column `rx` are visible
    pub fn follow(&mut self, cy: usize, rx: usize) {
        if cy < self.row_offset {
            self.row_offset = cy;
        }
        if self.rows > 0 && cy >= self.row_offset + self.rows {
            self.row_offset = cy + 1 - self.rows;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if self.cols > 0 && rx >= self.col_offset + self.cols {
            self.col_offset = rx + 1 - self.cols;
        }
    }

    /// Put row `cy` in the middle of the screen
    pub fn center_on(&mut self, cy: usize) {
        self.row_offset = cy.saturating_sub(self.rows / 2);
    }
}
