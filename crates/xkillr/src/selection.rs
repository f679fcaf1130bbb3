/// Rows at the top of the viewport that are not process rows.
pub const HEADER_ROWS: usize = 1;

/// Cursor and scroll position over a filtered view, kept inside a viewport of
/// `height` rows (header included).
///
/// After every transition `scroll_offset <= selected < scroll_offset + height`,
/// and both are zero when the view is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    selected: usize,
    scroll_offset: usize,
    height: usize,
}

impl Selection {
    pub fn new(height: usize) -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            height: height.max(1),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Process rows that fit under the header.
    pub fn data_rows(&self) -> usize {
        self.height.saturating_sub(HEADER_ROWS)
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.scroll_offset {
                self.scroll_offset = self.selected;
            }
        }
    }

    pub fn move_down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
            let window = self.window();
            if self.selected >= self.scroll_offset + window {
                self.scroll_offset = self.selected + 1 - window;
            }
        }
    }

    /// Brings the cursor back inside a view that now holds `len` rows.
    pub fn reconcile(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }

        if self.selected >= len {
            self.selected = len - 1;
        }

        let window = self.window();
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + window {
            self.scroll_offset = self.selected + 1 - window;
        }
        // no blank rows below the last process while earlier ones are hidden
        self.scroll_offset = self.scroll_offset.min(len.saturating_sub(window));
    }

    pub fn resize(&mut self, height: usize, len: usize) {
        self.height = height.max(1);
        self.reconcile(len);
    }

    /// Range of view positions that are drawn, given the view length.
    pub fn visible_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.scroll_offset.min(len);
        let end = (start + self.data_rows()).min(len);
        start..end
    }

    // a header-only viewport still keeps the cursor on one logical row
    fn window(&self) -> usize {
        self.data_rows().max(1)
    }
}
