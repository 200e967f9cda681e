//! Focus and Scroll State for list panels
//!
//! Every scrollable panel owns one [`ScrollState`]; ranked lists that only
//! move a cursor own a [`SelectionState`]. Both clamp on every transition, so
//! the invariants hold no matter which events arrive or in what order:
//!
//! - `0 <= scroll_offset <= max(0, content_height - viewport_height)`
//! - `0 <= selected_index < item_count` (or `0` when the list is empty)

/// Events accepted by a [`ScrollState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    /// Panel hotkey pressed
    ToggleFocus,
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    /// Terminal resized or content changed
    Remeasure {
        viewport_height: usize,
        content_height: usize,
    },
}

/// Focus + scroll offset for one panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    focused: bool,
    scroll_offset: usize,
    viewport_height: usize,
    content_height: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            focused: false,
            scroll_offset: 0,
            viewport_height: 1,
            content_height: 0,
        }
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn content_height(&self) -> usize {
        self.content_height
    }

    /// Largest offset that still fills the viewport
    pub fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Apply an event. Scroll events are ignored while unfocused.
    ///
    /// Returns true when the visible state changed.
    pub fn apply(&mut self, event: ScrollEvent) -> bool {
        let before = self.clone();
        match event {
            ScrollEvent::ToggleFocus => self.focused = !self.focused,
            ScrollEvent::Remeasure {
                viewport_height,
                content_height,
            } => {
                self.viewport_height = viewport_height.max(1);
                self.content_height = content_height;
                self.clamp();
            }
            ScrollEvent::ScrollUp(n) if self.focused => self.scroll_by(-(n as isize)),
            ScrollEvent::ScrollDown(n) if self.focused => self.scroll_by(n as isize),
            ScrollEvent::PageUp if self.focused => self.scroll_by(-(self.viewport_height as isize)),
            ScrollEvent::PageDown if self.focused => self.scroll_by(self.viewport_height as isize),
            _ => {}
        }
        *self != before
    }

    /// Range of content rows currently visible
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let end = (self.scroll_offset + self.viewport_height).min(self.content_height);
        self.scroll_offset.min(end)..end
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = if delta < 0 {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta as usize)
        };
        self.clamp();
    }

    fn clamp(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_offset());
    }
}

/// Events accepted by a [`SelectionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Up,
    Down,
    JumpFirst,
    JumpLast,
}

/// Cursor over a ranked list (no focus gating)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected_index: usize,
    item_count: usize,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Update the list length after a refresh, keeping the cursor in range
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.clamp();
    }

    pub fn apply(&mut self, event: SelectionEvent) {
        self.selected_index = match event {
            SelectionEvent::Up => self.selected_index.saturating_sub(1),
            SelectionEvent::Down => self.selected_index.saturating_add(1),
            SelectionEvent::JumpFirst => 0,
            SelectionEvent::JumpLast => self.item_count.saturating_sub(1),
        };
        self.clamp();
    }

    fn clamp(&mut self) {
        self.selected_index = self.selected_index.min(self.item_count.saturating_sub(1));
    }
}
