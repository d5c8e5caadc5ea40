//! Page flow controller
//!
//! Owns the vertical cursor for one render. The assembler asks it whether
//! the next block fits, and it tracks which page is being filled.

/// Position of the flow on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Only the page header block has been drawn
    AtTop,
    /// Column headers or rows are on the page
    MidPage,
    /// The next block does not fit; a new page must be started
    NeedsBreak,
}

/// Tolerance for floating-point comparisons against the body bottom
const EPSILON: f64 = 1e-6;

/// Vertical cursor and page bookkeeping
#[derive(Debug, Clone)]
pub struct FlowController {
    /// First y below the page header block
    body_top: f64,
    /// Last y usable for body content (above the footer reserve)
    body_bottom: f64,
    cursor: f64,
    state: FlowState,
    page: usize,
    rows_on_page: usize,
}

impl FlowController {
    /// Create a controller; no page is open until [`start_page`](Self::start_page)
    pub fn new(body_top: f64, body_bottom: f64) -> Self {
        Self {
            body_top,
            body_bottom,
            cursor: body_top,
            state: FlowState::NeedsBreak,
            page: 0,
            rows_on_page: 0,
        }
    }

    /// Begin filling `page`, cursor just below the header block
    pub fn start_page(&mut self, page: usize) {
        self.page = page;
        self.cursor = self.body_top;
        self.state = FlowState::AtTop;
        self.rows_on_page = 0;
        log::debug!("Page {page} started, body {:.2}..{:.2}", self.body_top, self.body_bottom);
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Current page number, 0 before the first page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Data rows placed since the page started
    pub fn rows_on_page(&self) -> usize {
        self.rows_on_page
    }

    /// Body height of an empty page
    pub fn capacity(&self) -> f64 {
        self.body_bottom - self.body_top
    }

    /// Space left below the cursor
    pub fn remaining(&self) -> f64 {
        (self.body_bottom - self.cursor).max(0.0)
    }

    pub fn fits(&self, height: f64) -> bool {
        self.page > 0 && self.cursor + height <= self.body_bottom + EPSILON
    }

    /// Decide whether a block of `height` can be drawn on this page
    ///
    /// Moves to [`FlowState::NeedsBreak`] when it cannot.
    pub fn check(&mut self, height: f64) -> FlowState {
        if !self.fits(height) {
            self.state = FlowState::NeedsBreak;
        }
        self.state
    }

    /// Reserve `height` at the cursor and return its top y
    pub fn advance(&mut self, height: f64) -> f64 {
        let top = self.cursor;
        self.cursor += height;
        top
    }

    /// Column headers are on the page; rows may follow
    pub fn headers_drawn(&mut self, height: f64) -> f64 {
        let top = self.advance(height);
        self.state = FlowState::MidPage;
        top
    }

    /// Place a data row and return its top y
    pub fn place_row(&mut self, height: f64) -> f64 {
        let top = self.advance(height);
        self.rows_on_page += 1;
        self.state = FlowState::MidPage;
        top
    }
}
