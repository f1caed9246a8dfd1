use crate::app::MenuItem;
use hoopcast_engine::Side;

// ---------------------------------------------------------------------------
// Play-by-play feed state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FeedState {
    /// Rows scrolled back from the newest event; 0 follows the live edge.
    pub scroll_offset: u16,
}

impl FeedState {
    pub fn scroll_back(&mut self, visible_events: usize) {
        let max = visible_events.saturating_sub(1) as u16;
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn scroll_forward(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Box score state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct BoxScoreState {
    pub side: Side,
}

impl Default for BoxScoreState {
    fn default() -> Self {
        Self { side: Side::Home }
    }
}

impl BoxScoreState {
    pub fn toggle_side(&mut self) {
        self.side = self.side.opponent();
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    /// One-line notice shown under the scoreboard, e.g. a rejected command.
    pub status_message: Option<String>,
    pub feed: FeedState,
    pub box_score: BoxScoreState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
