pub mod box_score;
pub mod event_feed;
pub mod lookup;
pub mod scoreboard;
