use crate::components::lookup::{abbreviation, player_name, quarter_label};
use hoopcast_engine::{EventKind, GameEvent, GameRecord, ReboundType, ShotType, Side};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget};

/// Broadcast-style text for one play.
pub fn describe(event: &GameEvent, record: &GameRecord) -> String {
    let name = |id: &str| player_name(record, id);
    let actor = event.player_id.as_deref().map(name).unwrap_or_else(|| "Unknown".to_string());

    match &event.kind {
        EventKind::TipOff => match (&event.player_id, event.side) {
            (Some(_), Some(side)) => {
                format!("{actor} wins the tip for {}", abbreviation(record, side))
            }
            _ => "Tip-off".to_string(),
        },
        EventKind::ShotMade { points, shot_type, assist_player_id } => {
            let shot = match shot_type {
                ShotType::ThreePoint => format!("{actor} drains a three-pointer"),
                ShotType::Inside => format!("{actor} scores in the paint"),
                ShotType::Midrange => format!("{actor} knocks down the jumper"),
                ShotType::Unknown => format!("{actor} scores {points}"),
            };
            match assist_player_id {
                Some(passer) => format!("{shot} (assist: {})", name(passer)),
                None => shot,
            }
        }
        EventKind::ShotMissed { shot_type } => match shot_type {
            ShotType::ThreePoint => format!("{actor} misses from deep"),
            ShotType::Inside => format!("{actor} misses at the rim"),
            ShotType::Midrange => format!("{actor} misses the jumper"),
            ShotType::Unknown => format!("{actor} misses"),
        },
        EventKind::FreeThrow { made, number, total } => {
            let verb = if *made { "makes" } else { "misses" };
            format!("{actor} {verb} free throw {number} of {total}")
        }
        EventKind::Rebound { rebound_type } => match rebound_type {
            ReboundType::Offensive => format!("{actor} grabs the offensive rebound"),
            ReboundType::Defensive => format!("{actor} pulls down the defensive rebound"),
        },
        EventKind::Turnover { steal_player_id } => match steal_player_id {
            Some(thief) => format!("{actor} turns it over, stolen by {}", name(thief)),
            None => format!("{actor} turns it over"),
        },
        EventKind::Substitution { player_in_id, player_out_id } => {
            let team = event.side.map(|side| abbreviation(record, side)).unwrap_or("Team");
            match (player_in_id, player_out_id) {
                (Some(on), Some(off)) => {
                    format!("{team} substitution: {} in for {}", name(on), name(off))
                }
                (Some(on), None) => format!("{team} substitution: {} checks in", name(on)),
                _ => format!("{team} substitution"),
            }
        }
        EventKind::QuarterEnd { quarter, scores } => format!(
            "End of {}: {} {} - {} {}",
            quarter_label(*quarter),
            abbreviation(record, Side::Home),
            scores.home,
            abbreviation(record, Side::Away),
            scores.away
        ),
        EventKind::GameOver { scores, .. } => match scores.leader() {
            Some(winner) => format!(
                "Final: {} win {}-{}",
                record.team(winner).name,
                scores.get(winner),
                scores.get(winner.opponent())
            ),
            None => format!("Final: tied {}-{}", scores.home, scores.away),
        },
        EventKind::Other(kind) => kind.replace('_', " "),
    }
}

/// Play-by-play, newest first. `scroll` skips that many of the newest rows.
pub struct EventFeed<'a> {
    pub record: &'a GameRecord,
    pub events: &'a [GameEvent],
    pub scroll: u16,
    pub home_color: Color,
    pub away_color: Color,
}

impl<'a> Widget for EventFeed<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let newest = self.events.len().saturating_sub(1);
        let lines: Vec<Line> = self
            .events
            .iter()
            .enumerate()
            .rev()
            .skip(self.scroll as usize)
            .take(area.height as usize)
            .map(|(idx, event)| {
                let team_style = match event.side {
                    Some(Side::Home) => Style::default().fg(self.home_color),
                    Some(Side::Away) => Style::default().fg(self.away_color),
                    None => Style::default().fg(Color::DarkGray),
                };
                let mut text_style = Style::default().fg(Color::White);
                if idx == newest {
                    text_style = text_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                }
                if event.kind.is_quarter_end() || event.kind.is_game_over() {
                    text_style = text_style.add_modifier(Modifier::REVERSED);
                }

                let clock = format!("{:>3} {:>5} ", quarter_label(event.quarter), event.timestamp);
                let team = event
                    .side
                    .filter(|_| !event.kind.is_quarter_end() && !event.kind.is_game_over())
                    .map(|side| format!("{:<4}", abbreviation(self.record, side)))
                    .unwrap_or_else(|| "    ".to_string());
                Line::from(vec![
                    Span::styled(clock, Style::default().fg(Color::Gray)),
                    Span::styled(team, team_style),
                    Span::styled(describe(event, self.record), text_style),
                ])
            })
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = r#"{
        "game_info": {"game_id": "g", "teams": [
            {"team_name": "Boston Celtics", "abbreviation": "BOS",
             "players": [{"player_id": "t0", "player_name": "Jayson Tatum"},
                         {"player_id": "t4", "player_name": "Jrue Holiday"}]},
            {"team_name": "Los Angeles Lakers", "abbreviation": "LAL",
             "players": [{"player_id": 23, "player_name": "LeBron James"}]}
        ]},
        "events": [
            {"event_type": "tip_off", "quarter": 1, "team_id": 0, "player_id": "t0"},
            {"event_type": "shot_made", "quarter": 1, "team_id": 0, "player_id": "t0",
             "details": {"points": 3, "shot_type": "fga_threepoint", "assist_player_id": "t4"}},
            {"event_type": "free_throw", "quarter": 1, "team_id": 1, "player_id": 23,
             "details": {"made": false, "free_throw_num": 2, "total_free_throws": 2}},
            {"event_type": "turnover", "quarter": 1, "team_id": 1, "player_id": 23,
             "details": {"steal_player_id": "t4"}},
            {"event_type": "rebound", "quarter": 1, "team_id": 1, "player_id": "x9",
             "details": {"rebound_type": "offensive"}},
            {"event_type": "substitution", "quarter": 2, "team_id": 0,
             "details": {"player_in_id": "t4", "player_out_id": "t0"}},
            {"event_type": "quarter_end", "quarter": 5,
             "details": {"home_score": 3, "away_score": 0}},
            {"event_type": "timeout", "quarter": 5, "team_id": 1},
            {"event_type": "game_over", "quarter": 5,
             "details": {"home_score": 3, "away_score": 0}}
        ]
    }"#;

    fn descriptions() -> Vec<String> {
        let record = GameRecord::from_json(GAME).unwrap();
        record.events().iter().map(|e| describe(e, &record)).collect()
    }

    #[test]
    fn describes_each_play() {
        let lines = descriptions();
        assert_eq!(lines[0], "Jayson Tatum wins the tip for BOS");
        assert_eq!(lines[1], "Jayson Tatum drains a three-pointer (assist: Jrue Holiday)");
        assert_eq!(lines[2], "LeBron James misses free throw 2 of 2");
        assert_eq!(lines[3], "LeBron James turns it over, stolen by Jrue Holiday");
        assert_eq!(lines[4], "Player x9 grabs the offensive rebound");
        assert_eq!(lines[5], "BOS substitution: Jrue Holiday in for Jayson Tatum");
        assert_eq!(lines[6], "End of OT: BOS 3 - LAL 0");
        assert_eq!(lines[7], "timeout");
        assert_eq!(lines[8], "Final: Boston Celtics win 3-0");
    }

    #[test]
    fn feed_renders_newest_first() {
        let record = GameRecord::from_json(GAME).unwrap();
        let area = Rect::new(0, 0, 80, 2);
        let mut buf = Buffer::empty(area);
        EventFeed {
            record: &record,
            events: &record.events()[..3],
            scroll: 0,
            home_color: Color::Cyan,
            away_color: Color::Yellow,
        }
        .render(area, &mut buf);

        let row = |y: u16| -> String {
            (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
        };
        assert!(row(0).contains("misses free throw"));
        assert!(row(1).contains("drains a three-pointer"));
    }
}
