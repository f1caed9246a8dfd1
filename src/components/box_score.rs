use crate::components::lookup::{player_name, short_name, team_color};
use hoopcast_engine::{GameRecord, PlayerStatLine, Side, TeamStatLine};
use std::collections::BTreeMap;
use tui::buffer::Buffer;
use tui::layout::{Constraint, Rect};
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Cell, Row, Table, Widget};

const HEADERS: [&str; 12] =
    ["PLAYER", "MIN", "PTS", "REB", "AST", "STL", "BLK", "TOV", "FG", "3PT", "FT", "PF"];

/// One team's box score: starters, bench, then anyone the events mention who
/// is not on the roster, then team totals.
pub struct BoxScoreTable<'a> {
    pub record: &'a GameRecord,
    pub side: Side,
    pub players: &'a BTreeMap<String, PlayerStatLine>,
    pub totals: &'a TeamStatLine,
}

impl<'a> BoxScoreTable<'a> {
    /// Player ids in display order.
    pub fn player_order(&self) -> Vec<String> {
        let team = self.record.team(self.side);
        let mut ids: Vec<String> =
            team.display_order().iter().map(|p| p.player_id.clone()).collect();
        let unlisted = self.players.keys().filter(|id| {
            self.record.side_of(id).is_none() && self.appears_for_side(id)
        });
        ids.extend(unlisted.cloned());
        ids
    }

    /// Whether any event credits an unlisted player to this side, including
    /// assists and steals.
    fn appears_for_side(&self, player_id: &str) -> bool {
        self.record.events().iter().any(|e| e.side_for(player_id) == Some(self.side))
    }
}

fn stat_cells(line: &PlayerStatLine) -> Vec<String> {
    vec![
        line.minutes_played().to_string(),
        line.points.to_string(),
        line.rebounds().to_string(),
        line.assists.to_string(),
        line.steals.to_string(),
        line.blocks.to_string(),
        line.turnovers.to_string(),
        format!("{}-{}", line.field_goals_made, line.field_goals_attempted),
        format!("{}-{}", line.three_pointers_made, line.three_pointers_attempted),
        format!("{}-{}", line.free_throws_made, line.free_throws_attempted),
        line.fouls.to_string(),
    ]
}

impl<'a> Widget for BoxScoreTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let team = self.record.team(self.side);
        let accent = team_color(self.record, self.side);

        let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h)))
            .style(Style::default().fg(accent).add_modifier(Modifier::BOLD));

        let mut rows: Vec<Row> = self
            .player_order()
            .into_iter()
            .map(|id| {
                let line = self.players.get(&id).copied().unwrap_or_default();
                let mut name = short_name(&player_name(self.record, &id));
                if team.is_starter(&id) {
                    name.push('*');
                }
                let style = if line == PlayerStatLine::default() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                };
                let mut cells = vec![name];
                cells.extend(stat_cells(&line));
                Row::new(cells).style(style)
            })
            .collect();

        let mut totals = vec!["TEAM".to_string()];
        totals.extend(stat_cells(self.totals));
        totals[1] = String::new();
        rows.push(Row::new(totals).style(Style::default().add_modifier(Modifier::BOLD)).top_margin(1));

        let mut widths = vec![Constraint::Min(16)];
        widths.extend([Constraint::Length(5); 11]);

        Table::new(rows, widths).header(header).column_spacing(1).render(area, buf);
    }
}
