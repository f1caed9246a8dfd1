use crate::components::lookup::{quarter_label, team_color};
use hoopcast_engine::{GameRecord, PlaybackSpeed, Projection, Side};
use tui::buffer::Buffer;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget};

/// Three-column scoreboard: home | clock | away.
pub struct Scoreboard<'a> {
    pub record: &'a GameRecord,
    pub projection: &'a Projection<'a>,
    pub speed: PlaybackSpeed,
    pub playing: bool,
}

impl<'a> Scoreboard<'a> {
    fn team_lines(&self, side: Side) -> Vec<Line<'a>> {
        let team = self.record.team(side);
        let score = self.projection.scores.get(side);
        let leading = self.projection.scores.leader() == Some(side);
        let mut score_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        if leading {
            score_style = score_style.fg(Color::Green);
        }
        let record_line = team.record.clone().unwrap_or_default();

        vec![
            Line::from(Span::styled(
                team.name.clone(),
                Style::default().fg(team_color(self.record, side)).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(score.to_string(), score_style)),
            Line::from(Span::styled(record_line, Style::default().fg(Color::DarkGray))),
        ]
    }

    fn clock_lines(&self) -> Vec<Line<'a>> {
        let status = if self.projection.finished {
            Span::styled("FINAL", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        } else if self.playing {
            Span::styled(
                format!("▶ {}", self.speed.label()),
                Style::default().fg(Color::Green),
            )
        } else {
            Span::styled(
                format!("❚❚ {}", self.speed.label()),
                Style::default().fg(Color::Gray),
            )
        };

        vec![
            Line::from(quarter_label(self.projection.clock.quarter)),
            Line::from(Span::styled(
                self.projection.clock.timestamp.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(status),
        ]
    }
}

impl<'a> Widget for Scoreboard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 30 {
            return;
        }
        let [home, clock, away] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Fill(1),
        ])
        .areas(area);

        Paragraph::new(self.team_lines(Side::Home))
            .alignment(Alignment::Center)
            .render(home, buf);
        Paragraph::new(self.clock_lines())
            .alignment(Alignment::Center)
            .render(clock, buf);
        Paragraph::new(self.team_lines(Side::Away))
            .alignment(Alignment::Center)
            .render(away, buf);
    }
}
