use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::box_score::BoxScoreTable;
use crate::components::event_feed::EventFeed;
use crate::components::lookup::{short_name, team_color};
use crate::components::scoreboard::Scoreboard;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use hoopcast_engine::summary::{GameSummary, Outcome, TeamSummary};
use hoopcast_engine::{GameRecord, SessionStatus, Side};

static TABS: &[&str; 3] = &["Broadcast", "Box Score", "Summary"];

const SCOREBOARD_HEIGHT: u16 = 5;

const HELP_TEXT: &str = "\
space      play / pause
h / ←      previous quarter break
l / →      next quarter break
g / G      jump to tip-off / final
s          cycle speed (0.5x, 1x, 2x)
j / k      scroll the play-by-play
t          switch box score team
R          reload the game
1 2 3      Broadcast, Box Score, Summary
f          full screen
\"          toggle logs
q          quit";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Broadcast => draw_broadcast(f, layout.main, app),
            MenuItem::BoxScore => draw_box_score(f, layout.main, app),
            MenuItem::Summary => draw_summary(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(err) = result {
        error!("draw failed: {err}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Broadcast => 0,
        MenuItem::BoxScore => 1,
        MenuItem::Summary => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Renders the block and returns the loaded record, or a status message in its
/// place when the session has nothing to show yet.
fn ready_record<'a>(f: &mut Frame, area: Rect, app: &'a App, title: &str) -> Option<(&'a GameRecord, Rect)> {
    let block = default_border(Color::White).title(format!(" {title} "));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let msg = match app.session.status() {
        SessionStatus::Ready => return app.session.record().ok().map(|record| (record, inner)),
        SessionStatus::Loading => "Loading game...".to_string(),
        SessionStatus::Failed(err) => format!("{err}\n\nPress R to retry"),
        SessionStatus::Idle | SessionStatus::Closed => "No game loaded".to_string(),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
    None
}

fn game_title(record: &GameRecord) -> String {
    let home = &record.info.teams[Side::Home.index()];
    let away = &record.info.teams[Side::Away.index()];
    match record.info.date {
        Some(date) => format!("{} vs {} · {}", home.name, away.name, date.format("%b %-d, %Y")),
        None => format!("{} vs {}", home.name, away.name),
    }
}

fn draw_broadcast(f: &mut Frame, area: Rect, app: &App) {
    let Some((record, inner)) = ready_record(f, area, app, "Broadcast") else {
        return;
    };
    let Ok(projection) = app.session.projection() else {
        return;
    };

    let [title_area, board_area, status_area, feed_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(SCOREBOARD_HEIGHT),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(
        Paragraph::new(game_title(record))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        title_area,
    );

    f.render_widget(
        Scoreboard {
            record,
            projection: &projection,
            speed: app.session.speed(),
            playing: app.session.is_playing(),
        },
        Rect { height: board_area.height.min(3), y: board_area.y + 1, ..board_area },
    );

    if let Some(msg) = app.state.status_message.as_deref() {
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center),
            status_area,
        );
    }

    let feed_block = default_border(Color::DarkGray).title(" Play-by-play ");
    let feed_inner = feed_block.inner(feed_area);
    f.render_widget(feed_block, feed_area);
    f.render_widget(
        EventFeed {
            record,
            events: projection.visible_events,
            scroll: app.state.feed.scroll_offset,
            home_color: team_color(record, Side::Home),
            away_color: team_color(record, Side::Away),
        },
        feed_inner,
    );
}

fn draw_box_score(f: &mut Frame, area: Rect, app: &App) {
    let side = app.state.box_score.side;
    let title = match app.session.record() {
        Ok(record) => format!("Box Score · {} (t to switch)", record.team(side).name),
        Err(_) => "Box Score".to_string(),
    };
    let Some((record, inner)) = ready_record(f, area, app, &title) else {
        return;
    };
    let Ok(projection) = app.session.projection() else {
        return;
    };

    f.render_widget(
        BoxScoreTable {
            record,
            side,
            players: projection.players,
            totals: &projection.teams[side.index()],
        },
        inner,
    );
}

fn draw_summary(f: &mut Frame, area: Rect, app: &App) {
    let Some((record, inner)) = ready_record(f, area, app, "Summary") else {
        return;
    };
    let Some(summary) = app.summary() else {
        f.render_widget(
            Paragraph::new("The summary is available once the replay reaches the final buzzer.\n\nPress G to jump to the end.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    };

    let [headline_area, table_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(14),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(
        Paragraph::new(headline(record, &summary))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        headline_area,
    );

    let home = summary.team(Side::Home);
    let away = summary.team(Side::Away);
    let header = Row::new([
        Cell::from(""),
        Cell::from(home.name.clone()).style(Style::default().fg(team_color(record, Side::Home))),
        Cell::from(away.name.clone()).style(Style::default().fg(team_color(record, Side::Away))),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = summary_rows(home, away)
        .into_iter()
        .map(|(label, h, a)| Row::new([label.to_string(), h, a]))
        .collect();
    let widths = [Constraint::Length(18), Constraint::Fill(1), Constraint::Fill(1)];
    f.render_widget(Table::new(rows, widths).header(header).column_spacing(2), table_area);

    let pace = summary
        .pace
        .map(|p| format!("{p:.1}"))
        .unwrap_or_else(|| "—".to_string());
    f.render_widget(
        Paragraph::new(format!("Pace {pace} possessions per 48 · {:.0} minutes played", summary.minutes))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        footer_area,
    );
}

fn headline(record: &GameRecord, summary: &GameSummary) -> Line<'static> {
    let score = format!("{}-{}", summary.scores.home, summary.scores.away);
    match summary.outcome {
        Outcome::Winner(side) => Line::from(vec![
            Span::styled(
                record.team(side).name.clone(),
                Style::default().fg(team_color(record, side)),
            ),
            Span::raw(format!(" win, final {score}")),
        ]),
        Outcome::Tie => Line::from(format!("Final {score}, tied")),
    }
}

fn pct(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}%", v * 100.0)).unwrap_or_else(|| "—".to_string())
}

fn rating(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "—".to_string())
}

fn top_scorer(team: &TeamSummary) -> String {
    team.top_scorer
        .as_ref()
        .map(|s| format!("{} ({})", short_name(&s.name), s.points))
        .unwrap_or_else(|| "—".to_string())
}

const SUMMARY_LABELS: [&str; 13] = [
    "Points",
    "FG",
    "FG%",
    "3P%",
    "FT%",
    "eFG%",
    "TS%",
    "Rebounds",
    "Turnovers",
    "Possessions",
    "Off. rating",
    "Def. rating",
    "Top scorer",
];

fn summary_column(t: &TeamSummary) -> [String; 13] {
    [
        t.line.points.to_string(),
        format!("{}-{}", t.line.field_goals_made, t.line.field_goals_attempted),
        pct(t.field_goal_pct),
        pct(t.three_point_pct),
        pct(t.free_throw_pct),
        pct(t.effective_fg_pct),
        pct(t.true_shooting_pct),
        t.line.rebounds().to_string(),
        t.line.turnovers.to_string(),
        format!("{:.1}", t.possessions),
        rating(t.offensive_rating),
        rating(t.defensive_rating),
        top_scorer(t),
    ]
}

fn summary_rows(home: &TeamSummary, away: &TeamSummary) -> Vec<(&'static str, String, String)> {
    SUMMARY_LABELS
        .into_iter()
        .zip(summary_column(home))
        .zip(summary_column(away))
        .map(|((label, h), a)| (label, h, a))
        .collect()
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help (Esc to close) ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::Gray)), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_percentages_render_as_dashes() {
        assert_eq!(pct(None), "—");
        assert_eq!(pct(Some(0.4567)), "45.7%");
        assert_eq!(rating(Some(101.26)), "101.3");
    }

    #[test]
    fn summary_rows_line_up_both_teams() {
        let record = hoopcast_engine::client::sample_game().unwrap();
        let mut cursor = hoopcast_engine::ReplayCursor::new(record);
        cursor.seek_to_end().unwrap();
        let summary = GameSummary::new(cursor.record(), cursor.state());

        let rows = summary_rows(summary.team(Side::Home), summary.team(Side::Away));
        assert_eq!(rows[0], ("Points", "87".to_string(), "64".to_string()));
        assert_eq!(rows.last().unwrap().0, "Top scorer");
    }

    #[test]
    fn title_includes_the_game_date() {
        let record = hoopcast_engine::client::sample_game().unwrap();
        assert_eq!(
            game_title(&record),
            "Harbor City Gulls vs Mesa Ridge Comets · Mar 14, 2025"
        );
    }
}
