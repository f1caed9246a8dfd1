use hoopcast_engine::{GameRecord, Side};
use tui::style::Color;

/// Accent colours for teams we know; anything else falls back by side.
const TEAM_COLORS: &[(&str, Color)] = &[
    ("BOS", Color::Rgb(0, 122, 51)),
    ("LAL", Color::Rgb(85, 37, 130)),
    ("GSW", Color::Rgb(29, 66, 138)),
    ("MIA", Color::Rgb(152, 0, 46)),
    ("NYK", Color::Rgb(245, 132, 38)),
    ("CHI", Color::Rgb(206, 17, 65)),
    ("HCG", Color::Rgb(0, 130, 155)),
    ("MES", Color::Rgb(210, 105, 30)),
];

pub fn team_color(record: &GameRecord, side: Side) -> Color {
    let abbreviation = record.team(side).abbreviation.as_str();
    TEAM_COLORS
        .iter()
        .find(|(abbr, _)| *abbr == abbreviation)
        .map(|(_, color)| *color)
        .unwrap_or(match side {
            Side::Home => Color::Cyan,
            Side::Away => Color::Yellow,
        })
}

/// Roster name, or a placeholder for ids no roster lists.
pub fn player_name(record: &GameRecord, player_id: &str) -> String {
    record
        .player(player_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("Player {player_id}"))
}

/// "Jayson Tatum" -> "J. Tatum". Single names are left alone.
pub fn short_name(name: &str) -> String {
    match name.split_once(' ') {
        Some((first, rest)) if !first.is_empty() => {
            let initial: String = first.chars().take(1).collect();
            format!("{initial}. {rest}")
        }
        _ => name.to_string(),
    }
}

pub fn quarter_label(quarter: u8) -> String {
    match quarter {
        0 => "-".to_string(),
        1..=4 => format!("Q{quarter}"),
        5 => "OT".to_string(),
        n => format!("{}OT", n - 4),
    }
}

pub fn abbreviation(record: &GameRecord, side: Side) -> &str {
    &record.team(side).abbreviation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_first_names() {
        assert_eq!(short_name("Marcus Bell"), "M. Bell");
        assert_eq!(short_name("Nene"), "Nene");
        assert_eq!(short_name("Karl-Anthony Towns"), "K. Towns");
    }

    #[test]
    fn labels_overtime_periods() {
        assert_eq!(quarter_label(1), "Q1");
        assert_eq!(quarter_label(4), "Q4");
        assert_eq!(quarter_label(5), "OT");
        assert_eq!(quarter_label(7), "3OT");
    }
}
