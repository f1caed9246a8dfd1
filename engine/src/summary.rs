//! Post-game summary over a final aggregate.
//!
//! Possessions use the raw-count estimate `FGA - ORB + TOV + 0.44 * FTA`.

use crate::stats::{AggregateState, TeamStatLine};
use crate::{GameRecord, PlayerInfo, Scores, Side};

const REGULATION_QUARTERS: u8 = 4;
const QUARTER_MINUTES: f64 = 12.0;
const OVERTIME_MINUTES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Side),
    Tie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopScorer {
    pub player_id: String,
    pub name: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub side: Side,
    pub name: String,
    pub line: TeamStatLine,
    pub field_goal_pct: Option<f64>,
    pub three_point_pct: Option<f64>,
    pub free_throw_pct: Option<f64>,
    pub effective_fg_pct: Option<f64>,
    pub true_shooting_pct: Option<f64>,
    pub possessions: f64,
    /// Points per 100 possessions.
    pub offensive_rating: Option<f64>,
    pub defensive_rating: Option<f64>,
    pub top_scorer: Option<TopScorer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub scores: Scores,
    pub outcome: Outcome,
    pub minutes: f64,
    /// Average possessions per 48 minutes.
    pub pace: Option<f64>,
    pub teams: [TeamSummary; 2],
}

impl GameSummary {
    pub fn new(record: &GameRecord, state: &AggregateState) -> Self {
        let minutes = game_minutes(record);
        let possessions = Side::BOTH.map(|side| estimate_possessions(state.team(side)));

        let teams = Side::BOTH.map(|side| {
            let line = *state.team(side);
            let own = possessions[side.index()];
            let allowed = state.scores.get(side.opponent());
            TeamSummary {
                side,
                name: record.team(side).name.clone(),
                field_goal_pct: pct(line.field_goals_made as f64, line.field_goals_attempted as f64),
                three_point_pct: pct(
                    line.three_pointers_made as f64,
                    line.three_pointers_attempted as f64,
                ),
                free_throw_pct: pct(line.free_throws_made as f64, line.free_throws_attempted as f64),
                effective_fg_pct: pct(
                    line.field_goals_made as f64 + 0.5 * line.three_pointers_made as f64,
                    line.field_goals_attempted as f64,
                ),
                true_shooting_pct: pct(
                    line.points as f64,
                    2.0 * (line.field_goals_attempted as f64
                        + 0.44 * line.free_throws_attempted as f64),
                ),
                possessions: own,
                offensive_rating: per_100(state.scores.get(side), own),
                defensive_rating: per_100(allowed, possessions[side.opponent().index()]),
                top_scorer: top_scorer(record, state, side),
                line,
            }
        });

        let average = (possessions[0] + possessions[1]) / 2.0;
        let pace = (average > 0.0 && minutes > 0.0).then(|| average * 48.0 / minutes);

        Self {
            scores: state.scores,
            outcome: state.scores.leader().map_or(Outcome::Tie, Outcome::Winner),
            minutes,
            pace,
            teams,
        }
    }

    pub fn team(&self, side: Side) -> &TeamSummary {
        &self.teams[side.index()]
    }
}

fn pct(made: f64, attempted: f64) -> Option<f64> {
    (attempted > 0.0).then(|| 100.0 * made / attempted)
}

fn per_100(points: u32, possessions: f64) -> Option<f64> {
    (possessions > 0.0).then(|| 100.0 * points as f64 / possessions)
}

pub fn estimate_possessions(line: &TeamStatLine) -> f64 {
    let raw = line.field_goals_attempted as f64 - line.offensive_rebounds as f64
        + line.turnovers as f64
        + 0.44 * line.free_throws_attempted as f64;
    raw.max(0.0)
}

/// Regulation plus five minutes per overtime period played.
fn game_minutes(record: &GameRecord) -> f64 {
    let quarters = record
        .events()
        .iter()
        .map(|e| e.quarter)
        .max()
        .unwrap_or(REGULATION_QUARTERS)
        .max(REGULATION_QUARTERS);
    let overtimes = (quarters - REGULATION_QUARTERS) as f64;
    REGULATION_QUARTERS as f64 * QUARTER_MINUTES + overtimes * OVERTIME_MINUTES
}

/// Highest scorer on the roster of `side`; ties go to the earlier roster slot.
fn top_scorer(record: &GameRecord, state: &AggregateState, side: Side) -> Option<TopScorer> {
    record
        .team(side)
        .players
        .iter()
        .map(|p| (p, state.player(&p.player_id).points))
        .filter(|(_, points)| *points > 0)
        .fold(None, |best: Option<(&PlayerInfo, u32)>, (p, points)| match best {
            Some((_, top)) if top >= points => best,
            _ => Some((p, points)),
        })
        .map(|(p, points)| TopScorer {
            player_id: p.player_id.clone(),
            name: p.name.clone(),
            points,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::stats::fold_prefix;

    fn final_summary(record: &GameRecord) -> GameSummary {
        GameSummary::new(record, &fold_prefix(record, Some(record.len() - 1)))
    }

    #[test]
    fn shooting_percentages() {
        let summary = final_summary(&two_quarters());

        let home = summary.team(Side::Home);
        // p1 hit a three and p3 a two: 2 of 2 from the field.
        assert_eq!(home.field_goal_pct, Some(100.0));
        assert_eq!(home.three_point_pct, Some(100.0));
        assert_eq!(home.free_throw_pct, None);
        assert_eq!(home.effective_fg_pct, Some(125.0));

        let away = summary.team(Side::Away);
        // p4 made two, p2 missed three: 1 of 2, 0 of 1 from deep, 1 of 2 at the line.
        assert_eq!(away.field_goal_pct, Some(50.0));
        assert_eq!(away.three_point_pct, Some(0.0));
        assert_eq!(away.free_throw_pct, Some(50.0));
    }

    #[test]
    fn possessions_and_ratings() {
        let summary = final_summary(&two_quarters());
        let home = summary.team(Side::Home);
        let away = summary.team(Side::Away);

        // Home: 2 FGA - 0 ORB + 1 TOV.
        assert!((home.possessions - 3.0).abs() < 1e-9);
        // Away: 2 FGA - 1 ORB + 0 TOV + 0.44 * 2 FTA.
        assert!((away.possessions - 1.88).abs() < 1e-9);

        let ortg = home.offensive_rating.unwrap();
        assert!((ortg - 500.0 / 3.0).abs() < 1e-9);
        let drtg = home.defensive_rating.unwrap();
        assert!((drtg - 300.0 / 1.88).abs() < 1e-9);

        let pace = summary.pace.unwrap();
        assert!((pace - (3.0 + 1.88) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn winner_and_top_scorers() {
        let summary = final_summary(&two_quarters());
        assert_eq!(summary.outcome, Outcome::Winner(Side::Home));
        assert_eq!(summary.scores, Scores::new(5, 3));

        let home_top = summary.team(Side::Home).top_scorer.clone().unwrap();
        assert_eq!((home_top.player_id.as_str(), home_top.points), ("p1", 3));
        let away_top = summary.team(Side::Away).top_scorer.clone().unwrap();
        assert_eq!(away_top.name, "Anthony Davis");
    }

    #[test]
    fn tie_and_empty_box_score() {
        let record = GameRecord::new(info(), vec![game_over(0, 0)], vec![]).unwrap();
        let summary = final_summary(&record);
        assert_eq!(summary.outcome, Outcome::Tie);
        assert_eq!(summary.pace, None);
        for side in Side::BOTH {
            let team = summary.team(side);
            assert_eq!(team.field_goal_pct, None);
            assert_eq!(team.true_shooting_pct, None);
            assert_eq!(team.offensive_rating, None);
            assert_eq!(team.top_scorer, None);
        }
    }

    #[test]
    fn overtime_lengthens_the_game() {
        let mut events = vec![made(0, "p1", 2, None)];
        let mut ot = game_over(2, 0);
        ot.quarter = 6;
        events.push(ot);
        let record = GameRecord::new(info(), events, vec![]).unwrap();
        assert_eq!(final_summary(&record).minutes, 58.0);
    }
}
