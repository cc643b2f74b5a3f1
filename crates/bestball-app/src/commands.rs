// Command handlers: build a report from loaded contest data, then render it
// as a text table or JSON.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use bestball_core::config::Config;
use bestball_core::contest::{ContestWeeks, Week};
use bestball_core::player::{Player, RosterSlot};
use bestball_scoring::{
    lineup_for_week, project_player, roster_total, season_lineups, standings, total_best_ball_points,
    BestBallLineup, PlayerProjection, SlotAggregator, Standing,
};

use crate::cli::Command;
use crate::data::ContestData;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no roster for owner '{0}'")]
    UnknownOwner(String),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("week {week} is not a contest week (contest weeks: {weeks:?})")]
    NotAContestWeek { week: Week, weeks: Vec<Week> },

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub player: Player,
    pub week: Week,
    pub points: f64,
    /// False when the feed had no usable stat line for the week.
    pub has_stat_line: bool,
    /// Empty when the player has no stat line for the week.
    pub breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekPoints {
    pub week: Week,
    pub player_id: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotReport {
    pub slot: RosterSlot,
    pub player: Player,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitute: Option<Player>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_week: Option<Week>,
    pub weekly: Vec<WeekPoints>,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterReport {
    pub owner: String,
    pub year: u16,
    pub slots: Vec<SlotReport>,
    pub roster_points: f64,
    pub best_ball_points: f64,
}

// ---------------------------------------------------------------------------
// Report builders
// ---------------------------------------------------------------------------

pub fn standings_report(data: &ContestData, weeks: &ContestWeeks) -> Vec<Standing> {
    standings(&data.rosters, &data.book, weeks)
}

/// Lineups for one contest week, or every contest week when `week` is None.
pub fn lineup_report(
    data: &ContestData,
    owner: &str,
    week: Option<Week>,
    weeks: &ContestWeeks,
) -> Result<Vec<BestBallLineup>, CommandError> {
    let roster = data
        .roster(owner)
        .ok_or_else(|| CommandError::UnknownOwner(owner.to_string()))?;
    match week {
        Some(w) => {
            require_contest_week(w, weeks)?;
            Ok(vec![lineup_for_week(roster, &data.book, w)])
        }
        None => Ok(season_lineups(roster, &data.book, weeks)),
    }
}

pub fn score_report(data: &ContestData, player_id: &str, week: Week) -> Result<ScoreReport, CommandError> {
    let player = data
        .player(player_id)
        .ok_or_else(|| CommandError::UnknownPlayer(player_id.to_string()))?;
    Ok(ScoreReport {
        player: player.clone(),
        week,
        points: data.book.points(&player.id, week),
        has_stat_line: data.stat_lines.contains_key(&(player.id.clone(), week)),
        breakdown: data.book.breakdown(&player.id, week).cloned().unwrap_or_default(),
    })
}

pub fn project_report(
    data: &ContestData,
    config: &Config,
    player_id: &str,
    week: Week,
) -> Result<PlayerProjection, CommandError> {
    let weeks = &config.contest.weeks;
    require_contest_week(week, weeks)?;
    let player = data
        .player(player_id)
        .ok_or_else(|| CommandError::UnknownPlayer(player_id.to_string()))?;
    Ok(project_player(
        player,
        week,
        &data.book,
        &data.stat_lines,
        weeks,
        &config.projection.position_averages,
        &data.win_probabilities,
    ))
}

pub fn roster_report(data: &ContestData, owner: &str, weeks: &ContestWeeks) -> Result<RosterReport, CommandError> {
    let roster = data
        .roster(owner)
        .ok_or_else(|| CommandError::UnknownOwner(owner.to_string()))?;

    let slots = roster
        .entries()
        .iter()
        .map(|entry| {
            let aggregator = SlotAggregator::for_slot(roster, entry.slot, &data.book, weeks);
            let substitution = roster.substitution().filter(|s| s.slot() == entry.slot);
            SlotReport {
                slot: entry.slot,
                player: entry.player.clone(),
                substitute: substitution.map(|s| s.substitute().clone()),
                effective_week: substitution.map(|s| s.effective_week()),
                weekly: aggregator
                    .weekly_breakdown()
                    .into_iter()
                    .map(|(week, points)| WeekPoints {
                        week,
                        player_id: roster.effective_player(entry.slot, week).id.to_string(),
                        points,
                    })
                    .collect(),
                total_points: aggregator.total_points(),
            }
        })
        .collect();

    Ok(RosterReport {
        owner: roster.owner.clone(),
        year: roster.year,
        slots,
        roster_points: roster_total(roster, &data.book, weeks),
        best_ball_points: total_best_ball_points(roster, &data.book, weeks),
    })
}

fn require_contest_week(week: Week, weeks: &ContestWeeks) -> Result<(), CommandError> {
    if weeks.contains(week) {
        Ok(())
    } else {
        Err(CommandError::NotAContestWeek {
            week,
            weeks: weeks.as_slice().to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one command and return its rendered output.
pub fn execute(command: &Command, json: bool, config: &Config, data: &ContestData) -> Result<String, CommandError> {
    let weeks = &config.contest.weeks;
    match command {
        Command::Standings => {
            let table = standings_report(data, weeks);
            render(json, &table, || render_standings(&table, weeks))
        }
        Command::Lineup { owner, week } => {
            let lineups = lineup_report(data, owner, *week, weeks)?;
            let name = data.roster(owner).map_or(owner.as_str(), |r| r.owner.as_str());
            render(json, &lineups, || render_lineups(name, &lineups, weeks))
        }
        Command::Score { player, week } => {
            let report = score_report(data, player, *week)?;
            render(json, &report, || render_score(&report))
        }
        Command::Project { player, week } => {
            let report = project_report(data, config, player, *week)?;
            render(json, &report, || render_projection(&report, weeks))
        }
        Command::Roster { owner } => {
            let report = roster_report(data, owner, weeks)?;
            render(json, &report, || render_roster(&report, weeks))
        }
    }
}

fn render<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<String, CommandError> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text())
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

// Writes into a String are infallible; their Results are dropped.

fn render_standings(table: &[Standing], weeks: &ContestWeeks) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<5}{:<20}", "Rank", "Owner");
    for w in weeks.iter() {
        let _ = write!(out, "{:>9}", format!("Wk {w}"));
    }
    let _ = writeln!(out, "{:>10}", "Total");
    for s in table {
        let _ = write!(out, "{:<5}{:<20}", s.rank, s.owner);
        for (_, points) in &s.weekly_points {
            let _ = write!(out, "{points:>9.2}");
        }
        let _ = writeln!(out, "{:>10.2}", s.best_ball_points);
    }
    out
}

fn render_lineups(owner: &str, lineups: &[BestBallLineup], weeks: &ContestWeeks) -> String {
    let mut out = String::new();
    for lineup in lineups {
        match lineup.week {
            Some(w) => {
                let _ = writeln!(out, "{owner} - week {w} ({})", weeks.label(w));
            }
            None => {
                let _ = writeln!(out, "{owner}");
            }
        }
        for s in &lineup.starters {
            let _ = writeln!(
                out,
                "  {:<5}{:<26}{:<4}{:<5}{:>8.2}",
                s.slot.display_str(),
                s.player.name,
                s.player.position.display_str(),
                s.player.team,
                s.points
            );
        }
        for b in &lineup.bench {
            let _ = writeln!(
                out,
                "  {:<5}{:<26}{:<4}{:<5}{:>8.2}",
                "BN",
                b.player.name,
                b.player.position.display_str(),
                b.player.team,
                b.points
            );
        }
        let _ = writeln!(out, "  {:<40}{:>8.2}", "Total", lineup.total_points);
    }
    if lineups.len() > 1 {
        let season: f64 = lineups.iter().map(|l| l.total_points).sum();
        let _ = writeln!(out, "Season best-ball total: {season:.2}");
    }
    out
}

fn render_score(report: &ScoreReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} {}) week {}: {:.2} pts",
        report.player.name,
        report.player.position.display_str(),
        report.player.team,
        report.week,
        report.points
    );
    if !report.has_stat_line {
        let _ = writeln!(out, "  no stat line");
    }
    for (category, points) in &report.breakdown {
        let _ = writeln!(out, "  {category:<20}{points:>8.2}");
    }
    out
}

fn render_projection(report: &PlayerProjection, weeks: &ContestWeeks) -> String {
    let p = &report.projection;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} {}) week {} ({})",
        report.player.name,
        report.player.position.display_str(),
        report.player.team,
        report.week,
        weeks.label(report.week)
    );
    let _ = writeln!(out, "  projected   {:.2} pts", p.projected_points);
    let _ = writeln!(
        out,
        "  confidence  {} ({}, {} games)",
        p.confidence, p.basis, p.games_played
    );
    match (report.win_probability, report.expected_value) {
        (Some(prob), Some(ev)) => {
            let _ = writeln!(out, "  win prob    {:.0}%", prob * 100.0);
            let _ = writeln!(out, "  expected    {ev:.2} pts");
        }
        _ => {
            let _ = writeln!(out, "  win prob    n/a");
        }
    }
    if let Some(stats) = &p.stat_projection {
        for (category, value) in stats {
            let _ = writeln!(out, "    {category:<20}{value:>8.2}");
        }
    }
    out
}

fn render_roster(report: &RosterReport, weeks: &ContestWeeks) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", report.owner, report.year);
    let _ = write!(out, "  {:<5}{:<26}", "Slot", "Player");
    for w in weeks.iter() {
        let _ = write!(out, "{:>9}", format!("Wk {w}"));
    }
    let _ = writeln!(out, "{:>10}", "Total");
    for slot in &report.slots {
        let _ = write!(out, "  {:<5}{:<26}", slot.slot.display_str(), slot.player.name);
        for wp in &slot.weekly {
            let marker = if wp.player_id == slot.player.id.as_str() { " " } else { "*" };
            let _ = write!(out, "{:>8.2}{marker}", wp.points);
        }
        let _ = writeln!(out, "{:>10.2}", slot.total_points);
        if let (Some(sub), Some(week)) = (&slot.substitute, slot.effective_week) {
            let _ = writeln!(out, "       * {} from week {}", sub.name, week);
        }
    }
    let _ = writeln!(out, "  Everyone-starts total: {:.2}", report.roster_points);
    let _ = writeln!(out, "  Best-ball total:       {:.2}", report.best_ball_points);
    out
}
