// CSV loading for contest data: players, rosters, substitutions, per-game
// stats and team win probabilities. Every file is normalized upstream; rows
// that still fail to parse are logged and skipped.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use bestball_core::config::Config;
use bestball_core::contest::{ContestWeeks, Week};
use bestball_core::player::{Player, PlayerId, Position, RosterSlot};
use bestball_core::roster::{Roster, RosterError, Substitution};
use bestball_core::rules::{ScoringError, ScoringRules};
use bestball_core::scores::ScoreBook;
use bestball_core::stats::{FieldGoal, PlayerStats};
use bestball_scoring::{score_game, StatLines, WinProbabilities};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("invalid roster for {owner}: {source}")]
    Roster { owner: String, source: RosterError },

    #[error("failed to score {player} in week {week}: {source}")]
    Scoring {
        player: PlayerId,
        week: Week,
        source: ScoringError,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Loaded contest
// ---------------------------------------------------------------------------

/// Everything the commands need, loaded and scored.
#[derive(Debug, Clone)]
pub struct ContestData {
    pub players: HashMap<PlayerId, Player>,
    /// One roster per owner, ordered by owner name.
    pub rosters: Vec<Roster>,
    pub stat_lines: StatLines,
    pub book: ScoreBook,
    pub win_probabilities: WinProbabilities,
}

impl ContestData {
    pub fn roster(&self, owner: &str) -> Option<&Roster> {
        self.rosters
            .iter()
            .find(|r| r.owner.eq_ignore_ascii_case(owner.trim()))
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(&PlayerId::new(id.trim()))
    }
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    id: String,
    name: String,
    position: String,
    #[serde(default)]
    team: String,
}

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    owner: String,
    slot: String,
    player_id: String,
}

#[derive(Debug, Deserialize)]
struct RawSubstitution {
    owner: String,
    slot: String,
    substitute_id: String,
    effective_week: Week,
    #[serde(default)]
    reason: String,
}

/// One game's box score. Stat columns a feed does not carry may be left out
/// of the header entirely. Field goals are `;`-separated distances.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStatLine {
    player_id: String,
    week: Week,
    pass_yards: i32,
    pass_td: u32,
    pass_int: u32,
    rush_yards: i32,
    rush_td: u32,
    receptions: u32,
    rec_yards: i32,
    rec_td: u32,
    two_pt_conv: u32,
    fumbles_lost: u32,
    return_td: u32,
    fg_made: String,
    fg_missed: String,
    xp_made: u32,
    xp_missed: u32,
    sacks: u32,
    def_int: u32,
    fumbles_recovered: u32,
    def_td: u32,
    safeties: u32,
    blocked_kicks: u32,
    /// A missing column or blank cell is "not reported", never a shutout.
    points_allowed: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawWinProbability {
    team: String,
    week: Week,
    win_probability: f64,
}

/// A roster row with its slot parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    pub owner: String,
    pub slot: RosterSlot,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionRow {
    pub owner: String,
    pub slot: RosterSlot,
    pub substitute_id: PlayerId,
    pub effective_week: Week,
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse `"23;47;51"` into distances. Blank means no attempts.
fn parse_distances(raw: &str) -> Result<Vec<u32>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().map_err(|_| format!("bad field goal distance '{s}'")))
        .collect()
}

impl RawStatLine {
    fn into_stats(self) -> Result<(PlayerId, Week, PlayerStats), String> {
        let made = parse_distances(&self.fg_made)?;
        let missed = parse_distances(&self.fg_missed)?;
        let field_goals = made
            .into_iter()
            .map(FieldGoal::made)
            .chain(missed.into_iter().map(FieldGoal::missed))
            .collect();
        let stats = PlayerStats {
            pass_yards: self.pass_yards,
            pass_td: self.pass_td,
            pass_int: self.pass_int,
            rush_yards: self.rush_yards,
            rush_td: self.rush_td,
            receptions: self.receptions,
            rec_yards: self.rec_yards,
            rec_td: self.rec_td,
            two_pt_conv: self.two_pt_conv,
            fumbles_lost: self.fumbles_lost,
            return_td: self.return_td,
            field_goals,
            xp_made: self.xp_made,
            xp_missed: self.xp_missed,
            sacks: self.sacks,
            def_int: self.def_int,
            fumbles_recovered: self.fumbles_recovered,
            def_td: self.def_td,
            safeties: self.safeties,
            blocked_kicks: self.blocked_kicks,
            points_allowed: self.points_allowed,
        };
        Ok((PlayerId::new(self.player_id.trim()), self.week, stats))
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<HashMap<PlayerId, Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = HashMap::new();
    for result in reader.deserialize::<RawPlayer>() {
        match result {
            Ok(raw) => {
                let Some(position) = Position::from_str_pos(&raw.position) else {
                    warn!("skipping player '{}': unknown position '{}'", raw.name.trim(), raw.position);
                    continue;
                };
                let player = Player::new(raw.id.trim(), raw.name.trim(), position, raw.team.trim());
                if players.contains_key(&player.id) {
                    warn!("duplicate player id '{}', using latest row", player.id);
                }
                players.insert(player.id.clone(), player);
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

pub fn load_roster_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) => {
                let Some(slot) = RosterSlot::from_str_slot(&raw.slot) else {
                    warn!("skipping roster row for '{}': unknown slot '{}'", raw.owner.trim(), raw.slot);
                    continue;
                };
                rows.push(RosterRow {
                    owner: raw.owner.trim().to_string(),
                    slot,
                    player_id: PlayerId::new(raw.player_id.trim()),
                });
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(rows)
}

pub fn load_substitution_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<SubstitutionRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawSubstitution>() {
        match result {
            Ok(raw) => {
                let Some(slot) = RosterSlot::from_str_slot(&raw.slot) else {
                    warn!("skipping substitution for '{}': unknown slot '{}'", raw.owner.trim(), raw.slot);
                    continue;
                };
                let reason = raw.reason.trim();
                rows.push(SubstitutionRow {
                    owner: raw.owner.trim().to_string(),
                    slot,
                    substitute_id: PlayerId::new(raw.substitute_id.trim()),
                    effective_week: raw.effective_week,
                    reason: (!reason.is_empty()).then(|| reason.to_string()),
                });
            }
            Err(e) => {
                warn!("skipping malformed substitution row: {}", e);
            }
        }
    }
    Ok(rows)
}

pub fn load_stat_lines_from_reader<R: Read>(rdr: R) -> Result<StatLines, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut lines = StatLines::new();
    for result in reader.deserialize::<RawStatLine>() {
        match result {
            Ok(raw) => {
                if raw.player_id.trim().is_empty() {
                    warn!("skipping stat row with no player_id");
                    continue;
                }
                match raw.into_stats() {
                    Ok((id, week, stats)) => {
                        if lines.contains_key(&(id.clone(), week)) {
                            warn!("duplicate stat line for '{}' week {}, using latest row", id, week);
                        }
                        lines.insert((id, week), stats);
                    }
                    Err(message) => warn!("skipping stat row: {}", message),
                }
            }
            Err(e) => {
                warn!("skipping malformed stat row: {}", e);
            }
        }
    }
    Ok(lines)
}

pub fn load_win_probabilities_from_reader<R: Read>(rdr: R) -> Result<WinProbabilities, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut probabilities = WinProbabilities::new();
    for result in reader.deserialize::<RawWinProbability>() {
        match result {
            Ok(raw) => {
                let p = raw.win_probability;
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    warn!(
                        "skipping win probability for '{}' week {}: {} is outside 0..=1",
                        raw.team.trim(),
                        raw.week,
                        p
                    );
                    continue;
                }
                probabilities.insert(&raw.team, raw.week, p);
            }
            Err(e) => {
                warn!("skipping malformed win probability row: {}", e);
            }
        }
    }
    Ok(probabilities)
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Group roster rows by owner and build validated rosters, ordered by owner.
///
/// Rows naming an unknown player are skipped with a warning; the roster
/// then fails validation for the missing slot.
pub fn build_rosters(
    rows: &[RosterRow],
    players: &HashMap<PlayerId, Player>,
    year: u16,
) -> Result<Vec<Roster>, DataError> {
    let mut by_owner: BTreeMap<&str, Vec<(RosterSlot, Player)>> = BTreeMap::new();
    for row in rows {
        let Some(player) = players.get(&row.player_id) else {
            warn!("skipping roster row for '{}': unknown player '{}'", row.owner, row.player_id);
            continue;
        };
        by_owner
            .entry(row.owner.as_str())
            .or_default()
            .push((row.slot, player.clone()));
    }

    by_owner
        .into_iter()
        .map(|(owner, assignments)| {
            Roster::new(owner, year, assignments).map_err(|source| DataError::Roster {
                owner: owner.to_string(),
                source,
            })
        })
        .collect()
}

/// Attach substitutions to their rosters.
///
/// Unknown owners and substitutes are skipped with a warning. A substitution
/// that breaks a roster rule is an error.
pub fn apply_substitutions(
    rosters: &mut [Roster],
    rows: &[SubstitutionRow],
    players: &HashMap<PlayerId, Player>,
    weeks: &ContestWeeks,
) -> Result<usize, DataError> {
    let mut applied = 0;
    for row in rows {
        let Some(roster) = rosters.iter_mut().find(|r| r.owner == row.owner) else {
            warn!("skipping substitution: unknown owner '{}'", row.owner);
            continue;
        };
        let Some(substitute) = players.get(&row.substitute_id) else {
            warn!(
                "skipping substitution for '{}': unknown player '{}'",
                row.owner, row.substitute_id
            );
            continue;
        };
        let original = roster.player(row.slot).clone();
        let roster_error = |source| DataError::Roster {
            owner: row.owner.clone(),
            source,
        };
        let substitution = Substitution::new(
            row.slot,
            original,
            substitute.clone(),
            row.effective_week,
            row.reason.clone(),
        )
        .map_err(roster_error)?;
        roster.set_substitution(substitution, weeks).map_err(roster_error)?;
        applied += 1;
    }
    Ok(applied)
}

/// Score every stat line for a known player into a fresh book.
pub fn score_stat_lines(
    stat_lines: &StatLines,
    players: &HashMap<PlayerId, Player>,
    rules: &ScoringRules,
    year: u16,
) -> Result<ScoreBook, DataError> {
    let mut book = ScoreBook::new();
    for ((id, week), stats) in stat_lines {
        let Some(player) = players.get(id) else {
            warn!("skipping stats for unknown player '{}' week {}", id, week);
            continue;
        };
        if player.position == Position::DST && stats.points_allowed.is_none() {
            warn!(
                "defense '{}' week {} has no points_allowed; scoring without a tier bonus",
                id, week
            );
        }
        let score = score_game(id, player.position, *week, year, stats, rules).map_err(|source| {
            DataError::Scoring {
                player: id.clone(),
                week: *week,
                source,
            }
        })?;
        book.upsert(score);
    }
    Ok(book)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, DataError> {
    std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> DataError + '_ {
    move |e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

pub fn load_players(path: &Path) -> Result<HashMap<PlayerId, Player>, DataError> {
    load_players_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_roster_rows(path: &Path) -> Result<Vec<RosterRow>, DataError> {
    load_roster_rows_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_substitution_rows(path: &Path) -> Result<Vec<SubstitutionRow>, DataError> {
    load_substitution_rows_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_stat_lines(path: &Path) -> Result<StatLines, DataError> {
    load_stat_lines_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_win_probabilities(path: &Path) -> Result<WinProbabilities, DataError> {
    load_win_probabilities_from_reader(open(path)?).map_err(csv_error(path))
}

/// Load every data file named in the config, build rosters and score all
/// stat lines with the configured rules.
///
/// The substitution and win-probability files are optional: an unset path
/// or a missing file means none.
pub fn load_contest(config: &Config) -> Result<ContestData, DataError> {
    let paths = &config.data_paths;
    let year = config.contest.year;
    let weeks = &config.contest.weeks;

    let players = load_players(&config.resolve(&paths.players))?;
    if players.is_empty() {
        return Err(DataError::Validation("players CSV produced zero valid rows".into()));
    }

    let roster_rows = load_roster_rows(&config.resolve(&paths.rosters))?;
    let mut rosters = build_rosters(&roster_rows, &players, year)?;

    let substitutions = match optional_path(config, paths.substitutions.as_deref()) {
        Some(path) => load_substitution_rows(&path)?,
        None => Vec::new(),
    };
    let applied = apply_substitutions(&mut rosters, &substitutions, &players, weeks)?;

    let stat_lines = load_stat_lines(&config.resolve(&paths.stats))?;
    let book = score_stat_lines(&stat_lines, &players, &config.scoring, year)?;

    let win_probabilities = match optional_path(config, paths.win_probabilities.as_deref()) {
        Some(path) => load_win_probabilities(&path)?,
        None => WinProbabilities::new(),
    };

    info!(
        "loaded {} players, {} rosters, {} substitutions, {} stat lines, {} win probabilities",
        players.len(),
        rosters.len(),
        applied,
        stat_lines.len(),
        win_probabilities.len()
    );

    Ok(ContestData {
        players,
        rosters,
        stat_lines,
        book,
        win_probabilities,
    })
}

fn optional_path(config: &Config, path: Option<&str>) -> Option<std::path::PathBuf> {
    let resolved = config.resolve(path?);
    if resolved.is_file() {
        Some(resolved)
    } else {
        info!("optional data file {} not found, skipping", resolved.display());
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
