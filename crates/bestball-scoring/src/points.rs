// Point calculator: one stat line + rule set -> fantasy points with a
// per-category breakdown.

use std::collections::BTreeMap;

use serde::Serialize;

use bestball_core::contest::Week;
use bestball_core::player::{PlayerId, Position};
use bestball_core::rules::{self, pa_tier, ScoringError, ScoringRules, PA_TIERS};
use bestball_core::scores::{round2, PlayerScore};
use bestball_core::stats::{PlayerStats, FG_BUCKETS};

/// Result of scoring one stat line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsBreakdown {
    /// Sum of all category contributions, rounded half-up to 2 decimals.
    pub points: f64,
    /// Every category scored for the position, zeros included, each rounded
    /// to 2 decimals.
    pub breakdown: BTreeMap<String, f64>,
}

/// Running sum that keeps the unrounded total alongside the breakdown.
#[derive(Default)]
struct Tally {
    raw_total: f64,
    breakdown: BTreeMap<String, f64>,
}

impl Tally {
    fn add(&mut self, category: &str, points: f64) {
        self.raw_total += points;
        self.breakdown.insert(category.to_string(), round2(points));
    }

    fn finish(self) -> PointsBreakdown {
        PointsBreakdown {
            points: round2(self.raw_total),
            breakdown: self.breakdown,
        }
    }
}

/// Compute fantasy points for one player's game.
///
/// DST lines score defensive events plus the points-allowed tier; every
/// other position scores passing, rushing, receiving, shared offense and
/// kicking. All rules of the applicable group are read on every call, so an
/// incomplete rule set fails even for a line where the related stat is 0.
pub fn compute_points(
    stats: &PlayerStats,
    position: Position,
    rules: &ScoringRules,
) -> Result<PointsBreakdown, ScoringError> {
    let mut tally = Tally::default();
    match position {
        Position::DST => score_defense(stats, rules, &mut tally)?,
        _ => {
            score_offense(stats, rules, &mut tally)?;
            score_kicking(stats, rules, &mut tally)?;
        }
    }
    Ok(tally.finish())
}

/// Score a game and package it as a storable `PlayerScore`.
pub fn score_game(
    player_id: &PlayerId,
    position: Position,
    week: Week,
    year: u16,
    stats: &PlayerStats,
    rules: &ScoringRules,
) -> Result<PlayerScore, ScoringError> {
    let PointsBreakdown { points, breakdown } = compute_points(stats, position, rules)?;
    Ok(PlayerScore {
        player_id: player_id.clone(),
        week,
        year,
        points,
        breakdown,
    })
}

fn score_offense(
    stats: &PlayerStats,
    rules: &ScoringRules,
    tally: &mut Tally,
) -> Result<(), ScoringError> {
    // Passing
    tally.add(
        "pass_yards",
        stats.pass_yards as f64 / rules.divisor(rules::PASS_YARDS_PER_POINT)?,
    );
    tally.add("pass_td", stats.pass_td as f64 * rules.coefficient(rules::PASS_TD)?);
    tally.add("pass_int", -(stats.pass_int as f64) * rules.penalty(rules::PASS_INT)?);

    // Rushing
    tally.add(
        "rush_yards",
        stats.rush_yards as f64 / rules.divisor(rules::RUSH_YARDS_PER_POINT)?,
    );
    tally.add("rush_td", stats.rush_td as f64 * rules.coefficient(rules::RUSH_TD)?);

    // Receiving
    tally.add(
        "rec_yards",
        stats.rec_yards as f64 / rules.divisor(rules::REC_YARDS_PER_POINT)?,
    );
    tally.add("rec_td", stats.rec_td as f64 * rules.coefficient(rules::REC_TD)?);
    tally.add("receptions", stats.receptions as f64 * rules.coefficient(rules::PPR)?);

    // Shared
    tally.add(
        "two_pt_conv",
        stats.two_pt_conv as f64 * rules.coefficient(rules::TWO_PT_CONV)?,
    );
    tally.add(
        "fumbles_lost",
        -(stats.fumbles_lost as f64) * rules.penalty(rules::FUMBLE_LOST)?,
    );
    tally.add("return_td", stats.return_td as f64 * rules.coefficient(rules::RETURN_TD)?);

    Ok(())
}

fn score_kicking(
    stats: &PlayerStats,
    rules: &ScoringRules,
    tally: &mut Tally,
) -> Result<(), ScoringError> {
    for (key, _, _) in FG_BUCKETS {
        let made = stats.fg_made_in_bucket(key);
        tally.add(key, made as f64 * rules.coefficient(key)?);
    }
    tally.add("fg_miss", -(stats.fg_missed_count() as f64) * rules.penalty(rules::FG_MISS)?);
    tally.add("xp_made", stats.xp_made as f64 * rules.coefficient(rules::XP_MADE)?);
    tally.add("xp_miss", -(stats.xp_missed as f64) * rules.penalty(rules::XP_MISS)?);
    Ok(())
}

fn score_defense(
    stats: &PlayerStats,
    rules: &ScoringRules,
    tally: &mut Tally,
) -> Result<(), ScoringError> {
    tally.add("sacks", stats.sacks as f64 * rules.coefficient(rules::SACK)?);
    tally.add("def_int", stats.def_int as f64 * rules.coefficient(rules::DEF_INT)?);
    tally.add(
        "fumbles_recovered",
        stats.fumbles_recovered as f64 * rules.coefficient(rules::FUM_REC)?,
    );
    tally.add("def_td", stats.def_td as f64 * rules.coefficient(rules::DST_TD)?);
    tally.add("safeties", stats.safeties as f64 * rules.coefficient(rules::SAFETY)?);
    tally.add(
        "blocked_kicks",
        stats.blocked_kicks as f64 * rules.coefficient(rules::BLOCK)?,
    );

    // Every tier is read so a gap in the tier table is caught on any line.
    let tier = stats.points_allowed.map(pa_tier);
    let mut tier_bonus = None;
    for (key, _, _) in PA_TIERS {
        let value = rules.coefficient(key)?;
        if Some(key) == tier {
            tier_bonus = Some(value);
        }
    }
    // Unreported points allowed earns nothing, not a shutout.
    if let Some(bonus) = tier_bonus {
        tally.add("points_allowed", bonus);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestball_core::stats::FieldGoal;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn breakdown_sum(result: &PointsBreakdown) -> f64 {
        result.breakdown.values().sum()
    }

    #[test]
    fn quarterback_scenario() {
        let rules = ScoringRules::standard_ppr()
            .with(rules::PASS_YARDS_PER_POINT, 25.0)
            .with(rules::PASS_TD, 4.0)
            .with(rules::PASS_INT, -2.0);
        let stats = PlayerStats {
            pass_yards: 300,
            pass_td: 3,
            pass_int: 1,
            ..Default::default()
        };
        let result = compute_points(&stats, Position::QB, &rules).unwrap();
        assert!(approx_eq(result.points, 22.0, 1e-9), "got {}", result.points);
        assert_eq!(result.breakdown["pass_yards"], 12.0);
        assert_eq!(result.breakdown["pass_td"], 12.0);
        assert_eq!(result.breakdown["pass_int"], -2.0);
        assert_eq!(result.breakdown["rush_yards"], 0.0);
        assert_eq!(result.breakdown["fg_50_plus"], 0.0);
        assert!(!result.breakdown.contains_key("sacks"));
    }

    #[test]
    fn positive_interception_coefficient_still_subtracts() {
        let rules = ScoringRules::standard_ppr().with(rules::PASS_INT, 2.0);
        let stats = PlayerStats {
            pass_int: 2,
            ..Default::default()
        };
        let result = compute_points(&stats, Position::QB, &rules).unwrap();
        assert!(approx_eq(result.points, -4.0, 1e-9));
    }

    #[test]
    fn single_category_lines_score_exactly() {
        let rules = ScoringRules::standard_ppr();
        let cases: Vec<(PlayerStats, f64)> = vec![
            (PlayerStats { rush_yards: 87, ..Default::default() }, 8.7),
            (PlayerStats { rush_td: 2, ..Default::default() }, 12.0),
            (PlayerStats { receptions: 7, ..Default::default() }, 7.0),
            (PlayerStats { rec_yards: 113, ..Default::default() }, 11.3),
            (PlayerStats { rec_td: 1, ..Default::default() }, 6.0),
            (PlayerStats { two_pt_conv: 1, ..Default::default() }, 2.0),
            (PlayerStats { fumbles_lost: 1, ..Default::default() }, -2.0),
            (PlayerStats { return_td: 1, ..Default::default() }, 6.0),
            (PlayerStats { xp_made: 4, ..Default::default() }, 4.0),
        ];
        for (stats, expected) in cases {
            let result = compute_points(&stats, Position::RB, &rules).unwrap();
            assert!(
                approx_eq(result.points, expected, 1e-9),
                "expected {expected}, got {} for {stats:?}",
                result.points
            );
            let non_zero = result.breakdown.values().filter(|v| **v != 0.0).count();
            assert_eq!(non_zero, 1, "{:?}", result.breakdown);
            assert!(approx_eq(breakdown_sum(&result), result.points, 1e-9));
        }
    }

    #[test]
    fn negative_rushing_yards_cost_points() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            rush_yards: -6,
            ..Default::default()
        };
        let result = compute_points(&stats, Position::QB, &rules).unwrap();
        assert!(approx_eq(result.points, -0.6, 1e-9));
    }

    #[test]
    fn kicker_buckets_and_misses() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            field_goals: vec![
                FieldGoal::made(19),
                FieldGoal::made(20),
                FieldGoal::made(39),
                FieldGoal::made(40),
                FieldGoal::made(50),
                FieldGoal::missed(55),
                FieldGoal::missed(31),
            ],
            xp_made: 2,
            xp_missed: 1,
            ..Default::default()
        };
        let result = compute_points(&stats, Position::K, &rules).unwrap();
        // 3 + 3 + 3 + 4 + 5 - 2 + 2 - 1
        assert!(approx_eq(result.points, 17.0, 1e-9), "got {}", result.points);
        assert_eq!(result.breakdown["fg_0_19"], 3.0);
        assert_eq!(result.breakdown["fg_50_plus"], 5.0);
        assert_eq!(result.breakdown["fg_miss"], -2.0);
        assert_eq!(result.breakdown["xp_miss"], -1.0);
    }

    #[test]
    fn defense_events_and_tier() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            sacks: 4,
            def_int: 2,
            fumbles_recovered: 1,
            def_td: 1,
            safeties: 1,
            blocked_kicks: 1,
            points_allowed: Some(10),
            ..Default::default()
        };
        let result = compute_points(&stats, Position::DST, &rules).unwrap();
        // 4 + 4 + 2 + 6 + 2 + 2 + tier(7-13)=4
        assert!(approx_eq(result.points, 24.0, 1e-9), "got {}", result.points);
        assert_eq!(result.breakdown["points_allowed"], 4.0);
    }

    #[test]
    fn points_allowed_tiers_are_non_increasing() {
        let rules = ScoringRules::standard_ppr();
        let mut previous = f64::INFINITY;
        for allowed in 0..=60 {
            let stats = PlayerStats {
                points_allowed: Some(allowed),
                ..Default::default()
            };
            let points = compute_points(&stats, Position::DST, &rules).unwrap().points;
            assert!(points <= previous, "tier bonus rose at {allowed} allowed");
            previous = points;
        }
    }

    #[test]
    fn shutout_bonus_only_for_defense() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            points_allowed: Some(0),
            ..Default::default()
        };
        let wr = compute_points(&stats, Position::WR, &rules).unwrap();
        let dst = compute_points(&stats, Position::DST, &rules).unwrap();
        assert_eq!(wr.points, 0.0);
        assert!(!wr.breakdown.contains_key("points_allowed"));
        assert!(approx_eq(dst.points, 10.0, 1e-9));
    }

    #[test]
    fn unreported_points_allowed_earns_no_tier_bonus() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            sacks: 2,
            points_allowed: None,
            ..Default::default()
        };
        let result = compute_points(&stats, Position::DST, &rules).unwrap();
        assert!(approx_eq(result.points, 2.0, 1e-9), "got {}", result.points);
        assert!(!result.breakdown.contains_key("points_allowed"));

        // Tier rules are still read.
        let broken = rules.without("pa_0");
        assert_eq!(
            compute_points(&stats, Position::DST, &broken),
            Err(ScoringError::MissingRule("pa_0".into()))
        );
    }

    #[test]
    fn zero_value_tier_stays_in_breakdown() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            points_allowed: Some(24),
            ..Default::default()
        };
        let result = compute_points(&stats, Position::DST, &rules).unwrap();
        assert_eq!(result.points, 0.0);
        assert_eq!(result.breakdown.get("points_allowed"), Some(&0.0));
        assert_eq!(result.breakdown.get("sacks"), Some(&0.0));
        assert!(!result.breakdown.contains_key("pass_yards"));
    }

    #[test]
    fn defense_ignores_offensive_fields() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            rush_yards: 100,
            points_allowed: Some(24),
            ..Default::default()
        };
        let result = compute_points(&stats, Position::DST, &rules).unwrap();
        assert_eq!(result.points, 0.0);
    }

    #[test]
    fn missing_rule_fails_even_when_stat_is_zero() {
        let rules = ScoringRules::standard_ppr().without(rules::XP_MISS);
        let stats = PlayerStats {
            pass_yards: 250,
            ..Default::default()
        };
        assert_eq!(
            compute_points(&stats, Position::QB, &rules),
            Err(ScoringError::MissingRule("xp_miss".into()))
        );
        // Defense does not read kicking rules.
        assert!(compute_points(&stats, Position::DST, &rules).is_ok());
    }

    #[test]
    fn zero_divisor_fails() {
        let rules = ScoringRules::standard_ppr().with(rules::REC_YARDS_PER_POINT, 0.0);
        let stats = PlayerStats::default();
        assert!(matches!(
            compute_points(&stats, Position::WR, &rules),
            Err(ScoringError::InvalidRule { .. })
        ));
    }

    #[test]
    fn breakdown_sums_to_total_within_rounding() {
        let rules = ScoringRules::standard_ppr().with(rules::PPR, 0.5);
        let stats = PlayerStats {
            pass_yards: 17,
            rush_yards: 33,
            receptions: 3,
            rec_yards: 41,
            rec_td: 1,
            fumbles_lost: 1,
            ..Default::default()
        };
        let result = compute_points(&stats, Position::RB, &rules).unwrap();
        let tolerance = 0.005 * (result.breakdown.len() as f64 + 1.0);
        assert!(approx_eq(breakdown_sum(&result), result.points, tolerance));
        // 0.68 + 3.3 + 1.5 + 4.1 + 6 - 2
        assert!(approx_eq(result.points, 13.58, 1e-9), "got {}", result.points);
    }

    #[test]
    fn compute_points_is_idempotent() {
        let rules = ScoringRules::standard_ppr();
        let stats = PlayerStats {
            pass_yards: 281,
            pass_td: 2,
            rush_yards: 44,
            rush_td: 1,
            fumbles_lost: 1,
            ..Default::default()
        };
        let first = compute_points(&stats, Position::QB, &rules).unwrap();
        let second = compute_points(&stats, Position::QB, &rules).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn more_rushing_yards_never_lowers_points() {
        let rules = ScoringRules::standard_ppr();
        let mut previous = f64::NEG_INFINITY;
        for yards in -20..200 {
            let stats = PlayerStats {
                rush_yards: yards,
                receptions: 2,
                rec_yards: 15,
                ..Default::default()
            };
            let points = compute_points(&stats, Position::RB, &rules).unwrap().points;
            assert!(points >= previous, "points fell at {yards} rushing yards");
            previous = points;
        }
    }

    #[test]
    fn score_game_wraps_result() {
        let rules = ScoringRules::standard_ppr();
        let id = PlayerId::new("wr1");
        let stats = PlayerStats {
            receptions: 9,
            rec_yards: 131,
            rec_td: 2,
            ..Default::default()
        };
        let score = score_game(&id, Position::WR, 2, 2025, &stats, &rules).unwrap();
        assert_eq!(score.player_id, id);
        assert_eq!(score.week, 2);
        assert_eq!(score.year, 2025);
        assert!(approx_eq(score.points, 34.1, 1e-9));
        assert_eq!(score.breakdown["receptions"], 9.0);
        assert_eq!(score.breakdown["rec_td"], 12.0);
    }
}
