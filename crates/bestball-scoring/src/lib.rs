// Scoring engine: fantasy points, substitution-aware aggregation, best-ball
// lineups, projections and standings. Everything here is pure: callers pass
// in loaded data and get values back, with no I/O and no logging.

pub mod aggregate;
pub mod lineup;
pub mod points;
pub mod projection;
pub mod standings;

pub use aggregate::{roster_total, slot_points, SlotAggregator};
pub use lineup::{
    candidates_for_week, lineup_for_week, optimal_lineup, season_lineups, total_best_ball_points, BenchPlayer,
    BestBallLineup, LineupCandidate, Starter,
};
pub use points::{compute_points, score_game, PointsBreakdown};
pub use projection::{
    expected_value, project, project_player, project_roster, Confidence, PastGame, PlayerProjection, ProjectionBasis,
    ProjectionResult, SlotProjection, StatLines, WinProbabilities,
};
pub use standings::{standings, Standing};
