// Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bestball_core::contest::Week;

/// Best-ball playoff contest scoring
#[derive(Debug, Parser)]
#[command(name = "bestball")]
#[command(about = "Score a best-ball playoff contest from normalized box scores")]
pub struct Cli {
    /// Directory holding config/ and data/ (default: current directory if it
    /// has config/ or defaults/, else the platform config directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Print JSON instead of a text table
    #[arg(long, global = true)]
    pub json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Rank every roster by best-ball total
    Standings,
    /// Show an owner's optimal lineup
    Lineup {
        /// Roster owner
        #[arg(long)]
        owner: String,
        /// Contest week (all contest weeks when omitted)
        #[arg(long)]
        week: Option<Week>,
    },
    /// Show one player's point breakdown for a week
    Score {
        /// Player id
        #[arg(long)]
        player: String,
        #[arg(long)]
        week: Week,
    },
    /// Project a player's points for an upcoming contest week
    Project {
        /// Player id
        #[arg(long)]
        player: String,
        #[arg(long)]
        week: Week,
    },
    /// Show an owner's roster with per-slot weekly points
    Roster {
        /// Roster owner
        #[arg(long)]
        owner: String,
    },
}
