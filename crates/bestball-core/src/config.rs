// Configuration loading and parsing (contest.toml, scoring.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::contest::ContestWeeks;
use crate::player::Position;
use crate::rules::{ScoringError, ScoringRules};

/// Shipped default for `config/contest.toml`.
pub const DEFAULT_CONTEST_TOML: &str = include_str!("../defaults/contest.toml");
/// Shipped default for `config/scoring.toml`.
pub const DEFAULT_SCORING_TOML: &str = include_str!("../defaults/scoring.toml");

const CONFIG_FILES: [(&str, &str); 2] = [
    ("contest.toml", DEFAULT_CONTEST_TOML),
    ("scoring.toml", DEFAULT_SCORING_TOML),
];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

impl From<ScoringError> for ConfigError {
    fn from(err: ScoringError) -> Self {
        let field = match &err {
            ScoringError::MissingRule(key) => format!("scoring.{key}"),
            ScoringError::InvalidRule { key, .. } => format!("scoring.{key}"),
        };
        ConfigError::ValidationError {
            field,
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub contest: ContestConfig,
    pub scoring: ScoringRules,
    pub projection: ProjectionConfig,
    pub data_paths: DataPaths,
    /// Directory the config was loaded from; relative data paths resolve here.
    pub base_dir: PathBuf,
}

impl Config {
    /// Resolve a configured data path against the config's base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

// ---------------------------------------------------------------------------
// contest.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire contest.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ContestFile {
    contest: ContestConfig,
    #[serde(default)]
    projection: ProjectionConfig,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestConfig {
    pub name: String,
    pub year: u16,
    #[serde(default)]
    pub weeks: ContestWeeks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default)]
    pub position_averages: PositionBaselines,
}

/// Per-position fallback projection, used when a player has no qualifying
/// playoff games. Field names match the TOML keys.
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct PositionBaselines {
    pub QB: f64,
    pub RB: f64,
    pub WR: f64,
    pub TE: f64,
    pub K: f64,
    pub DST: f64,
}

impl PositionBaselines {
    pub fn for_position(&self, position: Position) -> f64 {
        match position {
            Position::QB => self.QB,
            Position::RB => self.RB,
            Position::WR => self.WR,
            Position::TE => self.TE,
            Position::K => self.K,
            Position::DST => self.DST,
        }
    }
}

impl Default for PositionBaselines {
    fn default() -> Self {
        PositionBaselines {
            QB: 18.0,
            RB: 12.0,
            WR: 11.0,
            TE: 8.0,
            K: 8.0,
            DST: 7.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    pub rosters: String,
    pub stats: String,
    #[serde(default)]
    pub substitutions: Option<String>,
    #[serde(default)]
    pub win_probabilities: Option<String>,
}

// ---------------------------------------------------------------------------
// scoring.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ScoringFile {
    scoring: ScoringRules,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/contest.toml` and
/// `config/scoring.toml`, both relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not write defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- contest.toml (required) ---
    let contest_path = config_dir.join("contest.toml");
    let contest_text = read_file(&contest_path)?;
    let contest_file: ContestFile =
        toml::from_str(&contest_text).map_err(|e| ConfigError::ParseError {
            path: contest_path.clone(),
            source: e,
        })?;

    // --- scoring.toml (required) ---
    let scoring_path = config_dir.join("scoring.toml");
    let scoring_text = read_file(&scoring_path)?;
    let scoring_file: ScoringFile =
        toml::from_str(&scoring_text).map_err(|e| ConfigError::ParseError {
            path: scoring_path.clone(),
            source: e,
        })?;

    let config = Config {
        contest: contest_file.contest,
        scoring: scoring_file.scoring,
        projection: contest_file.projection,
        data_paths: contest_file.data_paths,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    debug!(
        "loaded config from {}: {} scoring rules",
        config_dir.display(),
        config.scoring.len()
    );

    Ok(config)
}

/// Ensure every config file exists under `base_dir/config/`.
///
/// A missing file is copied from `base_dir/defaults/` when that file exists,
/// otherwise written from the shipped default. Existing files are never
/// touched. Returns the list of files that were created.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut created = Vec::new();

    for (file_name, shipped) in CONFIG_FILES {
        let target = config_dir.join(file_name);
        let source = defaults_dir.join(file_name);

        let content = if source.is_file() {
            std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read {}: {e}", source.display()),
            })?
        } else {
            shipped.as_bytes().to_vec()
        };

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                info!("created {} from defaults", target.display());
                created.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Already configured, leave it alone
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(created)
}

/// Pick the directory config is loaded from.
///
/// An explicit directory wins. Otherwise the current directory is used when
/// it already has `config/` or `defaults/`, and the platform config directory
/// (e.g. `~/.config/bestball`) when it does not.
pub fn resolve_base_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("config").is_dir() || cwd.join("defaults").is_dir() {
        return Ok(cwd);
    }
    match directories::ProjectDirs::from("", "", "bestball") {
        Some(dirs) => Ok(dirs.config_dir().to_path_buf()),
        None => Ok(cwd),
    }
}

/// Convenience wrapper: resolves the base directory, writes any missing
/// default files, then loads.
pub fn load_config(explicit_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let base_dir = resolve_base_dir(explicit_dir)?;
    ensure_config_files(&base_dir)?;
    load_config_from(&base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.contest.year == 0 {
        return Err(ConfigError::ValidationError {
            field: "contest.year".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.contest.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "contest.name".into(),
            message: "must not be empty".into(),
        });
    }

    config.scoring.validate()?;

    let b = &config.projection.position_averages;
    let baseline_fields: &[(&str, f64)] = &[
        ("position_averages.QB", b.QB),
        ("position_averages.RB", b.RB),
        ("position_averages.WR", b.WR),
        ("position_averages.TE", b.TE),
        ("position_averages.K", b.K),
        ("position_averages.DST", b.DST),
    ];
    for (name, val) in baseline_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a finite value >= 0, got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Fresh base directory with both default files written to config/.
    fn configured_dir() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        ensure_config_files(tmp.path()).unwrap();
        tmp
    }

    #[test]
    fn load_shipped_defaults() {
        let tmp = configured_dir();
        let config = load_config_from(tmp.path()).expect("should load default config");

        assert_eq!(config.contest.name, "Playoff Best Ball");
        assert_eq!(config.contest.year, 2025);
        assert_eq!(config.contest.weeks.as_slice(), &[1, 2, 3, 5]);
        assert_eq!(config.scoring, ScoringRules::standard_ppr());
        assert!((config.projection.position_averages.QB - 18.0).abs() < f64::EPSILON);
        assert!((config.projection.position_averages.DST - 7.0).abs() < f64::EPSILON);
        assert_eq!(config.data_paths.players, "data/players.csv");
        assert_eq!(
            config.data_paths.win_probabilities.as_deref(),
            Some("data/win_probabilities.csv")
        );
        assert_eq!(config.resolve("data/stats.csv"), tmp.path().join("data/stats.csv"));
    }

    #[test]
    fn ensure_config_files_prefers_defaults_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults_dir = tmp.path().join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        let custom = DEFAULT_CONTEST_TOML.replace("year = 2025", "year = 2031");
        fs::write(defaults_dir.join("contest.toml"), custom).unwrap();

        let created = ensure_config_files(tmp.path()).unwrap();
        assert_eq!(created.len(), 2);

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.contest.year, 2031);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let config_dir = tmp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("contest.toml"), "# custom\n").unwrap();

        let created = ensure_config_files(tmp.path()).unwrap();
        assert_eq!(created.len(), 1);
        assert!(created[0].ends_with("scoring.toml"));

        let content = fs::read_to_string(config_dir.join("contest.toml")).unwrap();
        assert_eq!(content, "# custom\n");
    }

    #[test]
    fn custom_weeks_are_loaded() {
        let tmp = configured_dir();
        let path = tmp.path().join("config/contest.toml");
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace("weeks = [1, 2, 3, 5]", "weeks = [1, 2, 3, 4]");
        fs::write(&path, text).unwrap();

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.contest.weeks.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn unordered_weeks_are_a_parse_error() {
        let tmp = configured_dir();
        let path = tmp.path().join("config/contest.toml");
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace("weeks = [1, 2, 3, 5]", "weeks = [5, 1]");
        fs::write(&path, text).unwrap();

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("contest.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
    }

    #[test]
    fn rejects_year_zero() {
        let tmp = configured_dir();
        let path = tmp.path().join("config/contest.toml");
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace("year = 2025", "year = 0");
        fs::write(&path, text).unwrap();

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "contest.year"),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_missing_scoring_rule() {
        let tmp = configured_dir();
        let path = tmp.path().join("config/scoring.toml");
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace("safety  = 2.0\n", "");
        fs::write(&path, text).unwrap();

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "scoring.safety"),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_zero_divisor() {
        let tmp = configured_dir();
        let path = tmp.path().join("config/scoring.toml");
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace("pass_yards_per_point = 25.0", "pass_yards_per_point = 0.0");
        fs::write(&path, text).unwrap();

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "scoring.pass_yards_per_point")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_negative_baseline() {
        let tmp = configured_dir();
        let path = tmp.path().join("config/contest.toml");
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace("TE  = 8.0", "TE  = -1.0");
        fs::write(&path, text).unwrap();

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "position_averages.TE")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn file_not_found_for_missing_scoring_toml() {
        let tmp = configured_dir();
        fs::remove_file(tmp.path().join("config/scoring.toml")).unwrap();

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("scoring.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = configured_dir();
        fs::write(tmp.path().join("config/contest.toml"), "this is not valid [[[ toml").unwrap();

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("contest.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
    }

    #[test]
    fn explicit_base_dir_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let resolved = resolve_base_dir(Some(tmp.path())).unwrap();
        assert_eq!(resolved, tmp.path());
    }

    #[test]
    fn missing_projection_section_uses_default_baselines() {
        let tmp = configured_dir();
        let path = tmp.path().join("config/contest.toml");
        let text = fs::read_to_string(&path).unwrap();
        let start = text.find("# Fallback projections").unwrap();
        let end = text.find("[data_paths]").unwrap();
        let trimmed = format!("{}{}", &text[..start], &text[end..]);
        fs::write(&path, trimmed).unwrap();

        let config = load_config_from(tmp.path()).unwrap();
        assert!((config.projection.position_averages.RB - 12.0).abs() < f64::EPSILON);
    }
}
