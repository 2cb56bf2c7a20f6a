// Configuration loading and validation (marcel.toml).

use chrono::Datelike;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use marcel_core::PlayerKind;

use crate::output::OutputFormat;

/// Earliest season with recorded major-league statistics.
pub const FIRST_SEASON: i32 = 1874;

const CONFIG_FILE: &str = "marcel.toml";

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

// ---------------------------------------------------------------------------
// marcel.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataPaths,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    pub output: OutputConfig,
}

/// Input CSVs. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub hitters: String,
    pub pitchers: String,
    /// Appended to the main tables (another league, a partial season, ...).
    #[serde(default)]
    pub extra_hitters: Vec<String>,
    #[serde(default)]
    pub extra_pitchers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    /// Season to project. Omitted means the current calendar year.
    #[serde(default)]
    pub season: Option<i32>,
    /// Regress toward the built-in league rows instead of a mean computed
    /// from the loaded data.
    #[serde(default)]
    pub use_default: bool,
    #[serde(default = "default_true")]
    pub apply_age: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            season: None,
            use_default: false,
            apply_age: true,
        }
    }
}

/// Stats treated as harmful by the age curve.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_bad_hitting")]
    pub bad_hitting: Vec<String>,
    #[serde(default = "default_bad_pitching")]
    pub bad_pitching: Vec<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            bad_hitting: default_bad_hitting(),
            bad_pitching: default_bad_pitching(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_true() -> bool {
    true
}

fn default_bad_hitting() -> Vec<String> {
    PlayerKind::Hitter.default_bad_stats().iter().map(|s| s.to_string()).collect()
}

fn default_bad_pitching() -> Vec<String> {
    PlayerKind::Pitcher.default_bad_stats().iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// The configured season, or the current year when none is set.
    pub fn season_or_current(&self) -> i32 {
        self.projection
            .season
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/marcel.toml` relative to `base_dir`.
///
/// Does not seed defaults; `load_config()` does.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Copy `defaults/marcel.toml` to `config/marcel.toml` unless a config is
/// already in place. Returns the seeded path, or `None` when nothing was
/// copied. An existing config is never overwritten.
pub fn seed_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let content = std::fs::read(&source).map_err(|e| seed_error("read", &source, e))?;
    std::fs::create_dir_all(&config_dir).map_err(|e| seed_error("create", &config_dir, e))?;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(seed_error("create", &target, e)),
    };
    std::io::Write::write_all(&mut dest, &content).map_err(|e| seed_error("write", &target, e))?;

    Ok(Some(target))
}

/// Load config relative to the current working directory, seeding
/// `config/marcel.toml` from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    seed_config(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seed_error(action: &str, path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("failed to {action} {}: {e}", path.display()),
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a season from any source (config or command line).
pub fn validate_season(field: &str, season: i32) -> Result<(), ConfigError> {
    if season < FIRST_SEASON {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!("must be {FIRST_SEASON} or later, got {season}"),
        });
    }
    Ok(())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(season) = config.projection.season {
        validate_season("projection.season", season)?;
    }

    let data = &config.data;
    let paths = [("data.hitters", &data.hitters), ("data.pitchers", &data.pitchers)];
    for (name, path) in paths {
        if path.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.into(),
                message: "must not be empty".into(),
            });
        }
    }
    let extras = [
        ("data.extra_hitters", &data.extra_hitters),
        ("data.extra_pitchers", &data.extra_pitchers),
    ];
    for (name, list) in extras {
        if list.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                field: name.into(),
                message: "must not contain empty paths".into(),
            });
        }
    }

    // PA/AB and TBF/IP are the rate denominators; aging them would shift
    // every other stat.
    let bad_lists = [
        ("stats.bad_hitting", &config.stats.bad_hitting, PlayerKind::Hitter),
        ("stats.bad_pitching", &config.stats.bad_pitching, PlayerKind::Pitcher),
    ];
    for (name, list, kind) in bad_lists {
        let exempt = kind.age_exempt_columns();
        if let Some(stat) = list.iter().find(|s| exempt.contains(&s.as_str())) {
            return Err(ConfigError::ValidationError {
                field: name.into(),
                message: format!("`{stat}` is a playing-time denominator and is never aged"),
            });
        }
    }

    if config.output.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "output.dir".into(),
            message: "must not be empty".into(),
        });
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

    /// Helper: returns the marcel-cli crate root (works whether `cargo test`
    /// runs from the crate root or the workspace root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/marcel-cli/defaults").exists() {
            cwd.join("crates/marcel-cli")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Temp dir holding `config/marcel.toml` with `text`.
    fn config_dir_with(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(format!("marcel_config_{name}"));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), text).unwrap();
        tmp
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap()
    }

    fn expect_validation_field(err: ConfigError, expected: &str) {
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_default_config() {
        let tmp = config_dir_with("defaults", &default_text());
        let config = load_config_from(&tmp).expect("should load default config");

        assert_eq!(config.data.hitters, "data/hitters.csv");
        assert_eq!(config.data.pitchers, "data/pitchers.csv");
        assert!(config.data.extra_hitters.is_empty());
        assert_eq!(config.projection.season, Some(2019));
        assert!(!config.projection.use_default);
        assert!(config.projection.apply_age);
        assert_eq!(config.stats.bad_hitting, vec!["SO", "CS", "GDP", "SH"]);
        assert_eq!(config.stats.bad_pitching.len(), 8);
        assert_eq!(config.output.dir, "projections");
        assert_eq!(config.output.format, OutputFormat::Csv);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seed_config_copies_once_and_keeps_edits() {
        let tmp = std::env::temp_dir().join("marcel_config_seed");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), default_text()).unwrap();

        let target = tmp.join("config").join(CONFIG_FILE);
        assert_eq!(seed_config(&tmp).unwrap(), Some(target.clone()));
        assert_eq!(fs::read_to_string(&target).unwrap(), default_text());

        // A second run leaves the edited copy alone.
        let edited = default_text().replace("season = 2019", "season = 2020");
        fs::write(&target, &edited).unwrap();
        assert_eq!(seed_config(&tmp).unwrap(), None);
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.projection.season, Some(2020));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_config_needs_no_defaults() {
        let tmp = config_dir_with("no_defaults", &default_text());
        assert_eq!(seed_config(&tmp).unwrap(), None);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_defaults_and_config_are_an_error() {
        let tmp = std::env::temp_dir().join("marcel_config_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        match seed_config(&tmp) {
            Err(ConfigError::DefaultsCopyError { message }) => {
                assert!(message.contains("marcel.toml"), "{message}")
            }
            other => panic!("expected DefaultsCopyError, got: {other:?}"),
        }
        assert!(!tmp.join("config").exists());
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::FileNotFound { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let text = r#"
[data]
hitters = "h.csv"
pitchers = "p.csv"

[output]
dir = "out"
"#;
        let tmp = config_dir_with("minimal", text);
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.projection.season, None);
        assert!(config.projection.apply_age);
        assert_eq!(config.stats.bad_hitting, default_bad_hitting());
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert!(config.season_or_current() >= 2024);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_early_season() {
        let text = default_text().replace("season = 2019", "season = 1850");
        let tmp = config_dir_with("early_season", &text);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "projection.season");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_data_path() {
        let text = default_text().replace("pitchers = \"data/pitchers.csv\"", "pitchers = \"\"");
        let tmp = config_dir_with("empty_path", &text);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "data.pitchers");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_denominator_as_bad_stat() {
        let text = default_text().replace("bad_hitting = [\"SO\"", "bad_hitting = [\"PA\", \"SO\"");
        let tmp = config_dir_with("bad_denominator", &text);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "stats.bad_hitting");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_output_format() {
        let text = default_text().replace("format = \"csv\"", "format = \"xlsx\"");
        let tmp = config_dir_with("bad_format", &text);
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ParseError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validate_season_boundary() {
        assert!(validate_season("season", FIRST_SEASON).is_ok());
        expect_validation_field(validate_season("season", 1873).unwrap_err(), "season");
    }
}
