// Batch run: load the configured tables, project hitters and pitchers for one
// season and write both projections to the output directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use marcel_core::{Forecaster, PlayerKind, StatTable};

use crate::config::{self, Config};
use crate::output;

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub season: i32,
    pub hitters: usize,
    pub pitchers: usize,
    pub outputs: Vec<PathBuf>,
}

/// Season from the first command-line argument, if one was given.
pub fn parse_season_arg<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Option<i32>> {
    let Some(arg) = args.into_iter().next() else {
        return Ok(None);
    };
    let season: i32 = arg
        .trim()
        .parse()
        .with_context(|| format!("season argument must be a year, got `{arg}`"))?;
    config::validate_season("season", season)?;
    Ok(Some(season))
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn load_table(base_dir: &Path, path: &str) -> anyhow::Result<StatTable> {
    let path = resolve(base_dir, path);
    StatTable::from_path(&path).with_context(|| format!("failed to load {}", path.display()))
}

/// Build a forecaster from the configured data files (relative paths resolve
/// against `base_dir`) and bad-stat lists.
pub fn load_forecaster(config: &Config, base_dir: &Path) -> anyhow::Result<Forecaster> {
    let data = &config.data;
    let mut forecaster = Forecaster::new(
        load_table(base_dir, &data.hitters)?,
        load_table(base_dir, &data.pitchers)?,
    );
    for extra in &data.extra_hitters {
        forecaster.add_hitter_data(load_table(base_dir, extra)?);
    }
    for extra in &data.extra_pitchers {
        forecaster.add_pitcher_data(load_table(base_dir, extra)?);
    }
    info!(
        "Loaded {} hitter rows, {} pitcher rows",
        forecaster.hitters().len(),
        forecaster.pitchers().len()
    );

    forecaster.set_bad_hitting_stats(config.stats.bad_hitting.as_slice());
    forecaster.set_bad_pitching_stats(config.stats.bad_pitching.as_slice());
    Ok(forecaster)
}

/// Project `season` and write `hitters_<season>` and `pitchers_<season>`
/// into the configured output directory.
pub fn run(config: &Config, base_dir: &Path, season: i32) -> anyhow::Result<RunSummary> {
    let forecaster = load_forecaster(config, base_dir)?;
    let settings = &config.projection;

    let hitters = forecaster
        .project_hitters(season, settings.use_default, settings.apply_age)
        .with_context(|| format!("failed to project hitters for {season}"))?;
    let pitchers = forecaster
        .project_pitchers(season, settings.use_default)
        .with_context(|| format!("failed to project pitchers for {season}"))?;

    let out_dir = resolve(base_dir, &config.output.dir);
    let format = config.output.format;
    let outputs = vec![
        output::write_projection(&out_dir, PlayerKind::Hitter, season, format, &hitters)?,
        output::write_projection(&out_dir, PlayerKind::Pitcher, season, format, &pitchers)?,
    ];

    Ok(RunSummary {
        season,
        hitters: hitters.len(),
        pitchers: pitchers.len(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_argument_means_no_override() {
        assert_eq!(parse_season_arg(args(&[])).unwrap(), None);
    }

    #[test]
    fn first_argument_is_the_season() {
        assert_eq!(parse_season_arg(args(&["2020", "ignored"])).unwrap(), Some(2020));
    }

    #[test]
    fn rejects_non_year_and_ancient_seasons() {
        let err = parse_season_arg(args(&["next"])).unwrap_err();
        assert!(err.to_string().contains("must be a year"));
        assert!(parse_season_arg(args(&["1800"])).is_err());
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/marcel");
        assert_eq!(resolve(base, "data/h.csv"), PathBuf::from("/srv/marcel/data/h.csv"));
        assert_eq!(resolve(base, "/tmp/h.csv"), PathBuf::from("/tmp/h.csv"));
    }
}
