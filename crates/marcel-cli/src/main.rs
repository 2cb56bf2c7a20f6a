// Marcel projections entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout carries the written file paths)
// 2. Load config, seeding config/ from defaults/ on first run
// 3. Resolve the season: command-line argument, then config, then this year
// 4. Load tables, project hitters and pitchers, write outputs

use marcel_cli::app;
use marcel_cli::config;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Marcel starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: hitters={}, pitchers={}, output={} ({})",
        config.data.hitters,
        config.data.pitchers,
        config.output.dir,
        config.output.format.extension()
    );

    // 3. Resolve the season
    let season = match app::parse_season_arg(std::env::args().skip(1))? {
        Some(season) => season,
        None => config.season_or_current(),
    };

    // 4. Project and write
    let base_dir = std::env::current_dir().context("failed to read working directory")?;
    let summary = app::run(&config, &base_dir, season)
        .with_context(|| format!("failed to project season {season}"))?;
    for path in &summary.outputs {
        println!("{}", path.display());
    }

    info!(
        "Projected {} hitters and {} pitchers for {}",
        summary.hitters, summary.pitchers, summary.season
    );
    Ok(())
}

/// Initialize tracing to stderr.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marcel_core=info,marcel_cli=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
