mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use jmc_flame_core::config::{Config, DEFAULT_CONFIG_FILE};
use jmc_flame_core::model::FlameSession;
use jmc_flame_core::parsers::parse_jmc;
use jmc_flame_core::svg::render_svg;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Flame graph viewer for Java Mission Control call-tree reports.
#[derive(Debug, Parser)]
#[command(name = "jmc-flame", version)]
struct Cli {
    /// Tab-separated call-tree report (3 spaces of indent per call level).
    path: PathBuf,

    /// Colour rules and view settings.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Write a static SVG flame graph here instead of opening the viewer.
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// SVG width in pixels (overrides the config).
    #[arg(long, requires = "svg")]
    width: Option<f64>,

    /// SVG height in pixels (overrides the config).
    #[arg(long, requires = "svg")]
    height: Option<f64>,
}

fn main() -> Result<()> {
    // Silent by default: anything below warn would scribble over the viewer.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "jmc_flame=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_optional(&cli.config);
    if let Some(width) = cli.width {
        config.view.width = width;
    }
    if let Some(height) = cli.height {
        config.view.height = height;
    }

    let data =
        std::fs::read(&cli.path).with_context(|| format!("failed to read {}", cli.path.display()))?;
    let name = cli
        .path
        .file_name()
        .map_or_else(|| cli.path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let forest =
        parse_jmc(&data, &name).with_context(|| format!("failed to parse {}", cli.path.display()))?;

    match cli.svg {
        Some(out) => {
            let session =
                FlameSession::new(forest, config.view.viewport(), config.view.orientation)?;
            let commands = session.render(&config.colors, &config.labels);
            let svg = render_svg(&commands, config.view.width, config.view.height);
            std::fs::write(&out, svg)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), "wrote flame graph");
        }
        None => renderer::run(forest, &config)?,
    }
    Ok(())
}
