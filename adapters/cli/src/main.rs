#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs snake-pilot episodes headlessly.

mod session;
mod settings;
mod text_backend;

use std::{cell::RefCell, io, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use snake_pilot_core::Command;
use snake_pilot_rendering::{
    FrameInput, GridPresentation, Key, Palette, Presentation, RenderingBackend,
};
use snake_pilot_world::{self as world, query, World};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    session::{Session, Stats},
    settings::Overrides,
    text_backend::{FrameStyle, TextBackend},
};

#[derive(Debug, Parser)]
#[command(name = "snake-pilot")]
#[command(version, about = "Toroidal snake simulation with a breadth-first autopilot")]
struct Cli {
    /// Side length of the square grid
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    size: Option<u32>,

    /// Number of obstacles placed per episode
    #[arg(long)]
    obstacles: Option<usize>,

    /// Seed for every random placement
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate before stopping
    #[arg(long, default_value_t = 500)]
    ticks: u64,

    /// Let the autopilot steer from the first tick
    #[arg(long)]
    autopilot: bool,

    /// Sleep between ticks at the score-dependent tick rate
    #[arg(long)]
    paced: bool,

    /// Print every frame as a glyph grid
    #[arg(long)]
    render: bool,

    /// Print frames tinted with the palette through ANSI colors (implies --render)
    #[arg(long)]
    color: bool,

    /// Start a new episode whenever one ends instead of stopping
    #[arg(long)]
    auto_restart: bool,

    /// Comma-separated key presses fed one per tick (up, down, left, right, a, r, q)
    #[arg(long, value_delimiter = ',')]
    inputs: Vec<Key>,

    /// TOML file with the world configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Entry point for the snake-pilot command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snake_pilot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = settings::load(
        cli.config.as_deref(),
        Overrides {
            size: cli.size,
            obstacles: cli.obstacles,
            seed: cli.seed,
        },
    )?;

    let mut world = World::new(config).context("failed to set up the first episode")?;
    if cli.autopilot {
        let mut events = Vec::new();
        world::apply(&mut world, Command::ToggleAutopilot, &mut events)
            .context("failed to enable the autopilot")?;
    }

    let size = query::grid(&world);
    let grid = GridPresentation::new(size.columns(), size.rows())
        .context("failed to describe the grid")?;

    let session = Rc::new(RefCell::new(Session::new(
        world,
        grid,
        cli.ticks,
        cli.auto_restart,
    )));
    let presentation = Presentation::new(
        "snake-pilot",
        Palette::default(),
        session.borrow().scene(),
    );
    let inputs: Vec<FrameInput> = cli
        .inputs
        .iter()
        .map(|key| {
            let mut input = FrameInput::default();
            input.press(*key);
            input
        })
        .collect();

    let style = if cli.color {
        FrameStyle::Colored
    } else if cli.render {
        FrameStyle::Plain
    } else {
        FrameStyle::Hidden
    };

    let driver = Rc::clone(&session);
    TextBackend::new(io::stdout().lock(), cli.paced, style, inputs).run(
        presentation,
        move |_, input, scene| driver.borrow_mut().frame(input, scene),
    )?;

    let stats = session
        .borrow()
        .outcome()
        .context("goal placement failed mid-run")?;
    report(&stats);
    Ok(())
}

fn report(stats: &Stats) {
    let outcome = match stats.last_cause {
        Some(cause) => format!("episode over ({cause:?})"),
        None => "running".to_owned(),
    };
    info!(ticks = stats.ticks, episodes = stats.episodes, "run finished");
    println!(
        "ticks: {}  episodes: {}  goals: {}  best score: {}  last episode: {}",
        stats.ticks, stats.episodes, stats.goals, stats.best_score, outcome
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_into_overrides() {
        let cli = Cli::try_parse_from([
            "snake-pilot",
            "--size",
            "12",
            "--seed",
            "5",
            "--autopilot",
            "--inputs",
            "up,a,q",
            "--color",
        ])
        .expect("valid flags");

        assert_eq!(cli.size, Some(12));
        assert_eq!(cli.seed, Some(5));
        assert_eq!(cli.ticks, 500);
        assert!(cli.autopilot);
        assert!(cli.color);
        assert!(!cli.render);
        assert_eq!(cli.inputs.len(), 3);
        assert_eq!(cli.inputs[2], Key::Quit);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(Cli::try_parse_from(["snake-pilot", "--size", "0"]).is_err());
    }

    #[test]
    fn unknown_input_key_is_rejected() {
        assert!(Cli::try_parse_from(["snake-pilot", "--inputs", "up,jump"]).is_err());
    }
}
