//! Brick Breaker entry point
//!
//! Usage: `brick-breaker <level-file> [settings.json]`
//!
//! Logging goes to stderr; set `RUST_LOG` and redirect stderr to a file to
//! keep it off the game screen.

use std::io::{BufWriter, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use brick_breaker::platform::{TerminalGuard, TerminalInput, wait_for_key};
use brick_breaker::renderer::{TerminalRenderer, Viewport};
use brick_breaker::{Settings, SystemClock, level, scheduler};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(level_path) = args.next().map(PathBuf::from) else {
        bail!("usage: brick-breaker <level-file> [settings.json]");
    };
    let settings_path = args.next().map(PathBuf::from);

    let settings = Settings::load(settings_path.as_deref());
    let mut state = level::load(&level_path, &settings)
        .with_context(|| format!("cannot start level {}", level_path.display()))?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut rng = Pcg32::seed_from_u64(seed);
    log::info!("Game initialized with seed: {}", seed);

    let guard = TerminalGuard::enter().context("cannot set up the terminal")?;
    let viewport = Viewport::fit(&settings)?;
    let mut sink = TerminalRenderer::new(BufWriter::new(stdout()), viewport);
    let mut input = TerminalInput::new(guard.keyboard_enhanced());
    let mut clock = SystemClock::new();

    let (outcome, _stats) = scheduler::run(
        &mut state,
        &settings,
        &mut rng,
        &mut clock,
        &mut sink,
        &mut input,
    )?;

    if outcome != scheduler::Outcome::Aborted {
        wait_for_key()?;
    }
    drop(guard);

    println!("{outcome}");
    Ok(())
}
