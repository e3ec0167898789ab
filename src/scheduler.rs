//! Dual-cadence game loop
//!
//! One single-threaded loop drives two independent fixed-rate cadences:
//! frames (render the current state) and ticks (advance the simulation).
//! Each fires when at least one interval has elapsed since it last fired;
//! between checks the loop sleeps until the nearer deadline. Ticks never run
//! while paused, frames always do. Rendering only ever sees `&GameState`.

use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::settings::Settings;
use crate::sim::{Command, GamePhase, GameState, apply_command, tick};

/// Time source for the loop (swappable in tests)
pub trait Clock {
    /// Time since the clock started
    fn now(&self) -> Duration;
    /// Block for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    /// The player quit before the game was decided
    Aborted,
}

impl Outcome {
    /// Terminal outcome for a phase, if the game is decided
    pub fn from_phase(phase: GamePhase) -> Option<Self> {
        match phase {
            GamePhase::Playing => None,
            GamePhase::Won => Some(Outcome::Won),
            GamePhase::Lost => Some(Outcome::Lost),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won => write!(f, "You win!"),
            Outcome::Lost => write!(f, "You lose :("),
            Outcome::Aborted => write!(f, "Game abandoned"),
        }
    }
}

/// Discrete input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveLeft,
    MoveRight,
    Stop,
    TogglePause,
    Quit,
    /// The display changed size (in cells)
    Resize { cols: u16, rows: u16 },
}

impl InputEvent {
    /// The paddle/session command this event maps to (`Quit` and `Resize` have none)
    pub fn command(self) -> Option<Command> {
        match self {
            InputEvent::MoveLeft => Some(Command::MoveLeft),
            InputEvent::MoveRight => Some(Command::MoveRight),
            InputEvent::Stop => Some(Command::Stop),
            InputEvent::TogglePause => Some(Command::TogglePause),
            InputEvent::Quit | InputEvent::Resize { .. } => None,
        }
    }
}

/// Draws the world; never mutates it
pub trait RenderSink {
    fn draw(&mut self, state: &GameState) -> io::Result<()>;
    fn show_outcome(&mut self, outcome: Outcome) -> io::Result<()>;

    /// The display now has `cols` x `rows` cells
    fn resize(&mut self, _cols: u16, _rows: u16) {}
}

/// Non-blocking source of input events
pub trait InputSource {
    /// Every event that arrived since the last poll
    fn poll(&mut self) -> io::Result<Vec<InputEvent>>;
}

/// Frame/tick bookkeeping for the loop
#[derive(Debug, Clone)]
pub struct Scheduler {
    frame_interval: Duration,
    tick_interval: Duration,
    last_frame: Option<Duration>,
    last_tick: Option<Duration>,
}

impl Scheduler {
    pub fn new(frame_interval: Duration, tick_interval: Duration) -> Self {
        Self {
            frame_interval,
            tick_interval,
            last_frame: None,
            last_tick: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.frame_interval(), settings.tick_interval())
    }

    pub fn frame_due(&self, now: Duration) -> bool {
        Self::due(self.last_frame, self.frame_interval, now)
    }

    pub fn tick_due(&self, now: Duration) -> bool {
        Self::due(self.last_tick, self.tick_interval, now)
    }

    pub fn mark_frame(&mut self, now: Duration) {
        self.last_frame = Some(now);
    }

    pub fn mark_tick(&mut self, now: Duration) {
        self.last_tick = Some(now);
    }

    /// Earliest time either cadence could fire (ticks only count when running)
    pub fn next_deadline(&self, ticking: bool) -> Duration {
        let frame = self
            .last_frame
            .map_or(Duration::ZERO, |t| t + self.frame_interval);
        if !ticking {
            return frame;
        }
        let tick = self
            .last_tick
            .map_or(Duration::ZERO, |t| t + self.tick_interval);
        frame.min(tick)
    }

    fn due(last: Option<Duration>, interval: Duration, now: Duration) -> bool {
        last.is_none_or(|t| now.saturating_sub(t) >= interval)
    }
}

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub ticks: u64,
}

/// Run a session until it is won, lost or abandoned
pub fn run<C, S, I, R>(
    state: &mut GameState,
    settings: &Settings,
    rng: &mut R,
    clock: &mut C,
    sink: &mut S,
    input: &mut I,
) -> io::Result<(Outcome, RunStats)>
where
    C: Clock,
    S: RenderSink,
    I: InputSource,
    R: Rng + ?Sized,
{
    let mut scheduler = Scheduler::from_settings(settings);
    let mut stats = RunStats::default();

    let outcome = loop {
        let mut quit = false;
        for event in input.poll()? {
            match event {
                InputEvent::Quit => quit = true,
                InputEvent::Resize { cols, rows } => sink.resize(cols, rows),
                _ => {
                    if let Some(command) = event.command() {
                        apply_command(state, command);
                    }
                }
            }
        }
        if quit {
            break Outcome::Aborted;
        }

        let now = clock.now();
        if scheduler.frame_due(now) {
            scheduler.mark_frame(now);
            sink.draw(state)?;
            stats.frames += 1;
        }
        if !state.paused && scheduler.tick_due(now) {
            scheduler.mark_tick(now);
            tick(state, rng, settings);
            stats.ticks += 1;
        }

        if let Some(outcome) = Outcome::from_phase(state.phase) {
            sink.draw(state)?;
            break outcome;
        }

        let wake = scheduler.next_deadline(!state.paused);
        let now = clock.now();
        if wake > now {
            clock.sleep(wake - now);
        }
    };

    log::info!(
        "Session over: {:?} ({} ticks, {} frames, {} lives left)",
        outcome,
        stats.ticks,
        stats.frames,
        state.lives
    );
    sink.show_outcome(outcome)?;
    Ok((outcome, stats))
}
