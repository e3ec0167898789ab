//! Level file loading
//!
//! A level is three counted sections: rectangles (paddle, walls, bottom
//! wall, bricks), pending power-ups, then balls. Any malformed line fails the
//! whole load; there is no partial world.
//!
//! ```text
//! <N_bricks>
//!   Paddle <height> <width> <x> <y> <leftBound> <rightBound> <speed>
//!   Wall <height> <width> <x> <y>
//!   BottomWall <height> <width> <x> <y>
//!   <label> <height> <width> <x> <y> <durability 1..4>
//! <N_powerups>
//!   [<label>] <type> <minX> <maxX>
//! <N_balls>
//!   <label> <radius> <x> <y> <vx> <vy>
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use glam::DVec2;

use crate::palette;
use crate::settings::Settings;
use crate::sim::{Circle, GameState, PendingPowerUp, PowerUpKind, Rect, RectKind};

/// Highest durability a brick may start with
pub const MAX_DURABILITY: i32 = 4;

/// What was wrong with a level line
#[derive(Debug, Clone, PartialEq)]
pub enum LevelErrorKind {
    /// The file ended before the named item
    UnexpectedEof { expected: &'static str },
    /// A line ran out of tokens
    MissingToken { field: &'static str },
    /// A token did not parse as the expected number
    BadNumber { field: &'static str, token: String },
    /// Width, height or radius was zero or negative
    NonPositiveSize,
    /// Brick durability outside 1..=4
    DurabilityOutOfRange(i32),
    /// Paddle travel bounds narrower than the paddle
    BadPaddleBounds { left: i32, right: i32, width: i32 },
    /// Power-up spawn range with min above max
    BadSpawnRange { min_x: i32, max_x: i32 },
    NoPaddle,
    DuplicatePaddle,
    NoBalls,
}

impl fmt::Display for LevelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelErrorKind::UnexpectedEof { expected } => {
                write!(f, "unexpected end of file, expected {expected}")
            }
            LevelErrorKind::MissingToken { field } => write!(f, "missing {field}"),
            LevelErrorKind::BadNumber { field, token } => {
                write!(f, "invalid {field} {token:?}")
            }
            LevelErrorKind::NonPositiveSize => write!(f, "sizes must be positive"),
            LevelErrorKind::DurabilityOutOfRange(d) => {
                write!(f, "durability {d} outside 1..={MAX_DURABILITY}")
            }
            LevelErrorKind::BadPaddleBounds { left, right, width } => write!(
                f,
                "paddle bounds {left}..{right} cannot hold a paddle of width {width}"
            ),
            LevelErrorKind::BadSpawnRange { min_x, max_x } => {
                write!(f, "spawn range {min_x}..{max_x} is empty")
            }
            LevelErrorKind::NoPaddle => write!(f, "level has no paddle"),
            LevelErrorKind::DuplicatePaddle => write!(f, "level has more than one paddle"),
            LevelErrorKind::NoBalls => write!(f, "level has no balls"),
        }
    }
}

/// Level load failure
#[derive(Debug)]
pub enum LevelError {
    /// The file could not be read
    Io { path: PathBuf, source: io::Error },
    /// Line `line` (1-based) is malformed
    Parse { line: usize, kind: LevelErrorKind },
}

impl LevelError {
    fn at(line: usize, kind: LevelErrorKind) -> Self {
        LevelError::Parse { line, kind }
    }

    /// The parse problem, if this was not an I/O error
    pub fn kind(&self) -> Option<&LevelErrorKind> {
        match self {
            LevelError::Parse { kind, .. } => Some(kind),
            LevelError::Io { .. } => None,
        }
    }
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io { path, source } => {
                write!(f, "cannot read level {}: {source}", path.display())
            }
            LevelError::Parse { line, kind } => write!(f, "line {line}: {kind}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io { source, .. } => Some(source),
            LevelError::Parse { .. } => None,
        }
    }
}

/// Read and parse a level file
pub fn load(path: &Path, settings: &Settings) -> Result<GameState, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state = parse(&text, settings)?;
    log::info!(
        "Loaded level {}: {} rects ({} bricks), {} pending power-ups, {} balls",
        path.display(),
        state.rects.len(),
        state.durability.len(),
        state.pending.len(),
        state.ball_count()
    );
    Ok(state)
}

/// Build the initial world from level text
pub fn parse(text: &str, settings: &Settings) -> Result<GameState, LevelError> {
    let mut lines = LineReader::new(text);
    let mut state = GameState::new(settings.initial_lives);

    let rect_count = lines.count("rectangle count")?;
    for _ in 0..rect_count {
        let mut tokens = lines.tokens("rectangle line")?;
        parse_rect(&mut state, &mut tokens)?;
    }

    let powerup_count = lines.count("power-up count")?;
    for _ in 0..powerup_count {
        let mut tokens = lines.tokens("power-up line")?;
        let pending = parse_powerup(&mut tokens)?;
        state.pending.push_back(pending);
    }

    let ball_count = lines.count("ball count")?;
    for _ in 0..ball_count {
        let mut tokens = lines.tokens("ball line")?;
        tokens.word("label")?;
        let radius: i32 = tokens.number("radius")?;
        let x = tokens.real("x position")?;
        let y = tokens.real("y position")?;
        let vx = tokens.real("x velocity")?;
        let vy = tokens.real("y velocity")?;
        if radius <= 0 {
            return Err(tokens.error(LevelErrorKind::NonPositiveSize));
        }
        state.add_ball(Circle::new(
            radius,
            DVec2::new(x, y),
            DVec2::new(vx, vy),
            palette::BALL,
        ));
    }

    let end = lines.line;
    if state.paddle_id.is_none() {
        return Err(LevelError::at(end, LevelErrorKind::NoPaddle));
    }
    if state.ball_count() == 0 {
        return Err(LevelError::at(end, LevelErrorKind::NoBalls));
    }
    Ok(state)
}

fn parse_rect(state: &mut GameState, tokens: &mut Tokens<'_>) -> Result<(), LevelError> {
    let label = tokens.word("rectangle type")?;
    let height: i32 = tokens.number("height")?;
    let width: i32 = tokens.number("width")?;
    let x = tokens.real("x position")?;
    let y = tokens.real("y position")?;
    if width <= 0 || height <= 0 {
        return Err(tokens.error(LevelErrorKind::NonPositiveSize));
    }
    let pos = DVec2::new(x, y);

    match label {
        "Paddle" => {
            let left: i32 = tokens.number("left bound")?;
            let right: i32 = tokens.number("right bound")?;
            let speed = tokens.real("paddle speed")?;
            if i64::from(right) - i64::from(left) < i64::from(width) {
                return Err(tokens.error(LevelErrorKind::BadPaddleBounds { left, right, width }));
            }
            if state.paddle_id.is_some() {
                return Err(tokens.error(LevelErrorKind::DuplicatePaddle));
            }
            let kind = RectKind::Paddle {
                left_bound: left,
                right_bound: right,
            };
            state.add_rect(kind, Rect::new(width, height, pos, palette::PADDLE));
            state.paddle_speed = speed;
        }
        "Wall" => {
            state.add_rect(RectKind::Wall, Rect::new(width, height, pos, palette::WALL));
        }
        "BottomWall" => {
            let rect = Rect::new(width, height, pos, palette::DEATH_LINE);
            state.add_rect(RectKind::DeathLine, rect);
        }
        _ => {
            let durability: i32 = tokens.number("durability")?;
            if !(1..=MAX_DURABILITY).contains(&durability) {
                return Err(tokens.error(LevelErrorKind::DurabilityOutOfRange(durability)));
            }
            state.add_brick(Rect::new(width, height, pos, palette::BRICK), durability);
        }
    }
    Ok(())
}

/// `<type> <minX> <maxX>` or `<label> <type> <minX> <maxX>`
fn parse_powerup(tokens: &mut Tokens<'_>) -> Result<PendingPowerUp, LevelError> {
    let first = tokens.word("power-up type")?;
    let second = tokens.word("spawn x minimum")?;

    let (name, min_x) = match second.parse::<i32>() {
        Ok(min_x) => (first, min_x),
        Err(_) => (second, tokens.number("spawn x minimum")?),
    };
    let max_x: i32 = tokens.number("spawn x maximum")?;
    if min_x > max_x {
        return Err(tokens.error(LevelErrorKind::BadSpawnRange { min_x, max_x }));
    }
    Ok(PendingPowerUp {
        kind: PowerUpKind::from_name(name),
        min_x,
        max_x,
    })
}

/// Line cursor that skips blank lines and remembers the current line number
struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<&'a str, LevelError> {
        for raw in self.lines.by_ref() {
            self.line += 1;
            if !raw.trim().is_empty() {
                return Ok(raw);
            }
        }
        Err(LevelError::at(
            self.line + 1,
            LevelErrorKind::UnexpectedEof { expected },
        ))
    }

    fn tokens(&mut self, expected: &'static str) -> Result<Tokens<'a>, LevelError> {
        let raw = self.next(expected)?;
        Ok(Tokens {
            line: self.line,
            iter: raw.split_whitespace(),
        })
    }

    /// A line holding a single non-negative count
    fn count(&mut self, field: &'static str) -> Result<usize, LevelError> {
        let mut tokens = self.tokens(field)?;
        tokens.number(field)
    }
}

/// Whitespace-separated fields of one line; extra trailing fields are ignored
struct Tokens<'a> {
    line: usize,
    iter: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn error(&self, kind: LevelErrorKind) -> LevelError {
        LevelError::at(self.line, kind)
    }

    fn word(&mut self, field: &'static str) -> Result<&'a str, LevelError> {
        self.iter
            .next()
            .ok_or_else(|| self.error(LevelErrorKind::MissingToken { field }))
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> Result<T, LevelError> {
        let token = self.word(field)?;
        token.parse().map_err(|_| {
            self.error(LevelErrorKind::BadNumber {
                field,
                token: token.to_string(),
            })
        })
    }

    /// A finite real; `NaN` and infinities parse as `f64` but are rejected
    fn real(&mut self, field: &'static str) -> Result<f64, LevelError> {
        let token = self.word(field)?;
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.error(LevelErrorKind::BadNumber {
                field,
                token: token.to_string(),
            })),
        }
    }
}
