//! Keyboard input
//!
//! `a`/`d` or the arrow keys steer, `p` toggles pause, `q`/Esc/Ctrl-C quit.
//! Terminal resizes are passed on so the renderer can refit.
//!
//! Terminals with the keyboard enhancement protocol report key releases, so
//! the paddle stops as soon as the key is let go. Classic terminals only
//! repeat presses while a key is held; there the paddle stops once no press
//! has arrived for `HOLD_WINDOW`.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::scheduler::{InputEvent, InputSource};

/// Longer than the slowest OS key-repeat interval
pub const HOLD_WINDOW: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

impl Direction {
    fn of(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Self::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Self::Right),
            _ => None,
        }
    }

    fn event(self) -> InputEvent {
        match self {
            Self::Left => InputEvent::MoveLeft,
            Self::Right => InputEvent::MoveRight,
        }
    }
}

/// Turns raw key events into session events, tracking the held direction
#[derive(Debug, Clone)]
pub struct KeyMapper {
    keyboard_enhanced: bool,
    held: Option<(Direction, Instant)>,
}

impl KeyMapper {
    pub fn new(keyboard_enhanced: bool) -> Self {
        Self {
            keyboard_enhanced,
            held: None,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Option<InputEvent> {
        if let Some(direction) = Direction::of(key.code) {
            return match key.kind {
                KeyEventKind::Press => {
                    self.held = Some((direction, now));
                    Some(direction.event())
                }
                KeyEventKind::Repeat => {
                    self.held = Some((direction, now));
                    None
                }
                KeyEventKind::Release => match self.held {
                    Some((held, _)) if held == direction => {
                        self.held = None;
                        Some(InputEvent::Stop)
                    }
                    _ => None,
                },
            };
        }

        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('p') | KeyCode::Char('P') => Some(InputEvent::TogglePause),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(InputEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputEvent::Quit)
            }
            _ => None,
        }
    }

    /// Map any terminal event; only keys and resizes matter
    pub fn on_event(&mut self, event: Event, now: Instant) -> Option<InputEvent> {
        match event {
            Event::Key(key) => self.on_key(key, now),
            Event::Resize(cols, rows) => Some(InputEvent::Resize { cols, rows }),
            _ => None,
        }
    }

    /// Stop a held direction that has gone quiet (classic terminals only)
    pub fn expire(&mut self, now: Instant) -> Option<InputEvent> {
        if self.keyboard_enhanced {
            return None;
        }
        match self.held {
            Some((_, last)) if now.saturating_duration_since(last) > HOLD_WINDOW => {
                self.held = None;
                Some(InputEvent::Stop)
            }
            _ => None,
        }
    }
}

/// Non-blocking input source reading crossterm events
pub struct TerminalInput {
    mapper: KeyMapper,
}

impl TerminalInput {
    pub fn new(keyboard_enhanced: bool) -> Self {
        Self {
            mapper: KeyMapper::new(keyboard_enhanced),
        }
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            let event = event::read()?;
            events.extend(self.mapper.on_event(event, Instant::now()));
        }
        events.extend(self.mapper.expire(Instant::now()));
        Ok(events)
    }
}

/// Block until any key is pressed
pub fn wait_for_key() -> io::Result<()> {
    loop {
        if let Event::Key(KeyEvent {
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            return Ok(());
        }
    }
}
