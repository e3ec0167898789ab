//! Crossterm render sink
//!
//! A frame is composed into a `Canvas` first and then written row by row,
//! switching colours only where they change. Nothing here mutates the world.

use std::io::{self, Write};

use crossterm::{
    QueueableCommand, cursor,
    style::{self, Print},
    terminal,
};

use crate::palette;
use crate::scheduler::{Outcome, RenderSink};
use crate::settings::Settings;
use crate::sim::{Color, GameState};

const BALL_GLYPH: char = '●';
const LIFE_GLYPH: char = '●';
const TEXT_COLOR: Color = Color::rgb(240, 240, 240);
const HINT_COLOR: Color = Color::rgb(170, 170, 170);

const PAUSED_HINT: &str = "Paused: a/d or arrows to play, p to resume, q to quit";
const OUTCOME_HINT: &str = "Press any key to exit";

/// Mapping from level units to terminal cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub field_width: f64,
    pub field_height: f64,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, settings: &Settings) -> Self {
        Self {
            cols,
            rows,
            field_width: settings.field_width.max(1.0),
            field_height: settings.field_height.max(1.0),
        }
    }

    /// Viewport covering the whole current terminal
    pub fn fit(settings: &Settings) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::new(cols, rows, settings))
    }

    fn scale_x(&self) -> f64 {
        f64::from(self.cols) / self.field_width
    }

    fn scale_y(&self) -> f64 {
        f64::from(self.rows) / self.field_height
    }

    /// Cell containing a level point, if it is on screen
    pub fn cell_of(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let col = (x * self.scale_x()).floor();
        let row = (y * self.scale_y()).floor();
        let on_screen = (0.0..f64::from(self.cols)).contains(&col)
            && (0.0..f64::from(self.rows)).contains(&row);
        on_screen.then_some((col as u16, row as u16))
    }

    /// Inclusive column range covered by `[left, right]`
    pub fn col_span(&self, left: f64, right: f64) -> Option<(u16, u16)> {
        span(left, right, self.scale_x(), self.cols)
    }

    /// Inclusive row range covered by `[top, bottom]`
    pub fn row_span(&self, top: f64, bottom: f64) -> Option<(u16, u16)> {
        span(top, bottom, self.scale_y(), self.rows)
    }
}

/// Every shape covers at least one cell, so thin walls stay visible.
fn span(lo: f64, hi: f64, scale: f64, cells: u16) -> Option<(u16, u16)> {
    if cells == 0 {
        return None;
    }
    let last = f64::from(cells - 1);
    let start = (lo * scale).floor();
    let end = ((hi * scale).ceil() - 1.0).max(start);
    if end < 0.0 || start > last {
        return None;
    }
    Some((start.max(0.0) as u16, end.min(last) as u16))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

/// Off-screen frame buffer
#[derive(Debug, Clone)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, background: Color) -> Self {
        let blank = Cell {
            ch: ' ',
            fg: TEXT_COLOR,
            bg: background,
        };
        Self {
            cols,
            rows,
            cells: vec![blank; usize::from(cols) * usize::from(rows)],
        }
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows)
            .then(|| usize::from(row) * usize::from(self.cols) + usize::from(col))
    }

    pub fn get(&self, col: u16, row: u16) -> Option<&Cell> {
        self.index(col, row).map(|i| &self.cells[i])
    }

    /// Paint a block of background colour
    pub fn fill(&mut self, cols: (u16, u16), rows: (u16, u16), color: Color) {
        for row in rows.0..=rows.1 {
            for col in cols.0..=cols.1 {
                if let Some(i) = self.index(col, row) {
                    self.cells[i] = Cell {
                        ch: ' ',
                        fg: TEXT_COLOR,
                        bg: color,
                    };
                }
            }
        }
    }

    /// Draw a glyph over whatever background is already there
    pub fn put(&mut self, col: u16, row: u16, ch: char, fg: Color) {
        if let Some(i) = self.index(col, row) {
            self.cells[i].ch = ch;
            self.cells[i].fg = fg;
        }
    }

    /// Horizontally centered text, truncated to the canvas width
    pub fn centered_text(&mut self, row: u16, text: &str, fg: Color) {
        let len = text.chars().count().min(usize::from(self.cols)) as u16;
        let start = (self.cols - len) / 2;
        for (offset, ch) in text.chars().take(usize::from(len)).enumerate() {
            self.put(start + offset as u16, row, ch, fg);
        }
    }

    fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(usize::from(self.cols.max(1)))
    }
}

/// Compose one frame of the world
pub fn compose(state: &GameState, viewport: &Viewport) -> Canvas {
    let mut canvas = Canvas::new(viewport.cols, viewport.rows, palette::BACKGROUND);

    for entity in state.rects.values() {
        let rect = &entity.rect;
        if let (Some(cols), Some(rows)) = (
            viewport.col_span(rect.left(), rect.right()),
            viewport.row_span(rect.top(), rect.bottom()),
        ) {
            canvas.fill(cols, rows, rect.body.color);
        }
    }

    // Movers draw over the hint so a paused ball stays visible
    if state.paused && !state.is_over() {
        canvas.centered_text(viewport.rows / 2, PAUSED_HINT, HINT_COLOR);
    }

    for mover in &state.movers {
        let body = &mover.circle.body;
        if let Some((col, row)) = viewport.cell_of(body.pos.x, body.pos.y) {
            canvas.put(col, row, BALL_GLYPH, body.color);
        }
    }

    // The ball in play counts as one life
    for i in 0..(state.lives - 1).max(0) {
        let col = u16::try_from(1 + 2 * i).unwrap_or(u16::MAX);
        canvas.put(col, 0, LIFE_GLYPH, palette::LIFE);
    }

    canvas
}

fn term_color(c: Color) -> style::Color {
    style::Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Render sink drawing onto a crossterm-capable writer
pub struct TerminalRenderer<W: Write> {
    out: W,
    viewport: Viewport,
    /// Old output may linger outside the new grid after a resize
    needs_clear: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, viewport: Viewport) -> Self {
        Self {
            out,
            viewport,
            needs_clear: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        let mut current: Option<(Color, Color)> = None;
        if self.needs_clear {
            self.out.queue(terminal::Clear(terminal::ClearType::All))?;
            self.needs_clear = false;
        }

        for (row, cells) in canvas.rows().enumerate() {
            self.out.queue(cursor::MoveTo(0, row as u16))?;
            for cell in cells {
                if current != Some((cell.fg, cell.bg)) {
                    self.out
                        .queue(style::SetForegroundColor(term_color(cell.fg)))?;
                    self.out
                        .queue(style::SetBackgroundColor(term_color(cell.bg)))?;
                    current = Some((cell.fg, cell.bg));
                }
                self.out.queue(Print(cell.ch))?;
            }
        }

        self.out.queue(style::ResetColor)?;
        self.out.flush()
    }
}

impl<W: Write> RenderSink for TerminalRenderer<W> {
    fn draw(&mut self, state: &GameState) -> io::Result<()> {
        let canvas = compose(state, &self.viewport);
        self.present(&canvas)
    }

    fn show_outcome(&mut self, outcome: Outcome) -> io::Result<()> {
        let mut canvas = Canvas::new(
            self.viewport.cols,
            self.viewport.rows,
            palette::BACKGROUND,
        );
        let middle = self.viewport.rows / 2;
        canvas.centered_text(middle, &outcome.to_string(), TEXT_COLOR);
        canvas.centered_text(middle.saturating_add(2), OUTCOME_HINT, HINT_COLOR);
        self.present(&canvas)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport = Viewport {
            cols,
            rows,
            ..self.viewport
        };
        self.needs_clear = true;
    }
}
