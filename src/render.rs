use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::Rng;
use unicode_width::UnicodeWidthStr;

use crate::components::{Dir, Pos};
use crate::level::LevelController;
use crate::player::Session;

const TILE_W: usize = 2;
const SPARK_COUNT: usize = 120;
const SPARK_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Wall,
    Floor,
    Trail,
    Player,
    Exit,
    Spark,
}

#[derive(Clone, Copy, PartialEq)]
struct Tile {
    glyph: Glyph,
    color: Color,
}

const FLOOR: Tile = Tile {
    glyph: Glyph::Floor,
    color: Color::Reset,
};

#[derive(Clone, Copy)]
struct Spark {
    x: usize,
    y: usize,
    color: Color,
}

/// Falling sparks shown between finishing a level and the next maze.
#[derive(Default)]
pub struct Celebration {
    sparks: Vec<Spark>,
}

impl Celebration {
    pub fn burst(&mut self, rng: &mut impl Rng, session: &Session) {
        let (w, h) = tile_dims(session);
        self.sparks.clear();
        for _ in 0..SPARK_COUNT {
            self.sparks.push(Spark {
                x: rng.gen_range(0..w),
                y: rng.gen_range(0..h),
                color: SPARK_COLORS[rng.gen_range(0..SPARK_COLORS.len())],
            });
        }
    }

    /// Drops every spark by one row, some drifting sideways.
    pub fn fall(&mut self, rng: &mut impl Rng, session: &Session) {
        let (w, h) = tile_dims(session);
        for spark in &mut self.sparks {
            spark.y += 1;
            match rng.gen_range(0..4) {
                0 => spark.x = spark.x.saturating_sub(1),
                1 => spark.x = (spark.x + 1).min(w - 1),
                _ => {}
            }
        }
        self.sparks.retain(|s| s.y < h);
    }

    pub fn clear(&mut self) {
        self.sparks.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.sparks.is_empty()
    }
}

/// Draws the maze as a `(2 * cols + 1) x (2 * rows + 1)` tile board where odd
/// tiles are cells and the tiles between them are walls or passages.
pub struct Renderer {
    last: Vec<Tile>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces a full redraw on the next frame.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render<W: Write, R: Rng>(
        &mut self,
        out: &mut W,
        levels: &LevelController<R>,
        celebration: &Celebration,
    ) -> io::Result<()> {
        let session = levels.session();
        let (w, h) = tile_dims(session);
        let (term_w, term_h) = terminal::size()?;
        let (needed_w, needed_h) = match board_extent(w, h) {
            Some((bw, bh)) if bw <= term_w && bh <= term_h => (bw, bh),
            _ => {
                out.queue(MoveTo(0, 0))?;
                out.queue(Clear(ClearType::All))?;
                out.queue(Print(format!(
                    "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                    w.saturating_mul(TILE_W),
                    h.saturating_add(1),
                    term_w,
                    term_h
                )))?;
                out.flush()?;
                self.needs_full = true;
                return Ok(());
            }
        };

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != w * h {
            self.last = vec![FLOOR; w * h];
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = if levels.is_transitioning() {
            format!("Level {} complete!  (q to quit)", levels.level())
        } else {
            format!(
                "Level: {}  Size: {}x{}  Trail: {}  (arrows/hjkl move, r new maze, q quit)",
                levels.level(),
                session.grid().cols(),
                session.grid().rows(),
                session.trail().len()
            )
        };
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let board = Board::new(session);
        let sparks: HashMap<(usize, usize), Color> = celebration
            .sparks
            .iter()
            .map(|s| ((s.x, s.y), s.color))
            .collect();
        for ty in 0..h {
            for tx in 0..w {
                let tile = match sparks.get(&(tx, ty)) {
                    Some(color) => Tile {
                        glyph: Glyph::Spark,
                        color: *color,
                    },
                    None => board.tile_at(tx, ty),
                };
                let idx = ty * w + tx;
                if self.needs_full || tile != self.last[idx] {
                    self.last[idx] = tile;
                    self.draw_tile(out, tx, ty, tile)?;
                }
            }
        }
        self.needs_full = false;

        out.flush()
    }

    fn draw_tile<W: Write>(&self, out: &mut W, x: usize, y: usize, tile: Tile) -> io::Result<()> {
        let text = match tile.glyph {
            Glyph::Wall => "██",
            Glyph::Floor => "  ",
            Glyph::Trail => "░░",
            Glyph::Player => "●",
            Glyph::Exit => "▓▓",
            Glyph::Spark => "✦",
        };
        // The board fits the terminal, so these stay within u16.
        out.queue(MoveTo(self.origin_x + (x * TILE_W) as u16, self.origin_y + y as u16))?;
        out.queue(SetForegroundColor(tile.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..TILE_W {
            out.queue(Print(' '))?;
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal columns and rows the board plus HUD line need, if they fit a u16.
fn board_extent(w: usize, h: usize) -> Option<(u16, u16)> {
    let cols = u16::try_from(w.checked_mul(TILE_W)?).ok()?;
    let rows = u16::try_from(h.checked_add(1)?).ok()?;
    Some((cols, rows))
}

/// Restores the terminal when dropped, however the game loop ends.
pub struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    /// Switches to raw mode and the alternate screen. If a later step fails the
    /// returned error drops the guard, undoing the earlier ones.
    pub fn enter(out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut guard = Self { out };
        guard.out.execute(EnterAlternateScreen)?;
        guard.out.execute(Hide)?;
        Ok(guard)
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        let _ = self.out.execute(Show);
        let _ = self.out.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn tile_dims(session: &Session) -> (usize, usize) {
    let grid = session.grid();
    (grid.cols() * 2 + 1, grid.rows() * 2 + 1)
}

/// Per-frame lookup of what sits on each tile.
struct Board<'a> {
    session: &'a Session,
    trail_cells: HashSet<Pos>,
    trail_links: HashSet<(Pos, Pos)>,
}

impl<'a> Board<'a> {
    fn new(session: &'a Session) -> Self {
        let steps = session.trail().steps();
        let trail_cells = steps.iter().copied().collect();
        let trail_links = steps.windows(2).map(|w| ordered(w[0], w[1])).collect();
        Self {
            session,
            trail_cells,
            trail_links,
        }
    }

    fn tile_at(&self, tx: usize, ty: usize) -> Tile {
        match (tx % 2, ty % 2) {
            (1, 1) => self.cell_tile(Pos::new(tx / 2, ty / 2)),
            // Vertical wall segment west of cell (tx / 2, ty / 2).
            (0, 1) => self.segment_tile(Pos::new(tx / 2, ty / 2), Dir::Left),
            // Horizontal wall segment north of cell (tx / 2, ty / 2).
            (1, 0) => self.segment_tile(Pos::new(tx / 2, ty / 2), Dir::Up),
            _ => self.corner_tile(tx, ty),
        }
    }

    fn cell_tile(&self, pos: Pos) -> Tile {
        if pos == self.session.player() {
            Tile {
                glyph: Glyph::Player,
                color: Color::Red,
            }
        } else if pos == self.session.exit() {
            Tile {
                glyph: Glyph::Exit,
                color: Color::Green,
            }
        } else if self.trail_cells.contains(&pos) {
            Tile {
                glyph: Glyph::Trail,
                color: Color::Red,
            }
        } else {
            FLOOR
        }
    }

    /// `pos` may sit one past the east or south edge; its west/north side is
    /// then the boundary wall of the last column or row.
    fn segment_tile(&self, pos: Pos, dir: Dir) -> Tile {
        if self.segment_is_wall(pos, dir) {
            return wall();
        }
        let other = match dir {
            Dir::Left => Pos::new(pos.x - 1, pos.y),
            _ => Pos::new(pos.x, pos.y - 1),
        };
        if self.trail_links.contains(&ordered(pos, other)) {
            Tile {
                glyph: Glyph::Trail,
                color: Color::Red,
            }
        } else {
            FLOOR
        }
    }

    fn segment_is_wall(&self, pos: Pos, dir: Dir) -> bool {
        let grid = self.session.grid();
        if grid.contains(pos) {
            return grid.has_wall(pos, dir);
        }
        // Past the east or south edge: look from the inside instead.
        let inner = match dir {
            Dir::Left if pos.x > 0 => Pos::new(pos.x - 1, pos.y),
            Dir::Up if pos.y > 0 => Pos::new(pos.x, pos.y - 1),
            _ => return true,
        };
        grid.has_wall(inner, dir.opposite())
    }

    /// Corners stand when any wall segment touches them.
    fn corner_tile(&self, tx: usize, ty: usize) -> Tile {
        let (w, h) = tile_dims(self.session);
        let cx = tx / 2;
        let cy = ty / 2;
        let touching = [
            // segment above and below: vertical walls west of (cx, cy - 1) and (cx, cy)
            ty > 0 && self.segment_is_wall(Pos::new(cx, cy - 1), Dir::Left),
            ty + 1 < h && self.segment_is_wall(Pos::new(cx, cy), Dir::Left),
            // segment left and right: horizontal walls north of (cx - 1, cy) and (cx, cy)
            tx > 0 && self.segment_is_wall(Pos::new(cx - 1, cy), Dir::Up),
            tx + 1 < w && self.segment_is_wall(Pos::new(cx, cy), Dir::Up),
        ];
        if touching.iter().any(|t| *t) {
            wall()
        } else {
            FLOOR
        }
    }
}

fn wall() -> Tile {
    Tile {
        glyph: Glyph::Wall,
        color: Color::Blue,
    }
}

fn ordered(a: Pos, b: Pos) -> (Pos, Pos) {
    if (a.y, a.x) <= (b.y, b.x) {
        (a, b)
    } else {
        (b, a)
    }
}
