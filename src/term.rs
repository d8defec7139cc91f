use std::io::{Stdout, Write, stdout};

use crossterm::{cursor, execute, queue, style::{self, Color}, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use log::warn;

use crate::assets::{CELL_WIDTH, Sprite, SpriteSheet};
use crate::game::{Outcome, Renderer, Snapshot};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

pub const HUD_ROWS: TermInt = 1;

#[derive(Copy, Clone, PartialEq, Eq)]
struct ScreenCell {
    ch: char,
    color: Option<Color>,
}

const BLANK: ScreenCell = ScreenCell { ch: ' ', color: None };

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<ScreenCell>,
    current_msg: Option<Message>,
    msg_center: Coords,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
    lines: Vec<String>,
}

impl TermManager {
    pub fn new() -> crossterm::Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![BLANK; width as usize * height as usize];
        let msg_center = (width / 2, height / 2);
        Ok(TermManager { width, height, stdout, screen, current_msg: None, msg_center })
    }

    /// Leaves the terminal restored if any step fails.
    pub fn setup(&mut self) -> crossterm::Result<()> {
        let entered = self.enter();
        restore_on_error(entered, || self.restore())
    }

    fn enter(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.clear()
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, style::ResetColor, LeaveAlternateScreen)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn set_message_center(&mut self, center: Coords) {
        self.msg_center = center;
    }

    pub fn draw_borders(&mut self, size: Coords) -> crossterm::Result<()> {
        let (width, height) = size;
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch, None)?;
            self.print_at((x, end_y), ch, None)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|', None)?;
            self.print_at((end_x, y), '|', None)?;
        }

        Ok(())
    }

    pub fn print_str(&mut self, pos: Coords, text: &str, color: Option<Color>) -> crossterm::Result<()> {
        for (x_diff, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + x_diff as TermInt, pos.1), ch, color)?;
        }
        Ok(())
    }

    pub fn print_at(&mut self, pos: Coords, ch: char, color: Option<Color>) -> crossterm::Result<()> {
        let idx = match self.index(pos) {
            Some(idx) => idx,
            None => return Ok(()),
        };

        let cell = ScreenCell { ch, color };
        if self.screen[idx] == cell { // Already on screen
            return Ok(());
        }
        self.screen[idx] = cell;

        if self.current_msg.as_ref().map_or(false, |msg| msg.covers(pos)) {
            return Ok(());
        }
        self.print_at_no_save(pos, cell)
    }

    pub fn show_message(&mut self, lines: &[&str]) -> crossterm::Result<()> {
        if let Some(msg) = &self.current_msg {
            if msg.lines.iter().map(String::as_str).eq(lines.iter().copied()) {
                return Ok(());
            }
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = self.msg_center;
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, y), BLANK)?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ScreenCell { ch, color: Some(Color::White) })?;
            }
        }

        let lines = lines.iter().map(|l| l.to_string()).collect();
        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height, lines });
        Ok(())
    }

    pub fn hide_message(&mut self) -> crossterm::Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let pos = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(idx) = self.index(pos) {
                    let cell = self.screen[idx];
                    self.print_at_no_save(pos, cell)?;
                }
            }
        }

        Ok(())
    }

    pub fn clear(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> crossterm::Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: Coords, cell: ScreenCell) -> crossterm::Result<()> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return Ok(());
        }
        queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::SetForegroundColor(cell.color.unwrap_or(Color::Reset)),
            style::Print(cell.ch)
        )
    }

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }
}

impl Message {
    fn covers(&self, pos: Coords) -> bool {
        pos.0 >= self.top_left.0 && pos.0 < self.top_left.0 + self.width &&
        pos.1 >= self.top_left.1 && pos.1 < self.top_left.1 + self.height
    }
}

fn restore_on_error<T, F>(result: crossterm::Result<T>, restore: F) -> crossterm::Result<T>
where
    F: FnOnce() -> crossterm::Result<()>,
{
    if result.is_err() {
        if let Err(e) = restore() {
            warn!("Unable to restore the terminal: {}", e);
        }
    }
    result
}

pub fn required_size(width: i32, height: i32) -> Coords {
    let cols = width.max(0) as usize * CELL_WIDTH + 2;
    let rows = height.max(0) as usize + 2 + HUD_ROWS as usize;
    (cols as TermInt, rows as TermInt)
}

pub fn board_that_fits(term: Coords) -> (i32, i32) {
    let width = (term.0 as usize).saturating_sub(2) / CELL_WIDTH;
    let height = (term.1 as usize).saturating_sub(2 + HUD_ROWS as usize);
    (width as i32, height as i32)
}

pub struct TerminalRenderer {
    term: TermManager,
    sprites: SpriteSheet,
    board: Option<(i32, i32)>,
}

impl TerminalRenderer {
    pub fn new(term: TermManager, sprites: SpriteSheet) -> Self {
        TerminalRenderer { term, sprites, board: None }
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        self.term.restore()
    }

    fn compose(&self, frame: &Snapshot) -> Vec<Sprite> {
        let (w, h) = (frame.width.max(0) as usize, frame.height.max(0) as usize);
        let mut cells = vec![self.sprites.background.clone(); w * h];
        let mut put = |x: i32, y: i32, sprite: &Sprite| {
            if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
                cells[y as usize * w + x as usize] = sprite.clone();
            }
        };

        if let Some(fruit) = frame.fruit {
            put(fruit.x, fruit.y, &self.sprites.fruit);
        }

        let dead = frame.outcome == Some(Outcome::Crashed);
        let last = frame.segments.len().saturating_sub(1);
        // Back to front so the head ends up on top.
        for (i, segment) in frame.segments.iter().enumerate().rev() {
            let sprite = if dead {
                &self.sprites.dead
            } else if i == 0 {
                self.sprites.head(segment.direction)
            } else if i == last {
                // Facing the way the segment ahead moves, so it stays attached.
                self.sprites.tail(frame.segments[i - 1].direction)
            } else {
                self.sprites.body()
            };
            put(segment.cell.x, segment.cell.y, sprite);
        }

        cells
    }

    fn draw_hud(&mut self, frame: &Snapshot, board_cols: TermInt, y: TermInt) -> crossterm::Result<()> {
        let time = format!("Game time - {}", frame.elapsed.as_secs());
        let score = format!("Fruits eaten - {}", frame.score);
        let gap = (board_cols as usize).saturating_sub(score.chars().count());
        let line = format!("{:<gap$}{}", time, score, gap = gap);
        self.term.print_str((0, y), &line, Some(Color::White))
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, frame: &Snapshot) -> anyhow::Result<()> {
        let (cols, rows) = required_size(frame.width, frame.height);
        if self.board != Some((frame.width, frame.height)) {
            self.term.clear()?;
            self.term.draw_borders((cols, rows - HUD_ROWS))?;
            self.term.set_message_center((cols / 2, (rows - HUD_ROWS) / 2));
            self.board = Some((frame.width, frame.height));
        }

        let cells = self.compose(frame);
        let w = frame.width.max(0) as usize;
        for (i, sprite) in cells.iter().enumerate() {
            let (x, y) = (i % w, i / w);
            for (k, ch) in sprite.glyph.chars().enumerate() {
                let pos = ((1 + x * CELL_WIDTH + k) as TermInt, (1 + y) as TermInt);
                self.term.print_at(pos, ch, sprite.color)?;
            }
        }

        self.draw_hud(frame, cols, rows - HUD_ROWS)?;

        let score = format!("Fruits eaten: {}", frame.score);
        match frame.outcome {
            Some(outcome) => {
                let title = if outcome == Outcome::Won {"You won!"} else {"Game Over!"};
                self.term.show_message(&[title, &score, "", "Esc to quit"])?;
            },
            None if frame.paused => self.term.show_message(&["Paused", "P to resume", "Esc to quit"])?,
            None => self.term.hide_message()?,
        }

        self.term.flush()?;
        Ok(())
    }
}
