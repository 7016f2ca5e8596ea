use std::sync::Arc;

use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::data::{Board, Cell, CellState};

/// The one board every connection plays on, behind a single lock. Dispatch
/// holds the lock for the whole command (mutation plus reply rendering), so
/// neighbor-fanning operations like the flood reveal are atomic with respect
/// to every other client.
pub type SharedBoard = Arc<Mutex<Board>>;

/// Chance of a mine under each cell of a randomly generated board.
const MINE_PROBABILITY: f64 = 0.25;

/// What a single `dig` did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigOutcome {
    /// The target carried a mine and was dug directly.
    Detonated,
    /// The target was dug without incident.
    Revealed,
    /// Out of range or already touched; the board is unchanged.
    Ignored,
}

fn generate_cells(width: usize, height: usize) -> Vec<Cell> {
    let mut rng = rand::rng();
    (0..width * height)
        .map(|_| Cell::untouched(rng.random_bool(MINE_PROBABILITY)))
        .collect()
}

/// The up-to-8 surrounding coordinates, unclamped; callers range-check.
fn neighbors(x: i32, y: i32) -> Vec<(i32, i32)> {
    let mut out = Vec::with_capacity(8);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            out.push((x + dx, y + dy));
        }
    }
    out
}

impl Board {
    pub fn random(width: usize, height: usize) -> Self {
        info!("generating random {}x{} board", width, height);
        Self {
            width,
            height,
            cells: generate_cells(width, height),
        }
    }

    pub fn with_mines(width: usize, height: usize, mines: Vec<bool>) -> Self {
        debug_assert_eq!(mines.len(), width * height);
        Self {
            width,
            height,
            cells: mines.into_iter().map(Cell::untouched).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height {
            Some(x as usize + y as usize * self.width)
        } else {
            None
        }
    }

    /// Digs the cell at (x, y). Out-of-range or already-touched targets are
    /// ignored. A mined target detonates; either way the target is dug, its
    /// mine destroyed, and a zero-count target starts the flood reveal.
    #[instrument(level = "trace", skip(self))]
    pub fn dig(&mut self, x: i32, y: i32) -> DigOutcome {
        let Some(index) = self.index(x, y) else {
            debug!("ignoring dig outside the board");
            return DigOutcome::Ignored;
        };
        if self.cells[index].is_touched() {
            debug!("ignoring dig on a touched cell");
            return DigOutcome::Ignored;
        }

        let had_mine = self.cells[index].mine;
        self.cells[index] = self.cells[index].dug();
        if self.adjacent_mines(x, y) == 0 {
            self.flood(x, y);
        }

        if had_mine {
            warn!("mine detonated at ({}, {})", x, y);
            DigOutcome::Detonated
        } else {
            DigOutcome::Revealed
        }
    }

    /// Expands a zero-count reveal outward. An explicit worklist bounds the
    /// stack on large boards; termination holds because every visited cell
    /// becomes touched and touched cells are skipped. A mine reached here
    /// was not the direct target, so it is destroyed without a detonation
    /// and the flood continues through it.
    fn flood(&mut self, x: i32, y: i32) {
        let mut pending = neighbors(x, y);
        while let Some((x, y)) = pending.pop() {
            let Some(index) = self.index(x, y) else {
                continue;
            };
            if self.cells[index].is_touched() {
                continue;
            }
            self.cells[index] = self.cells[index].dug();
            if self.adjacent_mines(x, y) == 0 {
                pending.extend(neighbors(x, y));
            }
        }
    }

    /// Plants a flag on an untouched in-range cell; anything else is a no-op.
    #[instrument(level = "trace", skip(self))]
    pub fn flag(&mut self, x: i32, y: i32) {
        if let Some(index) = self.index(x, y)
            && !self.cells[index].is_touched()
        {
            self.cells[index] = self.cells[index].flagged();
            debug!("cell ({}, {}) flagged", x, y);
        }
    }

    /// Returns a flagged cell to untouched, keeping its mine; anything else
    /// is a no-op.
    #[instrument(level = "trace", skip(self))]
    pub fn deflag(&mut self, x: i32, y: i32) {
        if let Some(index) = self.index(x, y)
            && self.cells[index].state == CellState::Flagged
        {
            self.cells[index] = self.cells[index].unflagged();
            debug!("cell ({}, {}) deflagged", x, y);
        }
    }

    /// Live count of mines among the up-to-8 neighbors, 0 for out-of-range
    /// targets. Counts shrink as mines are destroyed, so the render always
    /// reflects the current board.
    pub fn adjacent_mines(&self, x: i32, y: i32) -> u8 {
        if self.index(x, y).is_none() {
            return 0;
        }
        let mut count = 0;
        for (x, y) in neighbors(x, y) {
            if let Some(index) = self.index(x, y)
                && self.cells[index].mine
            {
                count += 1;
            }
        }
        count
    }

    pub fn is_touched(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|index| self.cells[index].is_touched())
    }

    pub fn is_dug(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|index| self.cells[index].state == CellState::Dug)
    }

    pub fn is_flagged(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|index| self.cells[index].state == CellState::Flagged)
    }

    pub fn has_mine(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|index| self.cells[index].mine)
    }

    /// The textual view sent to clients: one line per row, rows joined with
    /// `\r\n`, one glyph per cell separated by single spaces. `-` untouched,
    /// `F` flagged, blank for a dug cell with no mined neighbors, otherwise
    /// the digit 1-8.
    pub fn render(&self) -> String {
        let mut rows = Vec::with_capacity(self.height);
        for y in 0..self.height {
            let glyphs: Vec<String> = (0..self.width).map(|x| self.glyph(x, y)).collect();
            rows.push(glyphs.join(" "));
        }
        rows.join("\r\n")
    }

    fn glyph(&self, x: usize, y: usize) -> String {
        let cell = self.cells[x + y * self.width];
        match cell.state {
            CellState::Untouched => "-".to_string(),
            CellState::Flagged => "F".to_string(),
            CellState::Dug => match self.adjacent_mines(x as i32, y as i32) {
                0 => " ".to_string(),
                count => count.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mined(width: usize, height: usize, mines: &[(usize, usize)]) -> Board {
        let mut cells = vec![false; width * height];
        for &(x, y) in mines {
            cells[x + y * width] = true;
        }
        Board::with_mines(width, height, cells)
    }

    #[test]
    fn random_board_has_requested_dimensions() {
        let board = Board::random(7, 3);
        assert_eq!(board.width(), 7);
        assert_eq!(board.height(), 3);
        assert_eq!(board.cells.len(), 21);
    }

    #[test]
    fn adjacency_counts_clip_at_edges() {
        let board = mined(3, 3, &[(0, 0), (2, 0), (1, 1)]);
        assert_eq!(board.adjacent_mines(0, 0), 1);
        assert_eq!(board.adjacent_mines(1, 0), 3);
        assert_eq!(board.adjacent_mines(0, 2), 1);
        assert_eq!(board.adjacent_mines(2, 2), 1);
        assert_eq!(board.adjacent_mines(-1, 0), 0);
        assert_eq!(board.adjacent_mines(3, 3), 0);
    }

    #[test]
    fn queries_are_false_out_of_range() {
        let board = mined(2, 2, &[(0, 0)]);
        assert!(!board.is_touched(-1, -1));
        assert!(!board.is_flagged(2, 0));
        assert!(!board.is_dug(0, 2));
        assert!(!board.has_mine(2, 2));
    }

    #[test]
    fn flood_terminates_on_a_mineless_board() {
        let mut board = mined(16, 16, &[]);
        assert_eq!(board.dig(8, 8), DigOutcome::Revealed);
        for y in 0..16 {
            for x in 0..16 {
                assert!(board.is_dug(x, y));
            }
        }
    }

    #[test]
    fn detonation_destroys_the_mine() {
        let mut board = mined(3, 3, &[(1, 1), (0, 0)]);
        assert_eq!(board.dig(1, 1), DigOutcome::Detonated);
        assert!(!board.has_mine(1, 1));
        assert!(board.is_dug(1, 1));
        // the other mine survives
        assert!(board.has_mine(0, 0));
    }
}
