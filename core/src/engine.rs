use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::*;

/// Validated construction parameters: board dimensions, mine count, and an
/// optional seed for reproducible boards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    height: Coord,
    width: Coord,
    mines: CellCount,
    seed: Option<u64>,
}

impl GameConfig {
    pub fn new(height: Coord, width: Coord, mines: CellCount) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(GameError::InvalidDimension);
        }
        if mines > total_cells(width, height) {
            return Err(GameError::InvalidMineCount);
        }
        Ok(Self {
            height,
            width,
            mines,
            seed: None,
        })
    }

    /// Derives the mine count from a board-coverage ratio in `[0, 1]`.
    pub fn from_mine_ratio(height: Coord, width: Coord, ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(GameError::InvalidMineCount);
        }
        let mines = (f64::from(total_cells(width, height)) * ratio) as CellCount;
        Self::new(height, width, mines)
    }

    /// Fixes the mine-placement seed, for reproducible boards and tests.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub const fn height(&self) -> Coord {
        self.height
    }

    pub const fn width(&self) -> Coord {
        self.width
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub const fn total_cells(&self) -> CellCount {
        total_cells(self.width, self.height)
    }

    /// 9x9 board with 10 mines.
    pub const fn beginner() -> Self {
        Self {
            height: 9,
            width: 9,
            mines: 10,
            seed: None,
        }
    }

    /// 16x16 board with 40 mines.
    pub const fn intermediate() -> Self {
        Self {
            height: 16,
            width: 16,
            mines: 40,
            seed: None,
        }
    }

    /// 16x30 board with 99 mines.
    pub const fn expert() -> Self {
        Self {
            height: 16,
            width: 30,
            mines: 99,
            seed: None,
        }
    }
}

/// The four raw move kinds a player can make.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    PlaceFlag,
    RemoveFlag,
    ToggleFlag,
    Reveal,
}

/// A (kind, coordinates) pair. Transient value object, never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub kind: MoveKind,
    pub coords: Coord2,
}

impl Move {
    pub const fn new(kind: MoveKind, coords: Coord2) -> Self {
        Self { kind, coords }
    }

    pub const fn reveal(coords: Coord2) -> Self {
        Self::new(MoveKind::Reveal, coords)
    }

    pub const fn place_flag(coords: Coord2) -> Self {
        Self::new(MoveKind::PlaceFlag, coords)
    }

    pub const fn remove_flag(coords: Coord2) -> Self {
        Self::new(MoveKind::RemoveFlag, coords)
    }

    pub const fn toggle_flag(coords: Coord2) -> Self {
        Self::new(MoveKind::ToggleFlag, coords)
    }
}

/// Public outcome of a single move, derived after execution and never
/// stored on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveResult {
    Playing,
    RevealedMine,
    InvalidMove,
    AllClear,
}

impl MoveResult {
    /// Whether the game cannot continue after this result.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::RevealedMine | Self::AllClear)
    }
}

/// The board engine: owns the grid, places mines exactly once at
/// construction, and executes moves until the field is cleared or a mine
/// goes off.
///
/// A reset clears reveal/flag state but never moves mines, so a layout can
/// be replayed deterministically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minesweeper {
    grid: CellGrid,
    total_mines: CellCount,
}

impl Minesweeper {
    /// Builds a board and places mines via a pseudo-random shuffle of all
    /// cells, seeded explicitly or from OS entropy.
    pub fn new(config: GameConfig) -> Self {
        let mut rng = match config.seed() {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        let mut grid = CellGrid::new(config.width(), config.height());
        let mut coords: Vec<Coord2> = grid.cells().map(Cell::coords).collect();
        coords.shuffle(&mut rng);
        for &pos in coords.iter().take(config.mines() as usize) {
            place_mine(&mut grid, pos);
        }

        Self {
            grid,
            total_mines: config.mines(),
        }
    }

    /// Builds a board with an explicit mine layout instead of a random one.
    /// Out-of-range and duplicate coordinates are rejected.
    pub fn with_mine_coords(height: Coord, width: Coord, mines: &[Coord2]) -> Result<Self> {
        let mine_count =
            CellCount::try_from(mines.len()).map_err(|_| GameError::InvalidMineCount)?;
        let config = GameConfig::new(height, width, mine_count)?;

        let mut grid = CellGrid::new(config.width(), config.height());
        for &pos in mines {
            if grid.get(pos)?.is_mine() {
                return Err(GameError::InvalidMineCount);
            }
            place_mine(&mut grid, pos);
        }

        Ok(Self {
            grid,
            total_mines: mine_count,
        })
    }

    pub const fn total_mines(&self) -> CellCount {
        self.total_mines
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<&Cell> {
        self.grid.get(coords)
    }

    pub fn has_mine_at(&self, coords: Coord2) -> Result<bool> {
        Ok(self.grid.get(coords)?.is_mine())
    }

    /// Whether a move of any kind could still affect the cell.
    pub fn can_play_at(&self, coords: Coord2) -> Result<bool> {
        Ok(self.grid.get(coords)?.is_playable())
    }

    /// Whether a reveal move is legal at the cell.
    pub fn can_reveal_at(&self, coords: Coord2) -> Result<bool> {
        Ok(self.grid.get(coords)?.is_revealable())
    }

    /// Executes a move and derives its public result.
    ///
    /// Out-of-board coordinates are an error. Within the board, transition
    /// failures map onto [`MoveResult::InvalidMove`], hitting a mine onto
    /// [`MoveResult::RevealedMine`], and everything else onto
    /// [`MoveResult::AllClear`] or [`MoveResult::Playing`] depending on the
    /// win check.
    pub fn make_move(&mut self, mv: Move) -> Result<MoveResult> {
        let coords = self.grid.validate(mv.coords)?;

        let outcome = match mv.kind {
            MoveKind::PlaceFlag => self.grid[coords].place_flag(),
            MoveKind::RemoveFlag => self.grid[coords].remove_flag(),
            MoveKind::ToggleFlag => self.grid[coords].toggle_flag(),
            MoveKind::Reveal => self.reveal(coords),
        };

        Ok(match outcome {
            Ok(()) if self.is_field_clear() => MoveResult::AllClear,
            Ok(()) => MoveResult::Playing,
            Err(GameError::MineRevealed) => MoveResult::RevealedMine,
            Err(
                GameError::AlreadyRevealed
                | GameError::FlaggedCellReveal
                | GameError::InvalidFlagOperation,
            ) => MoveResult::InvalidMove,
            Err(other) => return Err(other),
        })
    }

    /// Reveals one cell, cascading through zero-count regions.
    ///
    /// Numbered cells at the border of a zero region are revealed but never
    /// expanded through.
    fn reveal(&mut self, coords: Coord2) -> Result<()> {
        self.grid[coords].reveal()?;
        if self.grid[coords].adjacent_mines() > 0 {
            return Ok(());
        }

        let mut to_visit = VecDeque::from([coords]);
        while let Some(current) = to_visit.pop_front() {
            for pos in self.grid.iter_neighbors(current) {
                if !self.grid[pos].is_untouched() {
                    continue;
                }
                // An untouched neighbor of a zero-count cell cannot be a
                // mine, so this reveal cannot fail.
                self.grid[pos]
                    .reveal()
                    .expect("cascade reached a mine next to a zero-count cell");
                if self.grid[pos].adjacent_mines() == 0 {
                    to_visit.push_back(pos);
                }
            }
        }
        Ok(())
    }

    pub fn count_flags(&self) -> CellCount {
        self.grid.cells().filter(|cell| cell.is_flagged()).count() as CellCount
    }

    /// All cells not yet revealed or flagged.
    pub fn untouched_cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.cells().filter(|cell| cell.is_untouched())
    }

    /// True when every non-mine cell is revealed.
    pub fn is_field_clear(&self) -> bool {
        !self
            .grid
            .cells()
            .any(|cell| !cell.is_mine() && !cell.is_revealed())
    }

    /// Mines not yet accounted for by flags; negative when over-flagged,
    /// and 0 once the field is clear regardless of flag count.
    pub fn remaining_mines(&self) -> i32 {
        if self.is_field_clear() {
            0
        } else {
            i32::from(self.total_mines) - i32::from(self.count_flags())
        }
    }

    /// Fraction of cells no longer untouched; exactly 1.0 once the field
    /// is clear.
    pub fn completeness(&self) -> f64 {
        if self.is_field_clear() {
            1.0
        } else {
            let untouched = self.untouched_cells().count() as f64;
            1.0 - untouched / f64::from(self.grid.total_cells())
        }
    }

    /// Clears all reveal/flag state for a replay of the same mine layout.
    pub fn reset(&mut self) {
        for cell in self.grid.cells_mut() {
            cell.clear_state();
        }
    }
}

fn place_mine(grid: &mut CellGrid, pos: Coord2) {
    grid[pos].place_mine();
    for neighbor in grid.iter_neighbors(pos) {
        grid[neighbor].record_adjacent_mine();
    }
}
