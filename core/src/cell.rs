use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Untouched,
    Revealed,
    Flagged,
}

impl Default for CellState {
    fn default() -> Self {
        Self::Untouched
    }
}

/// One grid unit: fixed coordinates plus mutable reveal/flag state, mine
/// flag, and adjacent-mine count.
///
/// The mine flag and the reveal/flag state are independent axes: a flagged
/// cell may or may not actually hold a mine. The adjacent-mine count is
/// finalized during mine placement, before any reveal can happen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    state: CellState,
    is_mine: bool,
    adjacent_mines: u8,
}

impl Cell {
    pub(crate) const fn new(coords: Coord2) -> Self {
        Self {
            coords,
            state: CellState::Untouched,
            is_mine: false,
            adjacent_mines: 0,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn state(&self) -> CellState {
        self.state
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    /// Number of mines among the up-to-8 neighboring cells.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub const fn is_untouched(&self) -> bool {
        matches!(self.state, CellState::Untouched)
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.state, CellState::Revealed)
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.state, CellState::Flagged)
    }

    /// Revealed with at least one mine around it.
    pub const fn is_numbered(&self) -> bool {
        self.is_revealed() && self.adjacent_mines > 0
    }

    /// Whether any move can still change this cell. Revealed is terminal.
    pub const fn is_playable(&self) -> bool {
        !self.is_revealed()
    }

    /// Whether a reveal move is legal here.
    pub const fn is_revealable(&self) -> bool {
        self.is_untouched()
    }

    pub(crate) fn place_mine(&mut self) {
        debug_assert!(!self.is_mine, "mine placed twice on one cell");
        self.is_mine = true;
    }

    pub(crate) fn record_adjacent_mine(&mut self) {
        debug_assert!(self.adjacent_mines < 8);
        self.adjacent_mines += 1;
    }

    pub(crate) fn reveal(&mut self) -> Result<()> {
        match self.state {
            CellState::Flagged => Err(GameError::FlaggedCellReveal),
            CellState::Revealed => Err(GameError::AlreadyRevealed),
            CellState::Untouched if self.is_mine => Err(GameError::MineRevealed),
            CellState::Untouched => {
                self.state = CellState::Revealed;
                Ok(())
            }
        }
    }

    pub(crate) fn place_flag(&mut self) -> Result<()> {
        if self.is_untouched() {
            self.state = CellState::Flagged;
            Ok(())
        } else {
            Err(GameError::InvalidFlagOperation)
        }
    }

    pub(crate) fn remove_flag(&mut self) -> Result<()> {
        if self.is_flagged() {
            self.state = CellState::Untouched;
            Ok(())
        } else {
            Err(GameError::InvalidFlagOperation)
        }
    }

    pub(crate) fn toggle_flag(&mut self) -> Result<()> {
        match self.state {
            CellState::Untouched => self.place_flag(),
            CellState::Flagged => self.remove_flag(),
            CellState::Revealed => Err(GameError::InvalidFlagOperation),
        }
    }

    /// Clears reveal/flag state for a replay of the same layout. The mine
    /// flag and the adjacent count stay in place.
    pub(crate) fn clear_state(&mut self) {
        self.state = CellState::Untouched;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_is_terminal() {
        let mut cell = Cell::new((0, 0));

        assert_eq!(cell.reveal(), Ok(()));
        assert_eq!(cell.reveal(), Err(GameError::AlreadyRevealed));
        assert_eq!(cell.place_flag(), Err(GameError::InvalidFlagOperation));
        assert_eq!(cell.remove_flag(), Err(GameError::InvalidFlagOperation));
        assert_eq!(cell.toggle_flag(), Err(GameError::InvalidFlagOperation));
    }

    #[test]
    fn flag_blocks_reveal_until_removed() {
        let mut cell = Cell::new((0, 0));

        cell.place_flag().unwrap();
        assert_eq!(cell.reveal(), Err(GameError::FlaggedCellReveal));

        cell.remove_flag().unwrap();
        assert_eq!(cell.reveal(), Ok(()));
        assert!(cell.is_revealed());
    }

    #[test]
    fn revealing_a_mine_fails_and_keeps_the_cell_untouched() {
        let mut cell = Cell::new((0, 0));
        cell.place_mine();

        assert_eq!(cell.reveal(), Err(GameError::MineRevealed));
        assert!(cell.is_untouched());
    }

    #[test]
    fn toggle_flag_round_trips() {
        let mut cell = Cell::new((0, 0));

        cell.toggle_flag().unwrap();
        assert!(cell.is_flagged());
        cell.toggle_flag().unwrap();
        assert!(cell.is_untouched());
    }

    #[test]
    fn double_flag_operations_fail() {
        let mut cell = Cell::new((0, 0));

        assert_eq!(cell.remove_flag(), Err(GameError::InvalidFlagOperation));
        cell.place_flag().unwrap();
        assert_eq!(cell.place_flag(), Err(GameError::InvalidFlagOperation));
    }

    #[test]
    fn clear_state_keeps_the_mine_layout() {
        let mut cell = Cell::new((3, 2));
        cell.place_mine();
        cell.record_adjacent_mine();
        cell.place_flag().unwrap();

        cell.clear_state();

        assert!(cell.is_untouched());
        assert!(cell.is_mine());
        assert_eq!(cell.adjacent_mines(), 1);
        assert_eq!(cell.coords(), (3, 2));
    }
}
