use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be positive")]
    InvalidDimension,
    #[error("Mine count exceeds the number of cells")]
    InvalidMineCount,
    #[error("Coordinates are outside the board")]
    OutOfBounds,
    #[error("Cell is already revealed")]
    AlreadyRevealed,
    #[error("Cannot reveal a flagged cell")]
    FlaggedCellReveal,
    #[error("Revealed a mine")]
    MineRevealed,
    #[error("No flag change is legal in the cell's current state")]
    InvalidFlagOperation,
    #[error("Deduction produced a provably wrong conclusion")]
    SolverInvariantViolation,
}

pub type Result<T> = core::result::Result<T, GameError>;
