/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Total cell count of a `width` x `height` board, saturating at
/// [`CellCount::MAX`].
pub const fn total_cells(width: Coord, height: Coord) -> CellCount {
    (width as CellCount).saturating_mul(height as CellCount)
}
