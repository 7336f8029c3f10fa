use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Fixed-size rectangular container of cells, indexed `(x, y)` with
/// `0 <= x < width` and `0 <= y < height`.
///
/// Cells live in a flat arena; every in-range coordinate maps to exactly
/// one cell, created exactly once at construction. The dimensions never
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    cells: Array2<Cell>,
}

impl CellGrid {
    pub(crate) fn new(width: Coord, height: Coord) -> Self {
        let cells = Array2::from_shape_fn([width as usize, height as usize], |(x, y)| {
            Cell::new((x as Coord, y as Coord))
        });
        Self { cells }
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.cells.dim();
        (width as Coord, height as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    /// Checks that `coords` lie on the board.
    pub fn validate(&self, coords: Coord2) -> Result<Coord2> {
        let (width, height) = self.size();
        if coords.0 < width && coords.1 < height {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn get(&self, coords: Coord2) -> Result<&Cell> {
        self.validate(coords).map(|coords| &self.cells[nd(coords)])
    }

    pub(crate) fn get_mut(&mut self, coords: Coord2) -> Result<&mut Cell> {
        self.validate(coords)?;
        Ok(&mut self.cells[nd(coords)])
    }

    /// In-bounds neighbor coordinates at Chebyshev distance 1. Off-board
    /// positions are clipped; order carries no meaning and duplicates are
    /// impossible. Recomputed per call, never cached.
    pub fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        let (width, height) = self.size();
        DISPLACEMENTS.into_iter().filter_map(move |(dx, dy)| {
            let x = coords.0.checked_add_signed(dx)?;
            let y = coords.1.checked_add_signed(dy)?;
            (x < width && y < height).then_some((x, y))
        })
    }

    pub fn neighbor_cells(&self, coords: Coord2) -> impl Iterator<Item = &Cell> {
        self.iter_neighbors(coords).map(|pos| &self[pos])
    }

    /// All cells in a stable order; restartable.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }
}

impl Index<Coord2> for CellGrid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Cell {
        &self.cells[nd(coords)]
    }
}

impl IndexMut<Coord2> for CellGrid {
    fn index_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[nd(coords)]
    }
}

fn nd(coords: Coord2) -> [usize; 2] {
    [coords.0 as usize, coords.1 as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn every_coordinate_maps_to_its_own_cell() {
        let grid = CellGrid::new(4, 3);

        assert_eq!(grid.total_cells(), 12);
        let coords: BTreeSet<Coord2> = grid.cells().map(Cell::coords).collect();
        assert_eq!(coords.len(), 12);
        for x in 0..4 {
            for y in 0..3 {
                assert_eq!(grid.get((x, y)).unwrap().coords(), (x, y));
            }
        }
    }

    #[test]
    fn get_rejects_out_of_bounds_coordinates() {
        let grid = CellGrid::new(4, 3);

        assert_eq!(grid.get((4, 0)).unwrap_err(), GameError::OutOfBounds);
        assert_eq!(grid.get((0, 3)).unwrap_err(), GameError::OutOfBounds);
        assert!(grid.get((3, 2)).is_ok());
    }

    #[test]
    fn neighbors_are_clipped_at_edges_and_corners() {
        let grid = CellGrid::new(4, 3);

        let corner: BTreeSet<Coord2> = grid.iter_neighbors((0, 0)).collect();
        assert_eq!(corner, BTreeSet::from([(1, 0), (0, 1), (1, 1)]));

        let edge: BTreeSet<Coord2> = grid.iter_neighbors((1, 0)).collect();
        assert_eq!(
            edge,
            BTreeSet::from([(0, 0), (2, 0), (0, 1), (1, 1), (2, 1)])
        );

        assert_eq!(grid.iter_neighbors((1, 1)).count(), 8);
    }

    #[test]
    fn neighbors_never_include_the_center() {
        let grid = CellGrid::new(3, 3);

        for cell in grid.cells() {
            assert!(grid.iter_neighbors(cell.coords()).all(|pos| pos != cell.coords()));
        }
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        let grid = CellGrid::new(1, 1);

        assert_eq!(grid.iter_neighbors((0, 0)).count(), 0);
    }
}
