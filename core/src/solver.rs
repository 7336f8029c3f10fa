use std::collections::BTreeSet;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Combined solver output over one board snapshot: cells that are provably
/// mines and cells that are provably safe given the revealed hints.
///
/// Ordered sets, so iterating the deductions is deterministic and a replay
/// with the same seed executes the same move sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub sure_mines: BTreeSet<Coord2>,
    pub sure_clear: BTreeSet<Coord2>,
}

impl Deductions {
    /// Runs both deduction passes over a board snapshot.
    pub fn analyze(game: &Minesweeper) -> Result<Self> {
        Ok(Self {
            sure_mines: sure_mine_cells(game)?,
            sure_clear: sure_clear_cells(game)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sure_mines.is_empty() && self.sure_clear.is_empty()
    }
}

/// Cells that are provably mines.
///
/// Runs the cheap single-constraint pass first and falls back to the
/// pairwise pass only when that concludes nothing, to bound average cost.
pub fn sure_mine_cells(game: &Minesweeper) -> Result<BTreeSet<Coord2>> {
    let mut mines = BTreeSet::new();

    for cell in numbered_cells(game) {
        let hood = Neighborhood::around(game, cell.coords());
        if hood.untouched.len() + hood.flagged == usize::from(cell.adjacent_mines()) {
            // Flags already account for part of the count; the rest has
            // nowhere to be but the remaining untouched neighbors.
            for &pos in &hood.untouched {
                insert_mine(game, pos, &mut mines)?;
            }
        }
    }

    if mines.is_empty() {
        return pairwise_sure_mine_cells(game);
    }
    Ok(mines)
}

/// Cells that are provably safe.
pub fn sure_clear_cells(game: &Minesweeper) -> Result<BTreeSet<Coord2>> {
    let mut clear = BTreeSet::new();

    for cell in numbered_cells(game) {
        let hood = Neighborhood::around(game, cell.coords());
        if hood.flagged == usize::from(cell.adjacent_mines()) {
            // All required mines are flagged; the untouched rest is safe.
            for &pos in &hood.untouched {
                insert_clear(game, pos, &mut clear)?;
            }
        }
    }

    if clear.is_empty() {
        return pairwise_sure_clear_cells(game);
    }
    Ok(clear)
}

/// Pairwise subset-difference pass for mines.
///
/// For a numbered cell A with a small untouched set and a numbered
/// neighbor B whose untouched set mostly overlaps A's, B's surplus cells
/// must hold B's surplus mines. The thresholds are a reproducible policy
/// tuned on real boards, not a complete constraint solver; boards it
/// cannot crack still need a guess.
fn pairwise_sure_mine_cells(game: &Minesweeper) -> Result<BTreeSet<Coord2>> {
    let mut mines = BTreeSet::new();

    for cell in numbered_cells(game) {
        let count = usize::from(cell.adjacent_mines());
        let hood = Neighborhood::around(game, cell.coords());
        if hood.untouched.is_empty()
            || hood.untouched.len() > 2
            || hood.untouched.len() + hood.flagged > count + 1
        {
            continue;
        }

        for &other in &hood.numbered {
            let other_count = game.grid()[other].adjacent_mines();
            let other_hood = Neighborhood::around(game, other);
            let other_remaining = other_hood.remaining(other_count);
            if other_remaining < 2
                || other_hood.untouched.len() as i32 - other_remaining > 1
            {
                continue;
            }

            let common: HashSet<Coord2> = other_hood
                .untouched
                .intersection(&hood.untouched)
                .copied()
                .collect();
            if common.len() < 2 {
                continue;
            }

            for &pos in other_hood.untouched.difference(&common) {
                insert_mine(game, pos, &mut mines)?;
            }
        }
    }

    Ok(mines)
}

/// Pairwise subset-difference pass for safe cells: when a numbered
/// neighbor B has at most one mine left and shares at least two untouched
/// cells with A, B's cells outside the overlap cannot hold a mine.
fn pairwise_sure_clear_cells(game: &Minesweeper) -> Result<BTreeSet<Coord2>> {
    let mut clear = BTreeSet::new();

    for cell in numbered_cells(game) {
        let count = usize::from(cell.adjacent_mines());
        let hood = Neighborhood::around(game, cell.coords());
        if hood.untouched.is_empty() || hood.untouched.len() + hood.flagged > count + 1 {
            continue;
        }

        for &other in &hood.numbered {
            let other_count = game.grid()[other].adjacent_mines();
            let other_hood = Neighborhood::around(game, other);
            if other_hood.remaining(other_count) > 1 {
                continue;
            }

            let common: HashSet<Coord2> = other_hood
                .untouched
                .intersection(&hood.untouched)
                .copied()
                .collect();
            if common.len() < 2 {
                continue;
            }

            for &pos in other_hood.untouched.difference(&common) {
                insert_clear(game, pos, &mut clear)?;
            }
        }
    }

    Ok(clear)
}

/// Snapshot of one cell's surroundings, split by state.
struct Neighborhood {
    untouched: HashSet<Coord2>,
    flagged: usize,
    numbered: SmallVec<[Coord2; 8]>,
}

impl Neighborhood {
    fn around(game: &Minesweeper, coords: Coord2) -> Self {
        let mut untouched = HashSet::new();
        let mut flagged = 0;
        let mut numbered = SmallVec::new();

        for pos in game.grid().iter_neighbors(coords) {
            let cell = &game.grid()[pos];
            if cell.is_untouched() {
                untouched.insert(pos);
            } else if cell.is_flagged() {
                flagged += 1;
            } else if cell.is_numbered() {
                numbered.push(pos);
            }
        }

        Self {
            untouched,
            flagged,
            numbered,
        }
    }

    /// Mines still unaccounted for by flags; negative when over-flagged.
    fn remaining(&self, count: u8) -> i32 {
        i32::from(count) - self.flagged as i32
    }
}

fn numbered_cells(game: &Minesweeper) -> impl Iterator<Item = &Cell> {
    game.grid().cells().filter(|cell| cell.is_numbered())
}

fn insert_mine(game: &Minesweeper, pos: Coord2, out: &mut BTreeSet<Coord2>) -> Result<()> {
    if !game.grid()[pos].is_mine() {
        log::error!("deduction classified safe cell {pos:?} as a mine");
        return Err(GameError::SolverInvariantViolation);
    }
    out.insert(pos);
    Ok(())
}

fn insert_clear(game: &Minesweeper, pos: Coord2, out: &mut BTreeSet<Coord2>) -> Result<()> {
    if game.grid()[pos].is_mine() {
        log::error!("deduction classified mine cell {pos:?} as safe");
        return Err(GameError::SolverInvariantViolation);
    }
    out.insert(pos);
    Ok(())
}
