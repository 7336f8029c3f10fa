use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::*;

/// One planned turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    /// Moves the player is certain about, executed as one batch.
    Play(Vec<Move>),
    /// No deduction was possible; reveal one cell chosen at random.
    Guess(Coord2),
    /// The player has nothing left to do.
    Stop,
}

/// Produces the next turn from the current board and the solver output.
pub trait Player {
    fn plan_turn(&mut self, game: &Minesweeper, deductions: &Deductions) -> Turn;
}

/// Plays automatically: flags every sure mine, reveals every sure safe
/// cell, and guesses uniformly among untouched cells when the solver has
/// nothing to offer.
#[derive(Clone, Debug)]
pub struct AutoPlayer {
    rng: SmallRng,
    guesses: u32,
}

impl AutoPlayer {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
            guesses: 0,
        }
    }

    /// Fixes the guess-selection seed, for replayable runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            guesses: 0,
        }
    }

    /// Number of guess moves made so far.
    pub const fn guesses(&self) -> u32 {
        self.guesses
    }
}

impl Default for AutoPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for AutoPlayer {
    fn plan_turn(&mut self, game: &Minesweeper, deductions: &Deductions) -> Turn {
        if deductions.is_empty() {
            let untouched: Vec<Coord2> = game.untouched_cells().map(Cell::coords).collect();
            return match untouched.choose(&mut self.rng) {
                Some(&coords) => {
                    self.guesses += 1;
                    log::debug!("no deduction available, guessing {coords:?}");
                    Turn::Guess(coords)
                }
                None => Turn::Stop,
            };
        }

        let moves = deductions
            .sure_mines
            .iter()
            .map(|&pos| Move::place_flag(pos))
            .chain(deductions.sure_clear.iter().map(|&pos| Move::reveal(pos)))
            .collect();
        Turn::Play(moves)
    }
}

/// Replays a queue of host-supplied moves, one per turn. The external move
/// source (keyboard driver, script) pushes into the queue between steps.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPlayer {
    queue: VecDeque<Move>,
}

impl ScriptedPlayer {
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self {
            queue: moves.into_iter().collect(),
        }
    }

    pub fn push(&mut self, mv: Move) {
        self.queue.push_back(mv);
    }
}

impl Player for ScriptedPlayer {
    fn plan_turn(&mut self, _game: &Minesweeper, _deductions: &Deductions) -> Turn {
        match self.queue.pop_front() {
            Some(mv) => Turn::Play(vec![mv]),
            None => Turn::Stop,
        }
    }
}

/// Session status after a driver step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Playing,
    Won,
    Lost,
    /// The player stopped with the field not yet clear.
    Stopped,
}

impl SessionStatus {
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// One executed move with its outcome.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    pub mv: Move,
    pub result: MoveResult,
    pub guess: bool,
}

/// Everything that happened during one driver step. The host reads this to
/// render; the core never calls back into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub moves: Vec<PlayedMove>,
    pub status: SessionStatus,
}

/// Turn-sequencing driver: computes deductions, asks the player for a
/// turn, executes it, and reports what happened.
#[derive(Clone, Debug)]
pub struct GameSession<P> {
    game: Minesweeper,
    player: P,
    status: SessionStatus,
}

impl<P: Player> GameSession<P> {
    pub fn new(game: Minesweeper, player: P) -> Self {
        Self {
            game,
            player,
            status: SessionStatus::Playing,
        }
    }

    pub fn game(&self) -> &Minesweeper {
        &self.game
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Runs one plan/execute iteration.
    ///
    /// This is the cooperative stop point: the host may drop or pause the
    /// session between calls. A finished session reports its final status
    /// and executes nothing.
    pub fn step(&mut self) -> Result<TurnReport> {
        if self.status.is_finished() {
            return Ok(TurnReport {
                moves: Vec::new(),
                status: self.status,
            });
        }

        let deductions = Deductions::analyze(&self.game)?;
        let turn = self.player.plan_turn(&self.game, &deductions);
        let mut moves = Vec::new();

        match turn {
            Turn::Play(batch) => {
                for mv in batch {
                    let result = self.game.make_move(mv)?;
                    moves.push(PlayedMove {
                        mv,
                        result,
                        guess: false,
                    });
                    if self.apply_result(result) {
                        break;
                    }
                }
            }
            Turn::Guess(coords) => {
                let mv = Move::reveal(coords);
                let result = self.game.make_move(mv)?;
                moves.push(PlayedMove {
                    mv,
                    result,
                    guess: true,
                });
                self.apply_result(result);
            }
            Turn::Stop => {
                self.status = if self.game.is_field_clear() {
                    SessionStatus::Won
                } else {
                    log::warn!("player stopped with the field not clear");
                    SessionStatus::Stopped
                };
            }
        }

        Ok(TurnReport {
            moves,
            status: self.status,
        })
    }

    /// Plays until the game is won, lost, or the player stops.
    pub fn play_to_end(&mut self) -> Result<SessionStatus> {
        while !self.status.is_finished() {
            self.step()?;
        }
        Ok(self.status)
    }

    fn apply_result(&mut self, result: MoveResult) -> bool {
        match result {
            MoveResult::RevealedMine => self.status = SessionStatus::Lost,
            MoveResult::AllClear => self.status = SessionStatus::Won,
            MoveResult::Playing | MoveResult::InvalidMove => return false,
        }
        true
    }
}
