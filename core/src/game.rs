use alloc::collections::VecDeque;
use core::ops::BitOr;

use hashbrown::HashSet;
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Lifecycle of a board. Mines are committed on the first reveal; `Won` and
/// `Lost` are terminal and freeze all state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Unplaced,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_unplaced(self) -> bool {
        matches!(self, Self::Unplaced)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Unplaced
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }

    pub const fn hit_mine(self) -> bool {
        matches!(self, Self::HitMine)
    }
}

/// Merge for multi-cell operations: a hit mine dominates, then a win.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// A single game from construction to a terminal state.
///
/// The board is constructed without mines; the first reveal commits a layout
/// that excludes the revealed cell. All grids are exclusively owned, so
/// `Clone` yields a fully independent board for simulating a branch without
/// touching the live game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    seed: u64,
    minefield: Option<Minefield>,
    revealed: Array2<bool>,
    flagged: Array2<bool>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let shape = config.size.to_nd_index();
        Self {
            config,
            seed,
            minefield: None,
            revealed: Array2::default(shape),
            flagged: Array2::default(shape),
            revealed_count: 0,
            flagged_count: 0,
            state: Default::default(),
        }
    }

    /// Starts a game on a pre-committed layout, skipping lazy placement.
    /// The first reveal on such a board is not guaranteed safe.
    pub fn with_minefield(minefield: Minefield) -> Self {
        let shape = minefield.size().to_nd_index();
        Self {
            config: minefield.game_config(),
            seed: 0,
            minefield: Some(minefield),
            revealed: Array2::default(shape),
            flagged: Array2::default(shape),
            revealed_count: 0,
            flagged_count: 0,
            state: GameState::InProgress,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_won(&self) -> bool {
        matches!(self.state, GameState::Won)
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        match &self.minefield {
            Some(minefield) => minefield.mine_count(),
            None => self.config.mines,
        }
    }

    pub fn flag_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    /// How many mines have not been flagged yet; negative when overflagged.
    pub fn mines_left(&self) -> isize {
        (self.total_mines() as isize) - (self.flagged_count as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.config.validate_coords(coords)?;

        Ok(if self.flagged[coords.to_nd_index()] {
            CellView::Flagged
        } else if self.revealed[coords.to_nd_index()] {
            match self.field().value_at(coords) {
                CellValue::Mine => CellView::Mine,
                CellValue::Clear(count) => CellView::Revealed(count),
            }
        } else {
            CellView::Hidden
        })
    }

    pub fn revealed_at(&self, coords: Coord2) -> Result<bool> {
        let coords = self.config.validate_coords(coords)?;
        Ok(self.revealed[coords.to_nd_index()])
    }

    pub fn flagged_at(&self, coords: Coord2) -> Result<bool> {
        let coords = self.config.validate_coords(coords)?;
        Ok(self.flagged[coords.to_nd_index()])
    }

    /// Committed value of a cell, regardless of whether it is revealed.
    pub fn neighbor_count(&self, coords: Coord2) -> Result<CellValue> {
        let coords = self.config.validate_coords(coords)?;
        let minefield = self.minefield.as_ref().ok_or(GameError::NotStarted)?;
        Ok(minefield.value_at(coords))
    }

    /// Flips the flag annotation on a hidden cell. Flags never touch the
    /// layout or the revealed mask, and may be placed before the first
    /// reveal commits a layout.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_not_finished()?;

        if self.revealed[coords.to_nd_index()] {
            return Ok(MarkOutcome::NoChange);
        }

        let flag = &mut self.flagged[coords.to_nd_index()];
        *flag = !*flag;
        if *flag {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
        Ok(MarkOutcome::Changed)
    }

    /// Reveals one cell. The first successful reveal commits the mine layout
    /// with `coords` excluded, so it can never hit a mine. Revealing an
    /// already revealed or flagged cell changes nothing.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_not_finished()?;

        if self.revealed[coords.to_nd_index()] || self.flagged[coords.to_nd_index()] {
            return Ok(RevealOutcome::NoChange);
        }

        if self.minefield.is_none() {
            self.place_mines(coords);
        }

        Ok(self.reveal_cell(coords))
    }

    fn place_mines(&mut self, exclude: Coord2) {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let minefield = Minefield::random(self.config, exclude, &mut rng);
        log::debug!(
            "committed {} mines, first reveal at {:?}",
            minefield.mine_count(),
            exclude
        );
        self.minefield = Some(minefield);
        self.state = GameState::InProgress;
    }

    pub(crate) fn reveal_cell(&mut self, coords: Coord2) -> RevealOutcome {
        if self.revealed[coords.to_nd_index()] || self.flagged[coords.to_nd_index()] {
            return RevealOutcome::NoChange;
        }

        self.revealed[coords.to_nd_index()] = true;

        match self.field().value_at(coords) {
            CellValue::Mine => {
                log::debug!("mine hit at {:?}", coords);
                self.state = GameState::Lost;
                self.disclose_mines();
                RevealOutcome::HitMine
            }
            CellValue::Clear(count) => {
                self.revealed_count += 1;
                log::debug!("revealed {:?}, neighbor count {}", coords, count);

                if count == 0 {
                    self.flood_fill(coords);
                }

                if self.revealed_count == self.field().safe_cell_count() {
                    self.state = GameState::Won;
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
        }
    }

    /// Opens the 8-connected region of zero-count cells around `origin`
    /// together with its positive-count boundary. Work-list traversal, each
    /// cell visited at most once; revealed and flagged cells are skipped.
    fn flood_fill(&mut self, origin: Coord2) {
        let mut visited: HashSet<Coord2> = HashSet::new();
        visited.insert(origin);

        let mut to_visit: VecDeque<Coord2> = self
            .revealed
            .iter_neighbors(origin)
            .filter(|&pos| !self.revealed[pos.to_nd_index()] && !self.flagged[pos.to_nd_index()])
            .collect();

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }

            if self.revealed[coords.to_nd_index()] || self.flagged[coords.to_nd_index()] {
                continue;
            }

            // neighbors of a zero cell are never mines
            let CellValue::Clear(count) = self.field().value_at(coords) else {
                continue;
            };

            self.revealed[coords.to_nd_index()] = true;
            self.revealed_count += 1;
            log::trace!("flood revealed {:?}, neighbor count {}", coords, count);

            if count == 0 {
                to_visit.extend(
                    self.revealed
                        .iter_neighbors(coords)
                        .filter(|&pos| {
                            !self.revealed[pos.to_nd_index()] && !self.flagged[pos.to_nd_index()]
                        })
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    /// Marks hidden mines revealed after a loss. Display-only disclosure:
    /// no counts change and no cascade runs. Flagged mines keep their flag.
    fn disclose_mines(&mut self) {
        let (rows, cols) = self.config.size;
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                if self.field().contains_mine(coords) && !self.flagged[coords.to_nd_index()] {
                    self.revealed[coords.to_nd_index()] = true;
                }
            }
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    pub(crate) fn minefield(&self) -> Option<&Minefield> {
        self.minefield.as_ref()
    }

    fn field(&self) -> &Minefield {
        self.minefield
            .as_ref()
            .expect("mines are placed before any reveal")
    }

    pub(crate) fn is_revealed(&self, coords: Coord2) -> bool {
        self.revealed[coords.to_nd_index()]
    }

    pub(crate) fn is_flagged(&self, coords: Coord2) -> bool {
        self.flagged[coords.to_nd_index()]
    }

    /// Revealed clear cell with a positive count, if any.
    pub(crate) fn clue_at(&self, coords: Coord2) -> Option<u8> {
        if !self.revealed[coords.to_nd_index()] {
            return None;
        }
        match self.field().value_at(coords) {
            CellValue::Clear(count) if count > 0 => Some(count),
            _ => None,
        }
    }

    pub(crate) fn place_flag(&mut self, coords: Coord2) {
        let index = coords.to_nd_index();
        if !self.flagged[index] && !self.revealed[index] {
            self.flagged[index] = true;
            self.flagged_count += 1;
        }
    }

    pub(crate) fn neighbors(&self, coords: Coord2) -> NeighborIter {
        self.revealed.iter_neighbors(coords)
    }
}
