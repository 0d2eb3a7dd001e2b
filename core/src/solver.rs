use smallvec::SmallVec;

use crate::*;

/// Scratch list for one Moore neighborhood.
type NeighborBuf = SmallVec<[Coord2; 8]>;

impl Game {
    /// Flags every certain mine found by a single row-major pass of local
    /// deduction: a revealed clue whose hidden plus flagged neighbors exactly
    /// match its count has only mines left hidden. Flags placed earlier in
    /// the pass are visible to later clues; there is no snapshot isolation.
    pub fn auto_flag(&mut self) -> MarkOutcome {
        if self.state() != GameState::InProgress {
            return MarkOutcome::NoChange;
        }

        let (rows, cols) = self.size();
        let mut outcome = MarkOutcome::NoChange;

        for row in 0..rows {
            for col in 0..cols {
                let clue = (row, col);
                let Some(count) = self.clue_at(clue) else {
                    continue;
                };

                let (hidden, flagged) = self.split_neighbors(clue);
                if hidden.is_empty() || hidden.len() + flagged != usize::from(count) {
                    continue;
                }

                for pos in hidden {
                    self.place_flag(pos);
                    outcome = MarkOutcome::Changed;
                }
            }
        }

        outcome
    }

    /// Reveals every neighbor deduced safe by a single row-major pass: a
    /// revealed clue already matched by exactly as many flags as its count
    /// has only safe cells left hidden. Flags are trusted literally, so a
    /// misplaced flag can reveal a mine and lose the game. Reveals cascade
    /// through flood fill and are visible to later clues in the same pass;
    /// the pass stops as soon as the game reaches a terminal state.
    pub fn auto_reveal(&mut self) -> RevealOutcome {
        if self.state() != GameState::InProgress {
            return RevealOutcome::NoChange;
        }

        let (rows, cols) = self.size();
        let mut outcome = RevealOutcome::NoChange;

        'pass: for row in 0..rows {
            for col in 0..cols {
                let clue = (row, col);
                let Some(count) = self.clue_at(clue) else {
                    continue;
                };

                let (hidden, flagged) = self.split_neighbors(clue);
                if flagged != usize::from(count) {
                    continue;
                }

                for pos in hidden {
                    outcome = outcome | self.reveal_cell(pos);
                    if self.is_finished() {
                        break 'pass;
                    }
                }
            }
        }

        outcome
    }

    /// Hidden unflagged neighbors and the flagged-neighbor count of a cell.
    fn split_neighbors(&self, coords: Coord2) -> (NeighborBuf, usize) {
        let mut hidden = NeighborBuf::new();
        let mut flagged = 0;

        for pos in self.neighbors(coords) {
            if self.is_flagged(pos) {
                flagged += 1;
            } else if !self.is_revealed(pos) {
                hidden.push(pos);
            }
        }

        (hidden, flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_5x5() -> Game {
        let field = Minefield::from_mine_coords((5, 5), &[(0, 0), (2, 2), (4, 4)]).unwrap();
        Game::with_minefield(field)
    }

    #[test]
    fn auto_flag_flags_the_only_hidden_neighbor_of_a_saturated_clue() {
        let mut game = game_5x5();
        // floods the top-right zero region; (1, 3) becomes a "1" whose only
        // hidden neighbor is the mine at (2, 2)
        game.reveal((0, 4)).unwrap();

        assert_eq!(game.auto_flag(), MarkOutcome::Changed);

        assert_eq!(game.cell_at((2, 2)).unwrap(), CellView::Flagged);
        assert_eq!(game.flag_count(), 1);
        // unsaturated clues placed no flags
        assert_eq!(game.cell_at((4, 3)).unwrap(), CellView::Hidden);
        assert_eq!(game.cell_at((3, 2)).unwrap(), CellView::Hidden);
    }

    #[test]
    fn auto_flag_flags_a_mine_shared_by_several_clues_once() {
        let field = Minefield::from_mine_coords((2, 5), &[(0, 0), (0, 4)]).unwrap();
        let mut game = Game::with_minefield(field);
        game.reveal((0, 2)).unwrap();
        game.reveal((1, 0)).unwrap();

        assert_eq!(game.auto_flag(), MarkOutcome::Changed);

        // (0, 1) pins the mine at (0, 0); the flag it places empties the
        // hidden sets of (1, 0) and (1, 1) later in the same pass, so the
        // shared mine is flagged exactly once
        assert_eq!(game.cell_at((0, 0)).unwrap(), CellView::Flagged);
        assert_eq!(game.flag_count(), 1);
        // the clues around (0, 4) still see two hidden cells and stay put
        assert_eq!(game.cell_at((0, 4)).unwrap(), CellView::Hidden);
        assert_eq!(game.cell_at((1, 4)).unwrap(), CellView::Hidden);
    }

    #[test]
    fn auto_flag_is_idempotent_across_passes() {
        let mut game = game_5x5();
        game.reveal((0, 4)).unwrap();

        game.auto_flag();
        let after_first = game.clone();

        assert_eq!(game.auto_flag(), MarkOutcome::NoChange);
        assert_eq!(game, after_first);
    }

    #[test]
    fn auto_reveal_opens_neighbors_of_satisfied_clues() {
        let mut game = game_5x5();
        game.reveal((0, 4)).unwrap();
        game.auto_flag();

        let outcome = game.auto_reveal();

        // (2, 3) is a "1" matched by the flag on (2, 2), so its remaining
        // hidden neighbor (3, 2) is safe; the reveals it unlocks cascade
        // through the rest of the board within the same pass
        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(game.cell_at((3, 2)).unwrap(), CellView::Revealed(1));
        assert!(game.is_won());
    }

    #[test]
    fn auto_reveal_cascade_feeds_later_clues_in_the_same_pass() {
        // single mine at (1, 3): the left two columns are a zero region,
        // column 2 is its numbered boundary
        let field = Minefield::from_mine_coords((3, 4), &[(1, 3)]).unwrap();
        let mut game = Game::with_minefield(field);

        game.reveal((0, 0)).unwrap();
        game.toggle_flag((1, 3)).unwrap();
        assert_eq!(game.revealed_count(), 9);

        // one pass: (0, 2) opens (0, 3), then (1, 2) opens (2, 3), which
        // finishes the board
        assert_eq!(game.auto_reveal(), RevealOutcome::Won);
        assert!(game.is_won());
    }

    #[test]
    fn auto_reveal_trusts_a_wrong_flag_and_can_lose() {
        let field = Minefield::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut game = Game::with_minefield(field);

        game.reveal((1, 1)).unwrap();
        game.toggle_flag((0, 1)).unwrap();

        let outcome = game.auto_reveal();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(game.state(), GameState::Lost);
        assert!(!game.is_won());
    }

    #[test]
    fn heuristics_do_nothing_before_placement_or_after_the_end() {
        let mut unplaced = Game::new(GameConfig::new((5, 5), 3), 9);
        assert_eq!(unplaced.auto_flag(), MarkOutcome::NoChange);
        assert_eq!(unplaced.auto_reveal(), RevealOutcome::NoChange);
        assert_eq!(unplaced.state(), GameState::Unplaced);

        let mut lost = game_5x5();
        lost.reveal((2, 2)).unwrap();
        assert!(lost.is_finished());
        assert_eq!(lost.auto_flag(), MarkOutcome::NoChange);
        assert_eq!(lost.auto_reveal(), RevealOutcome::NoChange);
    }

    #[test]
    fn passes_reach_a_fixed_point_without_solving_ambiguous_boards() {
        // a lone "1" touching three hidden cells supports no deduction
        let field = Minefield::from_mine_coords((2, 3), &[(0, 0), (0, 2)]).unwrap();
        let mut game = Game::with_minefield(field);
        game.reveal((1, 0)).unwrap();

        let snapshot = game.clone();
        assert_eq!(game.auto_flag(), MarkOutcome::NoChange);
        assert_eq!(game.auto_reveal(), RevealOutcome::NoChange);
        assert_eq!(game, snapshot);
        assert!(!game.is_finished());
    }
}
