use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// One supervised pair: the board as the player saw it, and the full mine
/// layout as the per-cell target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub input: Vec<f32>,
    pub target: Vec<f32>,
}

/// Plays heuristic self-play games and records a training sample at every
/// decision point. Each runner owns its random source, so independent
/// runners can generate data in parallel without any shared state.
#[derive(Clone, Debug)]
pub struct EpisodeRunner {
    config: GameConfig,
    rng: SmallRng,
}

impl EpisodeRunner {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Plays a single game to the end. Each step simulates an `auto_flag`
    /// pass on a branch copy, records the pre-pass observation against the
    /// ground-truth layout, then adopts the branch: if the pass placed a
    /// flag the deduction is cashed in with `auto_reveal`, otherwise a
    /// random hidden unflagged cell is revealed to keep the game moving.
    pub fn run_episode(&mut self) -> Result<Vec<TrainingSample>> {
        let (rows, cols) = self.config.size;
        let mut samples = Vec::new();

        let mut game = Game::new(self.config, self.rng.random());
        let first = (
            self.rng.random_range(0..rows),
            self.rng.random_range(0..cols),
        );
        game.reveal(first)?;

        while !game.is_finished() {
            let mut branch = game.clone();
            let flagged = branch.auto_flag().has_update();

            samples.push(TrainingSample {
                input: game.to_input()?,
                target: branch.to_output()?,
            });

            game = branch;
            if flagged {
                game.auto_reveal();
            } else {
                let Some(coords) = self.pick_hidden(&game) else {
                    break;
                };
                game.reveal(coords)?;
            }
        }

        Ok(samples)
    }

    /// Concatenates the samples of `games` consecutive episodes. The
    /// runner's seed fixes the whole run, so datasets are reproducible.
    pub fn run_dataset(&mut self, games: usize) -> Result<Vec<TrainingSample>> {
        let mut samples = Vec::new();
        for _ in 0..games {
            samples.extend(self.run_episode()?);
        }
        Ok(samples)
    }

    fn pick_hidden(&mut self, game: &Game) -> Option<Coord2> {
        let (rows, cols) = game.size();
        let mut candidates = Vec::new();

        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                if !game.is_revealed(coords) && !game.is_flagged(coords) {
                    candidates.push(coords);
                }
            }
        }

        if candidates.is_empty() {
            None
        } else {
            Some(candidates[self.rng.random_range(0..candidates.len())])
        }
    }
}
