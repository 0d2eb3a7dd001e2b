use core::ops::Index;

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Committed mine layout. Built exactly once per game; every clear cell
/// carries its Moore-neighborhood mine count, computed at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    values: Array2<CellValue>,
    mine_count: CellCount,
}

impl Minefield {
    /// Samples `config.mines` distinct positions uniformly at random from all
    /// cells except `exclude`, by rejection, then fills in neighbor counts.
    pub fn random(config: GameConfig, exclude: Coord2, rng: &mut impl Rng) -> Self {
        let (rows, cols) = config.size;
        let capacity = config.total_cells().saturating_sub(1);

        let mut target = config.mines;
        if target > capacity {
            log::warn!(
                "mine count {} cannot spare a safe first cell, clamping to {}",
                target,
                capacity
            );
            target = capacity;
        }

        let mut mines: Array2<bool> = Array2::default((rows as usize, cols as usize));
        let mut placed: CellCount = 0;
        while placed < target {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            if coords == exclude || mines[coords.to_nd_index()] {
                continue;
            }
            mines[coords.to_nd_index()] = true;
            placed += 1;
        }

        Self::from_mine_mask(mines)
    }

    /// Builds a layout from explicit mine positions. Fixture constructor for
    /// tests and for replaying known boards.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mines[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mines))
    }

    fn from_mine_mask(mines: Array2<bool>) -> Self {
        let mut values: Array2<CellValue> = Array2::default(mines.raw_dim());
        let mut mine_count: CellCount = 0;

        for (index, &is_mine) in mines.indexed_iter() {
            if is_mine {
                values[index] = CellValue::Mine;
                mine_count += 1;
                continue;
            }

            let coords = (index.0 as Coord, index.1 as Coord);
            let adjacent = mines
                .iter_neighbors(coords)
                .filter(|&pos| mines[pos.to_nd_index()])
                .count();
            values[index] = CellValue::Clear(adjacent.try_into().unwrap());
        }

        Self { values, mine_count }
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size(),
            mines: self.mine_count,
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.values.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.values.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn value_at(&self, coords: Coord2) -> CellValue {
        self.values[coords.to_nd_index()]
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.value_at(coords).is_mine()
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.values.iter_neighbors(coords)
    }
}

impl Index<Coord2> for Minefield {
    type Output = CellValue;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.values[coords.to_nd_index()]
    }
}
