use alloc::vec::Vec;

use crate::*;

/// Fixed-length vector encodings, the engine's entire contract with the
/// external pattern-recognition model. Both flatten the board row-major
/// into `rows * cols` values and require a committed layout.
impl Game {
    /// What the player can see. Flags encode to `1.0`, a revealed cell with
    /// count `v` to `0.1 + 0.1 * v`, and hidden cells to `0.0`. Mines
    /// disclosed on a lost board encode as hidden; the disclosure is display
    /// only and was never legitimate player knowledge.
    pub fn to_input(&self) -> Result<Vec<f32>> {
        let minefield = self.minefield().ok_or(GameError::NotStarted)?;
        let (rows, cols) = self.size();

        let mut input = Vec::with_capacity(usize::from(self.config().total_cells()));
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                input.push(if self.is_flagged(coords) {
                    1.0
                } else if self.is_revealed(coords) {
                    match minefield.value_at(coords) {
                        CellValue::Clear(count) => 0.1 + 0.1 * f32::from(count),
                        CellValue::Mine => 0.0,
                    }
                } else {
                    0.0
                });
            }
        }

        Ok(input)
    }

    /// Ground truth for the model: mine cells encode to `1.0`, everything
    /// else to `0.0`.
    pub fn to_output(&self) -> Result<Vec<f32>> {
        let minefield = self.minefield().ok_or(GameError::NotStarted)?;
        let (rows, cols) = self.size();

        let mut output = Vec::with_capacity(usize::from(self.config().total_cells()));
        for row in 0..rows {
            for col in 0..cols {
                output.push(if minefield.contains_mine((row, col)) {
                    1.0
                } else {
                    0.0
                });
            }
        }

        Ok(output)
    }
}
