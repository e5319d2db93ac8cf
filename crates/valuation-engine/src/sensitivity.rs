//! Two-way sensitivity of the perpetuity value to WACC and terminal growth.

use serde::{Deserialize, Serialize};

/// A WACC × growth grid of perpetuity values.
///
/// Cells where `wacc ≤ g` have no finite value and hold `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensitivityMatrix {
    /// Row axis: discount rates.
    pub wacc_values: Vec<f64>,
    /// Column axis: terminal growth rates.
    pub growth_values: Vec<f64>,
    /// `cells[i][j]` is the value at `wacc_values[i]`, `growth_values[j]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl SensitivityMatrix {
    /// Returns the cell at a row/column index pair.
    #[must_use]
    pub fn cell(&self, wacc_index: usize, growth_index: usize) -> Option<f64> {
        self.cells.get(wacc_index)?.get(growth_index).copied()?
    }
}

/// Builds the perpetuity-value grid `fcff × (1 + g) / (wacc − g)`.
#[must_use]
pub fn perpetuity_matrix(fcff: f64, waccs: &[f64], growths: &[f64]) -> SensitivityMatrix {
    let cells = waccs
        .iter()
        .map(|&wacc| {
            growths
                .iter()
                .map(|&g| (wacc > g).then(|| fcff * (1.0 + g) / (wacc - g)))
                .collect()
        })
        .collect();

    SensitivityMatrix {
        wacc_values: waccs.to_vec(),
        growth_values: growths.to_vec(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_values_and_degenerate_cells() {
        let matrix = perpetuity_matrix(100.0, &[0.08, 0.10], &[0.02, 0.03, 0.10]);

        // 100 × 1.02 / 0.06 = 1700.
        assert!((matrix.cell(0, 0).unwrap() - 1700.0).abs() < 1e-9);
        // 100 × 1.03 / 0.07 ≈ 1471.43.
        assert!((matrix.cell(1, 1).unwrap() - 1471.43).abs() < 0.01);
        // wacc ≤ g cells are empty, not infinite.
        assert!(matrix.cell(0, 2).is_none());
        assert!(matrix.cell(1, 2).is_none());
    }
}
