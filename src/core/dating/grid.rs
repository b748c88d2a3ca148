//! Discretisation of node ages into a fixed set of candidate times (generations).
use crate::types::TimeGrid;

/// End of the uniform grid, in units of 2Ne generations. Both grids end at or before it.
pub(crate) const UNIFORM_SPAN: f64 = 8.0;

/// Largest prior quantile covered by the adaptive grid
const ADAPTIVE_MAX_QUANTILE: f64 = 0.999;

/// Build a `slices`-point grid starting at the present (t = 0).
/// Callers guarantee `slices >= 2` and a positive population size.
pub fn build_time_grid(strategy: TimeGrid, slices: usize, population_size: f64) -> Vec<f64> {
    let scale = 2.0 * population_size;
    let last = (slices - 1) as f64;

    (0..slices)
        .map(|i| {
            let frac = i as f64 / last;
            match strategy {
                TimeGrid::Uniform => frac * UNIFORM_SPAN * scale,
                // Exponential quantiles, written so that t_0 is +0.0
                TimeGrid::Adaptive => (1.0 / (1.0 - ADAPTIVE_MAX_QUANTILE * frac)).ln() * scale,
            }
        })
        .collect()
}

/// Merge fixed node times (e.g. sample ages) into the grid so they are exact grid points.
///
/// A free node wedged between two fixed times needs a candidate age strictly
/// between them, and one above the oldest fixed time. Such points are added
/// (the midpoint, or twice the oldest time) wherever the base grid has none.
pub fn with_fixed_times<I>(mut grid: Vec<f64>, fixed: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut fixed: Vec<f64> = fixed.into_iter().collect();
    fixed.sort_by(f64::total_cmp);
    fixed.dedup_by(|a, b| same_time(*a, *b));

    let mut extra = Vec::new();
    for pair in fixed.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if !grid.iter().any(|&t| lo < t && t < hi) {
            extra.push(0.5 * (lo + hi));
        }
    }
    if let Some(&oldest) = fixed.last() {
        if oldest > 0.0 && !grid.iter().any(|&t| t > oldest) {
            extra.push(2.0 * oldest);
        }
    }

    grid.extend(fixed);
    grid.extend(extra);
    grid.sort_by(f64::total_cmp);
    grid.dedup_by(|a, b| same_time(*a, *b));
    grid
}

fn same_time(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::EPSILON * b.abs().max(1.0)
}

/// Index of the grid point closest to `time`
pub fn nearest_index(grid: &[f64], time: f64) -> usize {
    let upper = grid.partition_point(|&t| t < time);
    if upper == 0 {
        return 0;
    }
    if upper >= grid.len() {
        return grid.len() - 1;
    }
    if (grid[upper] - time).abs() < (time - grid[upper - 1]).abs() {
        upper
    } else {
        upper - 1
    }
}

/// Width of the time interval each grid point stands for (midpoint rule)
pub fn interval_widths(grid: &[f64]) -> Vec<f64> {
    let n = grid.len();
    (0..n)
        .map(|i| {
            let lo = if i == 0 { grid[0] } else { 0.5 * (grid[i - 1] + grid[i]) };
            let hi = if i + 1 == n {
                grid[n - 1]
            } else {
                0.5 * (grid[i] + grid[i + 1])
            };
            hi - lo
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strictly_increasing(grid: &[f64]) -> bool {
        grid.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_uniform_grid_is_evenly_spaced() {
        let grid = build_time_grid(TimeGrid::Uniform, 5, 100.0);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0], 0.0);
        assert!((grid[4] - 1600.0).abs() < 1e-9);
        for w in grid.windows(2) {
            assert!((w[1] - w[0] - 400.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_adaptive_grid_spreads_out_into_the_past() {
        let grid = build_time_grid(TimeGrid::Adaptive, 50, 10000.0);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0);
        assert!(grid[0].is_sign_positive());
        assert!(strictly_increasing(&grid));

        let first_gap = grid[1] - grid[0];
        let last_gap = grid[49] - grid[48];
        assert!(last_gap > 10.0 * first_gap);
    }

    #[test]
    fn test_fixed_times_become_grid_points() {
        let grid = build_time_grid(TimeGrid::Uniform, 3, 1.0);
        let merged = with_fixed_times(grid, [0.0, 3.0, 3.0]);
        assert_eq!(merged, vec![0.0, 1.5, 3.0, 8.0, 16.0]);
        assert_eq!(nearest_index(&merged, 3.0), 2);
    }

    #[test]
    fn test_fixed_times_keep_free_points_between_and_above() {
        let grid = build_time_grid(TimeGrid::Uniform, 3, 1.0);
        let merged = with_fixed_times(grid.clone(), [0.0, 20.0]);
        assert_eq!(merged, vec![0.0, 8.0, 16.0, 20.0, 40.0]);

        // Base points already separate the fixed times
        let merged = with_fixed_times(grid, [0.0, 10.0]);
        assert_eq!(merged, vec![0.0, 8.0, 10.0, 16.0]);
    }

    #[test]
    fn test_nearest_index_clamps_and_rounds() {
        let grid = [0.0, 1.0, 2.0, 4.0];
        assert_eq!(nearest_index(&grid, -5.0), 0);
        assert_eq!(nearest_index(&grid, 1.2), 1);
        assert_eq!(nearest_index(&grid, 3.5), 3);
        assert_eq!(nearest_index(&grid, 100.0), 3);
    }

    #[test]
    fn test_interval_widths_cover_the_grid() {
        let grid = [0.0, 1.0, 3.0, 7.0];
        let widths = interval_widths(&grid);
        assert_eq!(widths, vec![0.5, 1.5, 3.0, 2.0]);
        assert!((widths.iter().sum::<f64>() - 7.0).abs() < 1e-12);
    }
}
