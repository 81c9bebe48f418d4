//! Ordered channel-parameter grid.

use crate::config::GridRange;
use crate::error::{Error, Result};
use serde::Serialize;

/// Ordered channel-parameter values swept by the simulator.
///
/// Values are generated once by repeated addition of `step` to `start`
/// while the value stays below `stop`, so the grid is strictly increasing
/// and never contains `stop` itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelParameterGrid {
    values: Vec<f64>,
}

impl ChannelParameterGrid {
    /// Generates the grid for `range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGrid`] unless `step > 0` and every bound is
    /// finite.
    pub fn new(range: GridRange) -> Result<Self> {
        let GridRange { start, stop, step } = range;
        if !step.is_finite() || step <= 0.0 || !start.is_finite() || !stop.is_finite() {
            return Err(Error::InvalidGrid { start, stop, step });
        }

        let mut values = Vec::new();
        let mut value = start;
        while value < stop {
            values.push(value);
            let next = value + step;
            // A step below the float resolution at `value` would never advance.
            if next <= value {
                return Err(Error::InvalidGrid { start, stop, step });
            }
            value = next;
        }
        Ok(Self { values })
    }

    /// Grid values in sweep order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of sweep points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the grid has no points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the values in sweep order.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }
}

impl<'a> IntoIterator for &'a ChannelParameterGrid {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_point_grid() {
        let grid = ChannelParameterGrid::new(GridRange::new(1.0, 2.0, 1.0)).unwrap();
        assert_eq!(grid.values(), &[1.0]);
    }

    #[test]
    fn stop_is_exclusive() {
        let grid = ChannelParameterGrid::new(GridRange::new(0.0, 2.0, 0.5)).unwrap();
        assert_eq!(grid.values(), &[0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn empty_when_start_reaches_stop() {
        let grid = ChannelParameterGrid::new(GridRange::new(3.0, 3.0, 0.1)).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn rejects_bad_steps() {
        assert!(ChannelParameterGrid::new(GridRange::new(0.0, 1.0, 0.0)).is_err());
        assert!(ChannelParameterGrid::new(GridRange::new(0.0, 1.0, -1.0)).is_err());
        assert!(ChannelParameterGrid::new(GridRange::new(0.0, f64::INFINITY, 1.0)).is_err());
        assert!(ChannelParameterGrid::new(GridRange::new(1e20, 2e20, 1e-3)).is_err());
    }

    proptest! {
        #[test]
        fn grid_is_increasing_and_bounded(
            start in -20.0f64..20.0,
            span in 0.0f64..10.0,
            step in 0.01f64..2.0,
        ) {
            let stop = start + span;
            let grid = ChannelParameterGrid::new(GridRange::new(start, stop, step)).unwrap();
            if let Some(&first) = grid.values().first() {
                prop_assert_eq!(first, start);
            }
            prop_assert!(grid.values().windows(2).all(|w| w[0] < w[1]));
            if let Some(&last) = grid.values().last() {
                prop_assert!(last < stop);
            }
        }
    }
}
