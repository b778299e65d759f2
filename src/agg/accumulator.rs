use super::partial::{PartialState, MAX_COUNT};
use crate::error::AggregationError;

fn add_count(count: u64, rows: u64) -> Result<u64, AggregationError> {
    count
        .checked_add(rows)
        .filter(|&total| total <= MAX_COUNT)
        .ok_or(AggregationError::CountOverflow)
}

/// Streaming mean over N columns.
///
/// Holds one running sum per column and a single row counter shared by
/// all columns. Raw rows are folded in with [`MeanAccumulator::accumulate`],
/// other accumulators' partial states with [`MeanAccumulator::merge`].
///
/// A null value leaves its column's sum untouched, but the row is still
/// counted, so it lowers that column's mean.
///
/// ```
/// use colmean::MeanAccumulator;
///
/// let mut left = MeanAccumulator::new(1);
/// left.accumulate(&[Some(2)])?;
/// left.accumulate(&[Some(4)])?;
///
/// let mut right = MeanAccumulator::new(1);
/// right.accumulate(&[Some(4)])?;
/// right.accumulate(&[Some(6)])?;
///
/// left.merge(Some(&right.snapshot()?))?;
/// assert_eq!(vec![4.0], left.finalize()?);
/// #
/// # Ok::<(), colmean::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MeanAccumulator {
    state: Option<PartialState>,
}

impl MeanAccumulator {
    /// Creates an accumulator that is ready to take `columns` columns.
    #[must_use]
    pub fn new(columns: usize) -> Self {
        let mut accu = Self::default();
        accu.reset(columns);
        accu
    }

    /// Clears all sums and the row count, and sets the column count.
    pub fn reset(&mut self, columns: usize) {
        self.state = Some(PartialState::empty(columns));
    }

    fn state(&self) -> Result<&PartialState, AggregationError> {
        self.state.as_ref().ok_or(AggregationError::Uninitialized)
    }

    fn state_mut(&mut self) -> Result<&mut PartialState, AggregationError> {
        self.state.as_mut().ok_or(AggregationError::Uninitialized)
    }

    /// Returns `true` if [`MeanAccumulator::reset`] was called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Number of columns, `None` before the first reset.
    #[must_use]
    pub fn columns(&self) -> Option<usize> {
        self.state.as_ref().map(PartialState::columns)
    }

    /// Number of rows absorbed so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.state.as_ref().map_or(0, PartialState::count)
    }

    /// Per-column running sums.
    #[must_use]
    pub fn sums(&self) -> &[f64] {
        match &self.state {
            Some(state) => &state.sums,
            None => &[],
        }
    }

    /// Adds one row.
    ///
    /// Values are widened to `f64`. `None` skips that column for this row.
    ///
    /// # Errors
    ///
    /// Returns error if the accumulator is not initialized,
    /// the row does not have exactly one value per column,
    /// or the row count would exceed [`MAX_COUNT`].
    pub fn accumulate<V: Into<f64> + Copy>(
        &mut self,
        row: &[Option<V>],
    ) -> Result<(), AggregationError> {
        let state = self.state_mut()?;

        if row.len() != state.sums.len() {
            return Err(AggregationError::ShapeMismatch {
                expected: state.sums.len(),
                actual: row.len(),
            });
        }

        // NOTE: Counted once per row, even if some columns were null
        let count = add_count(state.count, 1)?;

        for (sum, value) in state.sums.iter_mut().zip(row) {
            if let Some(value) = *value {
                *sum += Into::<f64>::into(value);
            }
        }

        state.count = count;

        Ok(())
    }

    /// Returns a copy of the current sums and row count.
    ///
    /// # Errors
    ///
    /// Returns error if the accumulator is not initialized.
    pub fn snapshot(&self) -> Result<PartialState, AggregationError> {
        self.state().cloned()
    }

    /// Folds another accumulator's partial state into this one.
    ///
    /// `None` is treated as an empty partial state.
    ///
    /// # Errors
    ///
    /// Returns error if the accumulator is not initialized,
    /// the partial state has a different column count,
    /// or the combined row count would exceed [`MAX_COUNT`].
    pub fn merge(&mut self, other: Option<&PartialState>) -> Result<(), AggregationError> {
        let state = self.state_mut()?;

        let Some(other) = other else {
            return Ok(());
        };

        if other.sums.len() != state.sums.len() {
            log::warn!(
                "refusing to merge partial state with {} columns into {} columns",
                other.sums.len(),
                state.sums.len()
            );

            return Err(AggregationError::ShapeMismatch {
                expected: state.sums.len(),
                actual: other.sums.len(),
            });
        }

        let count = add_count(state.count, other.count)?;

        for (sum, x) in state.sums.iter_mut().zip(&other.sums) {
            *sum += x;
        }
        state.count = count;

        Ok(())
    }

    /// Returns one mean per column, in column order.
    ///
    /// Without any rows, every mean is NaN.
    ///
    /// # Errors
    ///
    /// Returns error if the accumulator is not initialized.
    #[allow(clippy::cast_precision_loss)]
    pub fn finalize(&self) -> Result<Vec<f64>, AggregationError> {
        let state = self.state()?;

        let count = state.count as f64;

        Ok(state.sums.iter().map(|sum| sum / count).collect())
    }
}
