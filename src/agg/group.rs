use super::{accumulator::MeanAccumulator, partial::PartialState};
use crate::error::AggregationError;

/// A dictionary of accumulators, one per group-by key.
///
/// Every group has the same column count. Groups are created the first time
/// a row or partial state arrives for their key.
///
/// Call `.collect()` to finalize all groups into one result.
#[derive(Clone, Debug)]
pub struct GroupedMeans {
    columns: usize,
    groups: crate::HashMap<String, MeanAccumulator>,
}

impl std::ops::Deref for GroupedMeans {
    type Target = crate::HashMap<String, MeanAccumulator>;

    fn deref(&self) -> &Self::Target {
        &self.groups
    }
}

impl IntoIterator for GroupedMeans {
    type Item = (String, MeanAccumulator);
    type IntoIter = std::collections::hash_map::IntoIter<String, MeanAccumulator>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl GroupedMeans {
    /// Creates an empty set of groups with `columns` columns each.
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            groups: crate::HashMap::default(),
        }
    }

    /// Column count of every group.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    fn group_mut(&mut self, key: &str) -> &mut MeanAccumulator {
        let columns = self.columns;

        self.groups.entry(key.to_owned()).or_insert_with(|| {
            log::trace!("creating group {key:?}");
            MeanAccumulator::new(columns)
        })
    }

    /// Adds one row to the group `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the row does not have one value per column.
    pub fn accumulate<V: Into<f64> + Copy>(
        &mut self,
        key: &str,
        row: &[Option<V>],
    ) -> Result<(), AggregationError> {
        if row.len() != self.columns {
            return Err(AggregationError::ShapeMismatch {
                expected: self.columns,
                actual: row.len(),
            });
        }

        self.group_mut(key).accumulate(row)
    }

    /// Folds a partial state into the group `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the partial state has a different column count.
    pub fn merge(
        &mut self,
        key: &str,
        partial: Option<&PartialState>,
    ) -> Result<(), AggregationError> {
        if let Some(partial) = partial {
            if partial.columns() != self.columns {
                return Err(AggregationError::ShapeMismatch {
                    expected: self.columns,
                    actual: partial.columns(),
                });
            }
        }

        self.group_mut(key).merge(partial)
    }

    /// Folds every group of another worker's snapshot into this one.
    ///
    /// # Errors
    ///
    /// Returns error if any partial state has a different column count.
    /// Groups merged before the failing one stay merged.
    pub fn merge_all(
        &mut self,
        snapshot: &crate::HashMap<String, PartialState>,
    ) -> Result<(), AggregationError> {
        for (key, partial) in snapshot {
            self.merge(key, Some(partial))?;
        }
        Ok(())
    }

    /// Returns a copy of every group's partial state.
    ///
    /// # Errors
    ///
    /// Never fails in practice, as every group is initialized on creation.
    pub fn snapshot(&self) -> Result<crate::HashMap<String, PartialState>, AggregationError> {
        self.groups
            .iter()
            .map(|(key, accu)| Ok((key.clone(), accu.snapshot()?)))
            .collect()
    }

    /// Returns the means of every group without consuming them.
    ///
    /// # Errors
    ///
    /// Never fails in practice, as every group is initialized on creation.
    pub fn finalize(&self) -> Result<crate::HashMap<String, Vec<f64>>, AggregationError> {
        self.groups
            .iter()
            .map(|(key, accu)| Ok((key.clone(), accu.finalize()?)))
            .collect()
    }

    /// Consumes all groups, returning a dictionary mapping each group to its means.
    ///
    /// # Errors
    ///
    /// Never fails in practice, as every group is initialized on creation.
    pub fn collect(self) -> Result<crate::HashMap<String, Vec<f64>>, AggregationError> {
        let mut map =
            crate::HashMap::with_capacity_and_hasher(self.groups.len(), rustc_hash::FxBuildHasher);

        for (group, accu) in self.groups {
            map.insert(group, accu.finalize()?);
        }

        Ok(map)
    }
}
