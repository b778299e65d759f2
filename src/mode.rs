use crate::{
    agg::{MeanAccumulator, PartialState},
    validate::validate,
    Error, TypeDescriptor,
};

/// Execution mode of an aggregation step.
///
/// The host engine splits an aggregation into map-side and reduce-side steps,
/// each one running in a different mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Raw rows in, partial state out.
    Partial1,

    /// Partial states in, partial state out.
    Partial2,

    /// Partial states in, means out.
    Final,

    /// Raw rows in, means out.
    #[default]
    Complete,
}

impl Mode {
    /// Returns `true` if this mode reads raw rows (instead of partial states).
    #[must_use]
    pub fn consumes_rows(self) -> bool {
        matches!(self, Self::Partial1 | Self::Complete)
    }

    /// Returns `true` if this mode produces a partial state (instead of means).
    #[must_use]
    pub fn emits_partial(self) -> bool {
        matches!(self, Self::Partial1 | Self::Partial2)
    }
}

/// Result of an aggregation step.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// Partial state, to be merged by the next step
    Partial(PartialState),

    /// One mean per column
    Final(Vec<f64>),
}

/// Builder for [`Evaluator`].
pub struct Builder {
    mode: Mode,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            mode: Mode::default(),
        }
    }

    /// Sets the execution mode.
    ///
    /// Default = [`Mode::Complete`]
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Validates the declared argument types and creates an evaluator.
    ///
    /// The argument types are those of the declared input columns, in every mode.
    ///
    /// # Errors
    ///
    /// Returns error if the argument types are rejected.
    pub fn build(self, column_types: &[TypeDescriptor]) -> crate::Result<Evaluator> {
        let columns = validate(column_types)?;

        log::debug!("created {:?} evaluator over {columns} column(s)", self.mode);

        Ok(Evaluator {
            mode: self.mode,
            columns,
        })
    }
}

/// Drives [`MeanAccumulator`]s through the steps one execution mode allows.
///
/// ```
/// use colmean::{Evaluator, Mode, Output, TypeDescriptor};
///
/// let types = [TypeDescriptor::Int, TypeDescriptor::Int];
///
/// // Map side
/// let map = Evaluator::builder().mode(Mode::Partial1).build(&types)?;
/// let Output::Partial(partial) = map.process_rows([[Some(1), Some(2)], [Some(3), None]])? else {
///     unreachable!();
/// };
///
/// // Reduce side
/// let reduce = Evaluator::builder().mode(Mode::Final).build(&types)?;
/// assert_eq!(
///     Output::Final(vec![2.0, 1.0]),
///     reduce.process_partials([partial])?,
/// );
/// #
/// # Ok::<(), colmean::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Evaluator {
    mode: Mode,
    columns: usize,
}

impl Evaluator {
    /// Creates a new evaluator builder.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Execution mode of this evaluator.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of argument columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns a new, empty aggregation buffer.
    #[must_use]
    pub fn new_buffer(&self) -> MeanAccumulator {
        MeanAccumulator::new(self.columns)
    }

    /// Empties an aggregation buffer so it can be reused for another group.
    pub fn reset(&self, buffer: &mut MeanAccumulator) {
        buffer.reset(self.columns);
    }

    /// Adds one raw row to the buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the mode does not read raw rows, or the row is rejected.
    pub fn iterate<V: Into<f64> + Copy>(
        &self,
        buffer: &mut MeanAccumulator,
        row: &[Option<V>],
    ) -> crate::Result<()> {
        if !self.mode.consumes_rows() {
            return Err(self.unsupported("iterate"));
        }
        buffer.accumulate(row)?;
        Ok(())
    }

    /// Folds a partial state into the buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the mode does not read partial states, or the state is rejected.
    pub fn merge(
        &self,
        buffer: &mut MeanAccumulator,
        partial: Option<&PartialState>,
    ) -> crate::Result<()> {
        if self.mode.consumes_rows() {
            return Err(self.unsupported("merge"));
        }
        buffer.merge(partial)?;
        Ok(())
    }

    /// Reads the buffer's result in the form this mode emits.
    ///
    /// # Errors
    ///
    /// Returns error if the buffer is not initialized.
    pub fn terminate(&self, buffer: &MeanAccumulator) -> crate::Result<Output> {
        if self.mode.emits_partial() {
            Ok(Output::Partial(buffer.snapshot()?))
        } else {
            Ok(Output::Final(buffer.finalize()?))
        }
    }

    /// Runs a whole step over raw rows: reset, iterate each row, terminate.
    ///
    /// # Errors
    ///
    /// Returns error if the mode does not read raw rows, or a row is rejected.
    pub fn process_rows<V, R, I>(&self, rows: I) -> crate::Result<Output>
    where
        V: Into<f64> + Copy,
        R: AsRef<[Option<V>]>,
        I: IntoIterator<Item = R>,
    {
        let mut buffer = self.new_buffer();
        for row in rows {
            self.iterate(&mut buffer, row.as_ref())?;
        }
        self.terminate(&buffer)
    }

    /// Runs a whole step over partial states: reset, merge each state, terminate.
    ///
    /// # Errors
    ///
    /// Returns error if the mode does not read partial states, or a state is rejected.
    pub fn process_partials<I>(&self, partials: I) -> crate::Result<Output>
    where
        I: IntoIterator<Item = PartialState>,
    {
        let mut buffer = self.new_buffer();
        for partial in partials {
            self.merge(&mut buffer, Some(&partial))?;
        }
        self.terminate(&buffer)
    }

    fn unsupported(&self, operation: &'static str) -> Error {
        Error::UnsupportedOperation {
            mode: self.mode,
            operation,
        }
    }
}
