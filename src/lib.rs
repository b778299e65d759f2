//! Mergeable multi-column mean aggregation for distributed query engines.
//!
//! Computes one arithmetic mean per input column, using the partial-aggregation
//! protocol of the host engine: workers accumulate raw rows into a partial state,
//! partial states are shipped and merged, and the final step turns the merged
//! sums and row count into means.
//!
//! Internally, all values are widened to `f64`. A null value is skipped for its
//! column, but the row is still counted, because all columns share one row counter.
//!
//! ```
//! use colmean::{Evaluator, Mode, Output, TypeDescriptor};
//!
//! let types = ["double", "double", "double", "double"]
//!     .into_iter()
//!     .map(TypeDescriptor::try_from)
//!     .collect::<colmean::Result<Vec<_>>>()?;
//!
//! // Two workers aggregate their share of the rows
//! let map = Evaluator::builder().mode(Mode::Partial1).build(&types)?;
//!
//! let mut partials = vec![];
//!
//! for rows in [
//!     vec![[2.0, 4.0, 7.9, 2.0], [4.0, 2.0, 2.1, 8.0]],
//!     vec![[8.0, 8.0, 2.1, 4.0], [2.0, 2.0, 3.9, 2.0]],
//! ] {
//!     let mut buffer = map.new_buffer();
//!
//!     for row in rows {
//!         map.iterate(&mut buffer, &row.map(Some))?;
//!     }
//!
//!     if let Output::Partial(partial) = map.terminate(&buffer)? {
//!         // Partial states are plain bytes on the wire
//!         partials.push(partial.to_bytes());
//!     }
//! }
//!
//! // The reducer merges the partial states
//! let reduce = Evaluator::builder().mode(Mode::Final).build(&types)?;
//! let mut buffer = reduce.new_buffer();
//!
//! for bytes in partials {
//!     let partial = colmean::PartialState::decode_from(&mut &bytes[..])?;
//!     reduce.merge(&mut buffer, Some(&partial))?;
//! }
//!
//! let Output::Final(means) = reduce.terminate(&buffer)? else {
//!     unreachable!();
//! };
//!
//! for mean in means {
//!     assert!((mean - 4.0).abs() < 1e-9);
//! }
//! #
//! # Ok::<(), colmean::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod agg;
mod error;
mod mode;
mod types;
mod validate;

type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

pub use agg::{GroupedMeans, MeanAccumulator, PartialState, MAX_COUNT};
pub use error::{AggregationError, Error, Result, ValidationError};
pub use mode::{Builder as EvaluatorBuilder, Evaluator, Mode, Output};
pub use types::{Category, TypeDescriptor};
pub use validate::validate;
