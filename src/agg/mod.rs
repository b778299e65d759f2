pub(crate) mod accumulator;
pub(crate) mod group;
pub(crate) mod partial;

pub use accumulator::MeanAccumulator;
pub use group::GroupedMeans;
pub use partial::{PartialState, MAX_COUNT};
