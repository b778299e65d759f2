use crate::error::AggregationError;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Largest row count that survives the trip through an `f64` unchanged (2^53).
pub const MAX_COUNT: u64 = 1 << 53;

/// Mergeable summary of the rows one accumulator has seen.
///
/// This is what workers exchange between the map and reduce side.
/// Receivers copy the values in, so a partial state can be dropped after merging.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialState {
    pub(crate) sums: Vec<f64>,
    pub(crate) count: u64,
}

impl PartialState {
    /// Creates the identity state for `columns` columns.
    #[must_use]
    pub fn empty(columns: usize) -> Self {
        Self {
            sums: vec![0.0; columns],
            count: 0,
        }
    }

    /// Per-column running sums.
    #[must_use]
    pub fn sums(&self) -> &[f64] {
        &self.sums
    }

    /// Number of rows absorbed.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.sums.len()
    }

    /// Flattens the state into N sums followed by the row count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_wire(&self) -> Vec<f64> {
        let mut wire = Vec::with_capacity(self.sums.len() + 1);
        wire.extend_from_slice(&self.sums);
        wire.push(self.count as f64);
        wire
    }

    /// Reads a state from N sums followed by the row count.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::MalformedPartial`] if there is no sum column,
    /// or if the count is not a whole number in `0..=MAX_COUNT`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_wire(wire: &[f64]) -> Result<Self, AggregationError> {
        let Some((&count, sums)) = wire.split_last() else {
            return Err(AggregationError::MalformedPartial);
        };

        if !count.is_finite() || count < 0.0 || count.fract() != 0.0 || count > MAX_COUNT as f64
        {
            return Err(AggregationError::MalformedPartial);
        }

        Self::checked(sums.to_vec(), count as u64)
    }

    // NOTE: Used by both decoders
    fn checked(sums: Vec<f64>, count: u64) -> Result<Self, AggregationError> {
        if sums.is_empty() || count > MAX_COUNT {
            return Err(AggregationError::MalformedPartial);
        }
        Ok(Self { sums, count })
    }

    /// Serializes the state as
    /// `[column count; u32] [sum; f64]* [row count; u64]`, big endian.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn encode_into<W: Write>(&self, writer: &mut W) -> crate::Result<()> {
        let columns = u32::try_from(self.sums.len()).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "too many columns")
        })?;

        writer.write_u32::<BigEndian>(columns)?;
        for sum in &self.sums {
            writer.write_f64::<BigEndian>(*sum)?;
        }
        writer.write_u64::<BigEndian>(self.count)?;

        Ok(())
    }

    /// Deserializes a state written by [`PartialState::encode_into`].
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred, e.g. the input is truncated,
    /// or [`AggregationError::MalformedPartial`] under the same rules as [`PartialState::from_wire`].
    pub fn decode_from<R: Read>(reader: &mut R) -> crate::Result<Self> {
        let columns = reader.read_u32::<BigEndian>()? as usize;

        let mut sums = Vec::with_capacity(columns.min(4_096));
        for _ in 0..columns {
            sums.push(reader.read_f64::<BigEndian>()?);
        }

        let count = reader.read_u64::<BigEndian>()?;

        Ok(Self::checked(sums, count)?)
    }

    /// Serializes the state into a new buffer.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.sums.len() * 8 + 8);

        // NOTE: Writing into a Vec cannot fail
        self.encode_into(&mut bytes).expect("should serialize");

        bytes
    }
}
