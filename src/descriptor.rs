//! Pixel set metadata and plane linearization.
//!
//! A pixel set is one 5D (X,Y,Z,Channel,Time) image stored remotely as
//! consecutive uncompressed 2D planes. The descriptor carries the declared
//! extents and encoding, and maps a `(z, channel, time)` triple onto the
//! linear position of its plane within the stream.

use crate::error::{PlaneError, PlaneResult};
use crate::pixel_codec::PixelEncoding;

/// Linear position of a plane within its pixel set's plane sequence.
pub type PlaneIndex = usize;

/// Immutable metadata for one pixel set, supplied by the metadata layer
/// and assumed validated there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSetDescriptor {
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub encoding: PixelEncoding,
}

impl PixelSetDescriptor {
    /// Map `(z, channel, time)` to a plane index.
    ///
    /// The mapping is injective over the valid coordinate space:
    /// `size_z * size_c * t + size_z * c + z`. The first coordinate found
    /// outside its extent (z, then channel, then time) is reported.
    pub fn linearize(&self, z: usize, c: usize, t: usize) -> PlaneResult<PlaneIndex> {
        if z >= self.size_z {
            return Err(PlaneError::CoordinateOutOfRange {
                dimension: "z",
                value: z,
                bound: self.size_z,
            });
        }
        if c >= self.size_c {
            return Err(PlaneError::CoordinateOutOfRange {
                dimension: "channel",
                value: c,
                bound: self.size_c,
            });
        }
        if t >= self.size_t {
            return Err(PlaneError::CoordinateOutOfRange {
                dimension: "time",
                value: t,
                bound: self.size_t,
            });
        }
        Ok(self.size_z * self.size_c * t + self.size_z * c + z)
    }

    /// Total number of planes in the set.
    #[must_use]
    pub fn plane_count(&self) -> usize {
        self.size_z * self.size_c * self.size_t
    }

    /// Size of one decoded plane in bytes.
    #[must_use]
    pub fn plane_size_bytes(&self) -> usize {
        self.size_x * self.size_y * self.encoding.bytes_per_sample()
    }

    /// Byte offset of a plane within the linear stream.
    #[must_use]
    pub fn plane_offset(&self, index: PlaneIndex) -> u64 {
        (index * self.plane_size_bytes()) as u64
    }
}
