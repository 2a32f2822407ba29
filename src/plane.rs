//! Typed read-only access to one decoded 2D plane.

use ndarray::Array2;

use crate::error::{PlaneError, PlaneResult};
use crate::pixel_codec::PixelEncoding;

/// One 2D (X,Y) slice of a pixel set, backed by the raw bytes fetched from
/// the remote store.
///
/// The buffer is exclusively owned and never mutated after construction, so
/// a plane can be shared read-only across threads (the cache hands out
/// `Arc<DecodedPlane>`). Samples are stored row-major, Y-major outer:
/// the sample at `(x, y)` lives at byte offset
/// `bytes_per_sample * (y * width + x)`.
#[derive(Debug)]
pub struct DecodedPlane {
    data: Vec<u8>,
    width: usize,
    height: usize,
    encoding: PixelEncoding,
}

impl DecodedPlane {
    /// Wrap freshly fetched bytes.
    ///
    /// The buffer length must be exactly
    /// `width * height * bytes_per_sample`; anything else means the
    /// metadata and the transport disagree and is reported, never padded
    /// or truncated.
    pub fn from_bytes(
        data: Vec<u8>,
        width: usize,
        height: usize,
        encoding: PixelEncoding,
    ) -> PlaneResult<Self> {
        let expected = width * height * encoding.bytes_per_sample();
        if data.len() != expected {
            return Err(PlaneError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(DecodedPlane {
            data,
            width,
            height,
            encoding,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    /// The underlying bytes, exactly as fetched.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Buffer length in bytes, used by the cache for accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Decode the sample at `(x, y)`.
    pub fn value_at(&self, x: usize, y: usize) -> PlaneResult<f64> {
        if x >= self.width || y >= self.height {
            return Err(PlaneError::OutOfBounds(format!(
                "pixel ({x}, {y}) outside {}x{} plane",
                self.width, self.height
            )));
        }
        let bps = self.encoding.bytes_per_sample();
        let offset = bps * (y * self.width + x);
        Ok(self.encoding.decode_sample(&self.data[offset..offset + bps]))
    }

    /// Materialize every sample as `f64`, shaped `(width, height)` so that
    /// `matrix[[x, y]]` equals `value_at(x, y)`.
    ///
    /// This is the one O(width * height) allocation-heavy entry point; for
    /// very large planes prefer [`samples`](Self::samples).
    #[must_use]
    pub fn to_matrix(&self) -> Array2<f64> {
        let bps = self.encoding.bytes_per_sample();
        Array2::from_shape_fn((self.width, self.height), |(x, y)| {
            let offset = bps * (y * self.width + x);
            self.encoding.decode_sample(&self.data[offset..offset + bps])
        })
    }

    /// Iterate over all samples in storage order (row-major, Y-major
    /// outer) without materializing a matrix.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.data
            .chunks_exact(self.encoding.bytes_per_sample())
            .map(|sample| self.encoding.decode_sample(sample))
    }
}
