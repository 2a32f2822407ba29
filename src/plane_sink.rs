//! The caller-facing façade over indexing, caching and fetching.

use std::sync::{Arc, Mutex};

use ndarray::Array2;
use tracing::debug;

use crate::descriptor::PixelSetDescriptor;
use crate::error::{PlaneError, PlaneResult};
use crate::fetch::PlaneFetcher;
use crate::plane::DecodedPlane;
use crate::plane_cache::PlaneCache;

/// Plane-level access to one pixel set.
///
/// A sink owns the plane cache for its pixel set and holds the descriptor
/// plus the fetch transport for its lifetime. [`get_plane`](Self::get_plane)
/// is the single entry point: linearize, serve from cache, or fetch,
/// decode and retain.
///
/// The cache is the only mutable state and sits behind one lock. The lock
/// is not held across the fetch, so two concurrent misses for the same
/// plane may both hit the transport; whichever insert lands last is
/// retained. Duplicate fetches are tolerable, a corrupted cache is not.
pub struct PlaneSink {
    pixels_id: u64,
    descriptor: PixelSetDescriptor,
    fetcher: Arc<dyn PlaneFetcher>,
    cache: Mutex<PlaneCache>,
}

impl PlaneSink {
    /// Create a sink for one pixel set with a cache of `byte_budget`
    /// bytes.
    pub fn new(
        pixels_id: u64,
        descriptor: PixelSetDescriptor,
        fetcher: Arc<dyn PlaneFetcher>,
        byte_budget: usize,
    ) -> PlaneResult<Self> {
        let cache = PlaneCache::new(byte_budget, descriptor.plane_size_bytes())?;
        Ok(PlaneSink {
            pixels_id,
            descriptor,
            fetcher,
            cache: Mutex::new(cache),
        })
    }

    /// Get the plane at `(z, channel, time)`, fetching and decoding it on
    /// a cache miss.
    pub fn get_plane(&self, z: usize, c: usize, t: usize) -> PlaneResult<Arc<DecodedPlane>> {
        let index = self.descriptor.linearize(z, c, t)?;

        if let Some(plane) = self.cache.lock().unwrap().get(index) {
            debug!(plane = index, "plane cache hit");
            return Ok(plane);
        }

        debug!(
            plane = index,
            source = self.fetcher.identifier(),
            "plane cache miss, fetching"
        );
        let bytes = self
            .fetcher
            .fetch_plane_bytes(self.pixels_id, z, c, t)
            .map_err(PlaneError::FetchFailed)?;

        let plane = Arc::new(DecodedPlane::from_bytes(
            bytes,
            self.descriptor.size_x,
            self.descriptor.size_y,
            self.descriptor.encoding,
        )?);

        self.cache.lock().unwrap().insert(index, Arc::clone(&plane));
        Ok(plane)
    }

    /// Encode a client-side matrix back into the server-side byte layout,
    /// the inverse of [`DecodedPlane::to_matrix`].
    ///
    /// The matrix must be shaped `(size_x, size_y)`.
    pub fn encode_client_matrix(&self, matrix: &Array2<f64>) -> PlaneResult<Vec<u8>> {
        let expected = (self.descriptor.size_x, self.descriptor.size_y);
        if matrix.dim() != expected {
            return Err(PlaneError::DimensionMismatch {
                expected,
                actual: matrix.dim(),
            });
        }
        let bps = self.descriptor.encoding.bytes_per_sample();
        let mut out = vec![0u8; self.descriptor.plane_size_bytes()];
        for y in 0..self.descriptor.size_y {
            for x in 0..self.descriptor.size_x {
                let offset = bps * (y * self.descriptor.size_x + x);
                self.descriptor
                    .encoding
                    .encode(matrix[[x, y]], &mut out, offset)?;
            }
        }
        Ok(out)
    }

    /// Identity check for callers holding multiple sinks.
    #[must_use]
    pub fn is_same_pixel_set(&self, pixels_id: u64) -> bool {
        self.pixels_id == pixels_id
    }

    #[must_use]
    pub fn pixels_id(&self) -> u64 {
        self.pixels_id
    }

    #[must_use]
    pub fn descriptor(&self) -> &PixelSetDescriptor {
        &self.descriptor
    }

    /// Drop all cached planes.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }

    /// Re-budget the cache, invalidating all cached planes.
    pub fn resize_cache(&self, byte_budget: usize) -> PlaneResult<()> {
        self.cache.lock().unwrap().resize(byte_budget)
    }

    /// Number of planes currently cached.
    #[must_use]
    pub fn cached_plane_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Bytes currently held by the cache.
    #[must_use]
    pub fn cached_bytes(&self) -> usize {
        self.cache.lock().unwrap().current_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{MemoryPlaneFetcher, TransportResult};
    use crate::pixel_codec::PixelEncoding;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn descriptor() -> PixelSetDescriptor {
        PixelSetDescriptor {
            size_x: 2,
            size_y: 2,
            size_z: 2,
            size_c: 1,
            size_t: 1,
            encoding: PixelEncoding::UInt8,
        }
    }

    /// Counts transport hits so tests can observe cache behavior.
    struct CountingFetcher {
        inner: MemoryPlaneFetcher,
        fetches: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(data: Vec<u8>) -> Self {
            CountingFetcher {
                inner: MemoryPlaneFetcher::new(1, descriptor(), data),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl PlaneFetcher for CountingFetcher {
        fn fetch_plane_bytes(
            &self,
            pixels_id: u64,
            z: usize,
            c: usize,
            t: usize,
        ) -> TransportResult<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_plane_bytes(pixels_id, z, c, t)
        }

        fn identifier(&self) -> &str {
            "<counting>"
        }
    }

    struct FailingFetcher;

    impl PlaneFetcher for FailingFetcher {
        fn fetch_plane_bytes(&self, _: u64, _: usize, _: usize, _: usize) -> TransportResult<Vec<u8>> {
            Err("connection reset".into())
        }

        fn identifier(&self) -> &str {
            "<failing>"
        }
    }

    struct ShortFetcher;

    impl PlaneFetcher for ShortFetcher {
        fn fetch_plane_bytes(&self, _: u64, _: usize, _: usize, _: usize) -> TransportResult<Vec<u8>> {
            Ok(vec![0; 3])
        }

        fn identifier(&self) -> &str {
            "<short>"
        }
    }

    #[test]
    fn fetches_decodes_and_serves_a_plane() {
        // Plane 1 of the stream holds [10, 20, 30, 40].
        let fetcher = Arc::new(CountingFetcher::new(vec![0, 0, 0, 0, 10, 20, 30, 40]));
        let sink = PlaneSink::new(1, descriptor(), Arc::clone(&fetcher) as Arc<dyn PlaneFetcher>, 1024).unwrap();

        let plane = sink.get_plane(1, 0, 0).unwrap();
        assert_eq!(plane.value_at(1, 0).unwrap(), 20.0);

        let m = plane.to_matrix();
        assert_eq!(m[[0, 0]], 10.0);
        assert_eq!(m[[1, 0]], 20.0);
        assert_eq!(m[[0, 1]], 30.0);
        assert_eq!(m[[1, 1]], 40.0);
    }

    #[test]
    fn repeated_access_fetches_once() {
        let fetcher = Arc::new(CountingFetcher::new(vec![0; 8]));
        let sink = PlaneSink::new(1, descriptor(), Arc::clone(&fetcher) as Arc<dyn PlaneFetcher>, 1024).unwrap();

        sink.get_plane(0, 0, 0).unwrap();
        sink.get_plane(0, 0, 0).unwrap();
        sink.get_plane(0, 0, 0).unwrap();
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(sink.cached_plane_count(), 1);
        assert_eq!(sink.cached_bytes(), 4);
    }

    #[test]
    fn clearing_the_cache_forces_a_refetch() {
        let fetcher = Arc::new(CountingFetcher::new(vec![0; 8]));
        let sink = PlaneSink::new(1, descriptor(), Arc::clone(&fetcher) as Arc<dyn PlaneFetcher>, 1024).unwrap();

        sink.get_plane(0, 0, 0).unwrap();
        sink.clear_cache();
        sink.get_plane(0, 0, 0).unwrap();
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn coordinate_errors_propagate_without_fetching() {
        let fetcher = Arc::new(CountingFetcher::new(vec![0; 8]));
        let sink = PlaneSink::new(1, descriptor(), Arc::clone(&fetcher) as Arc<dyn PlaneFetcher>, 1024).unwrap();

        let err = sink.get_plane(2, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            PlaneError::CoordinateOutOfRange { dimension: "z", .. }
        ));
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn transport_failures_surface_as_fetch_failed() {
        let sink = PlaneSink::new(1, descriptor(), Arc::new(FailingFetcher), 1024).unwrap();
        let err = sink.get_plane(0, 0, 0).unwrap_err();
        assert!(matches!(err, PlaneError::FetchFailed(_)));
    }

    #[test]
    fn short_fetches_surface_as_size_mismatch() {
        let sink = PlaneSink::new(1, descriptor(), Arc::new(ShortFetcher), 1024).unwrap();
        let err = sink.get_plane(0, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            PlaneError::SizeMismatch {
                expected: 4,
                actual: 3,
            }
        ));
        // Nothing half-decoded may be retained.
        assert_eq!(sink.cached_plane_count(), 0);
    }

    #[test]
    fn matrix_round_trips_through_encode() {
        let fetcher = Arc::new(CountingFetcher::new(vec![9, 8, 7, 6, 10, 20, 30, 40]));
        let sink = PlaneSink::new(1, descriptor(), Arc::clone(&fetcher) as Arc<dyn PlaneFetcher>, 1024).unwrap();

        let plane = sink.get_plane(1, 0, 0).unwrap();
        let bytes = sink.encode_client_matrix(&plane.to_matrix()).unwrap();
        assert_eq!(bytes, plane.bytes());
    }

    #[test]
    fn encode_rejects_mismatched_matrix() {
        let sink = PlaneSink::new(1, descriptor(), Arc::new(FailingFetcher), 1024).unwrap();
        let matrix = Array2::zeros((3, 2));
        assert!(matches!(
            sink.encode_client_matrix(&matrix),
            Err(PlaneError::DimensionMismatch {
                expected: (2, 2),
                actual: (3, 2),
            })
        ));
    }

    #[test]
    fn pixel_set_identity() {
        let sink = PlaneSink::new(17, descriptor(), Arc::new(FailingFetcher), 1024).unwrap();
        assert!(sink.is_same_pixel_set(17));
        assert!(!sink.is_same_pixel_set(18));
    }

    #[test]
    fn resize_invalidates_cached_planes() {
        let fetcher = Arc::new(CountingFetcher::new(vec![0; 8]));
        let sink = PlaneSink::new(1, descriptor(), Arc::clone(&fetcher) as Arc<dyn PlaneFetcher>, 1024).unwrap();

        sink.get_plane(0, 0, 0).unwrap();
        sink.resize_cache(512).unwrap();
        assert_eq!(sink.cached_plane_count(), 0);
        sink.get_plane(0, 0, 0).unwrap();
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_readers_share_one_sink() {
        let fetcher = Arc::new(CountingFetcher::new(vec![1, 2, 3, 4, 5, 6, 7, 8]));
        let sink = Arc::new(
            PlaneSink::new(1, descriptor(), Arc::clone(&fetcher) as Arc<dyn PlaneFetcher>, 1024).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    let plane = sink.get_plane(i % 2, 0, 0).unwrap();
                    plane.value_at(0, 0).unwrap()
                })
            })
            .collect();
        for handle in handles {
            let value = handle.join().unwrap();
            assert!(value == 1.0 || value == 5.0);
        }
        assert_eq!(sink.cached_plane_count(), 2);
    }
}
