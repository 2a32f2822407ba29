//! Async plane access.
//!
//! The sink's fetch path blocks on transport I/O, so async callers run it
//! on the blocking thread pool.

use std::sync::Arc;

use crate::error::{PlaneError, PlaneResult};
use crate::plane::DecodedPlane;
use crate::plane_sink::PlaneSink;

/// Get a plane without blocking the async runtime.
///
/// Equivalent to [`PlaneSink::get_plane`], run via
/// `tokio::task::spawn_blocking`.
pub async fn get_plane_async(
    sink: Arc<PlaneSink>,
    z: usize,
    c: usize,
    t: usize,
) -> PlaneResult<Arc<DecodedPlane>> {
    tokio::task::spawn_blocking(move || sink.get_plane(z, c, t))
        .await
        .map_err(|e| PlaneError::FetchFailed(Box::new(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PixelSetDescriptor;
    use crate::fetch::MemoryPlaneFetcher;
    use crate::pixel_codec::PixelEncoding;

    #[tokio::test]
    async fn async_access_matches_sync() {
        let descriptor = PixelSetDescriptor {
            size_x: 2,
            size_y: 2,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            encoding: PixelEncoding::UInt8,
        };
        let fetcher = Arc::new(MemoryPlaneFetcher::new(
            1,
            descriptor.clone(),
            vec![10, 20, 30, 40],
        ));
        let sink = Arc::new(PlaneSink::new(1, descriptor, fetcher, 1024).unwrap());

        let plane = get_plane_async(Arc::clone(&sink), 0, 0, 0).await.unwrap();
        assert_eq!(plane.value_at(1, 1).unwrap(), 40.0);
        assert_eq!(sink.cached_plane_count(), 1);
    }
}
