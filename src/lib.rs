//! # planestream - Plane Access for Remote 5D Scientific Images
//!
//! A library for reading individual 2D pixel planes out of large
//! (X,Y,Z,Channel,Time) images stored remotely as a linear byte stream.
//!
//! ## Features
//!
//! - **Plane-at-a-time access**: fetches only the requested plane's bytes
//! - **Typed decode**: eight pixel encodings, widened to `f64` on read
//! - **Byte-budgeted caching**: decoded planes retained under a fixed
//!   memory budget with insertion-order eviction
//! - **Pluggable transports**: in-memory, local file, or HTTP Range
//!   sources behind one trait
//! - **Client round-trip**: matrices edited client-side encode back to the
//!   server byte layout exactly
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use planestream::{create_plane_fetcher, PixelEncoding, PixelSetDescriptor, PlaneSink};
//!
//! let descriptor = PixelSetDescriptor {
//!     size_x: 512, size_y: 512,
//!     size_z: 30, size_c: 3, size_t: 100,
//!     encoding: PixelEncoding::UInt16,
//! };
//!
//! let fetcher = create_plane_fetcher("https://server/pixels/42", 42, descriptor.clone())?;
//! let sink = PlaneSink::new(42, descriptor, fetcher, 64 * 1024 * 1024)?;
//!
//! // First access fetches and decodes; repeats are served from the cache.
//! let plane = sink.get_plane(14, 1, 50)?;
//! println!("value at (10, 10): {}", plane.value_at(10, 10)?);
//! let matrix = plane.to_matrix();
//! ```
//!
//! ## Architecture
//!
//! - [`pixel_codec`]: pixel encoding tags and the byte-level sample codec
//! - [`descriptor`]: pixel set metadata and plane linearization
//! - [`plane`]: typed read-only access to one decoded plane
//! - [`plane_cache`]: byte-budgeted FIFO cache of decoded planes
//! - [`fetch`]: transport abstraction for the remote plane stream
//! - [`plane_sink`]: the caller façade combining all of the above
//! - [`async_plane`]: async adapter over the blocking sink

// ============================================================================
// Public modules
// ============================================================================

pub mod async_plane;
pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod pixel_codec;
pub mod plane;
pub mod plane_cache;
pub mod plane_sink;

// ============================================================================
// Errors
// ============================================================================

pub use error::{PlaneError, PlaneResult};

// ============================================================================
// Core Types
// ============================================================================

pub use descriptor::{PixelSetDescriptor, PlaneIndex};
pub use pixel_codec::PixelEncoding;
pub use plane::DecodedPlane;

// ============================================================================
// Caching
// ============================================================================

pub use plane_cache::PlaneCache;

// ============================================================================
// Fetch Transports
// ============================================================================

pub use fetch::{
    create_plane_fetcher,
    HttpPlaneFetcher,
    LocalPlaneFetcher,
    MemoryPlaneFetcher,
    PlaneFetcher,
    TransportResult,
};

// ============================================================================
// Sink
// ============================================================================

pub use async_plane::get_plane_async;
pub use plane_sink::PlaneSink;
