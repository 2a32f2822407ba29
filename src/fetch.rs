//! Plane fetch transports.
//!
//! A pixel set's raw data lives behind an opaque "fetch bytes for plane
//! (z, channel, time)" call. This module defines that contract and the
//! transports the crate ships for it:
//! - in-memory streams (tests, local pipelines)
//! - local files (seek + read)
//! - HTTP sources (Range requests)
//!
//! All transports resolve a coordinate triple to a byte range of the
//! linear stream: plane index times plane size, one uncompressed plane
//! per slot.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::descriptor::PixelSetDescriptor;

/// Transport-level result; the sink wraps failures as `FetchFailed`.
pub type TransportResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// The external collaborator a [`PlaneSink`](crate::PlaneSink) fetches
/// raw plane bytes from.
///
/// The returned buffer must hold exactly one plane
/// (`size_x * size_y * bytes_per_sample` bytes); the sink verifies this
/// when constructing the decoded plane.
pub trait PlaneFetcher: Send + Sync {
    /// Fetch the raw bytes of one plane.
    fn fetch_plane_bytes(
        &self,
        pixels_id: u64,
        z: usize,
        c: usize,
        t: usize,
    ) -> TransportResult<Vec<u8>>;

    /// Human-readable identifier for this source (for logging/errors).
    fn identifier(&self) -> &str;
}

fn check_pixels_id(served: u64, requested: u64) -> TransportResult<()> {
    if served != requested {
        return Err(format!(
            "fetcher serves pixel set {served}, got request for {requested}"
        )
        .into());
    }
    Ok(())
}

/// Fetcher over a pixel set already resident in memory.
pub struct MemoryPlaneFetcher {
    pixels_id: u64,
    descriptor: PixelSetDescriptor,
    data: Vec<u8>,
}

impl MemoryPlaneFetcher {
    #[must_use]
    pub fn new(pixels_id: u64, descriptor: PixelSetDescriptor, data: Vec<u8>) -> Self {
        MemoryPlaneFetcher {
            pixels_id,
            descriptor,
            data,
        }
    }
}

impl PlaneFetcher for MemoryPlaneFetcher {
    fn fetch_plane_bytes(
        &self,
        pixels_id: u64,
        z: usize,
        c: usize,
        t: usize,
    ) -> TransportResult<Vec<u8>> {
        check_pixels_id(self.pixels_id, pixels_id)?;
        let index = self.descriptor.linearize(z, c, t)?;
        let offset = self.descriptor.plane_offset(index) as usize;
        let length = self.descriptor.plane_size_bytes();
        let bytes = self.data.get(offset..offset + length).ok_or_else(|| {
            format!(
                "plane {index} range {offset}..{} beyond stream of {} bytes",
                offset + length,
                self.data.len()
            )
        })?;
        Ok(bytes.to_vec())
    }

    fn identifier(&self) -> &str {
        "<memory>"
    }
}

/// Fetcher over a local file holding the linear plane stream.
pub struct LocalPlaneFetcher {
    pixels_id: u64,
    descriptor: PixelSetDescriptor,
    path: PathBuf,
    identifier: String,
    size: u64,
}

impl LocalPlaneFetcher {
    pub fn new(
        path: impl AsRef<Path>,
        pixels_id: u64,
        descriptor: PixelSetDescriptor,
    ) -> TransportResult<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path)?;
        let identifier = path.to_string_lossy().into_owned();
        Ok(LocalPlaneFetcher {
            pixels_id,
            descriptor,
            path,
            identifier,
            size: metadata.len(),
        })
    }
}

impl PlaneFetcher for LocalPlaneFetcher {
    fn fetch_plane_bytes(
        &self,
        pixels_id: u64,
        z: usize,
        c: usize,
        t: usize,
    ) -> TransportResult<Vec<u8>> {
        check_pixels_id(self.pixels_id, pixels_id)?;
        let index = self.descriptor.linearize(z, c, t)?;
        let offset = self.descriptor.plane_offset(index);
        let length = self.descriptor.plane_size_bytes();
        if offset + length as u64 > self.size {
            return Err(format!(
                "plane {index} extends past end of {} ({} bytes)",
                self.identifier, self.size
            )
            .into());
        }
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; length];
        file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Fetcher over an HTTP source that supports Range requests.
pub struct HttpPlaneFetcher {
    pixels_id: u64,
    descriptor: PixelSetDescriptor,
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpPlaneFetcher {
    pub fn new(
        url: &str,
        pixels_id: u64,
        descriptor: PixelSetDescriptor,
    ) -> TransportResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(HttpPlaneFetcher {
            pixels_id,
            descriptor,
            url: url.to_string(),
            client,
        })
    }
}

impl PlaneFetcher for HttpPlaneFetcher {
    fn fetch_plane_bytes(
        &self,
        pixels_id: u64,
        z: usize,
        c: usize,
        t: usize,
    ) -> TransportResult<Vec<u8>> {
        check_pixels_id(self.pixels_id, pixels_id)?;
        let index = self.descriptor.linearize(z, c, t)?;
        let offset = self.descriptor.plane_offset(index);
        let length = self.descriptor.plane_size_bytes();
        let range = format!("bytes={}-{}", offset, offset + length as u64 - 1);
        let response = self.client.get(&self.url).header("Range", range).send()?;

        if !response.status().is_success() {
            return Err(format!("HTTP request failed: {}", response.status()).into());
        }

        Ok(response.bytes()?.to_vec())
    }

    fn identifier(&self) -> &str {
        &self.url
    }
}

/// Create a plane fetcher from a path or URL.
pub fn create_plane_fetcher(
    source: &str,
    pixels_id: u64,
    descriptor: PixelSetDescriptor,
) -> TransportResult<Arc<dyn PlaneFetcher>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Arc::new(HttpPlaneFetcher::new(source, pixels_id, descriptor)?))
    } else {
        Ok(Arc::new(LocalPlaneFetcher::new(source, pixels_id, descriptor)?))
    }
}
