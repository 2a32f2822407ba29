//! Pixel encoding tags and the byte-level sample codec.
//!
//! The remote pixel store serves raw samples in network (big-endian) byte
//! order with no per-stream header, so the codec is fixed big-endian.
//! Decoding widens every sample to `f64`; encoding narrows by truncation
//! toward zero (`3.9` stored as `Int16` reads back as `3`).

use crate::error::{PlaneError, PlaneResult};

/// Numeric representation of one stored sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl PixelEncoding {
    /// Parse the encoding name used by the metadata layer.
    pub fn from_name(name: &str) -> PlaneResult<Self> {
        match name {
            "int8" => Ok(PixelEncoding::Int8),
            "uint8" => Ok(PixelEncoding::UInt8),
            "int16" => Ok(PixelEncoding::Int16),
            "uint16" => Ok(PixelEncoding::UInt16),
            "int32" => Ok(PixelEncoding::Int32),
            "uint32" => Ok(PixelEncoding::UInt32),
            "float" => Ok(PixelEncoding::Float32),
            "double" => Ok(PixelEncoding::Float64),
            other => Err(PlaneError::UnsupportedEncoding(other.to_string())),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PixelEncoding::Int8 => "int8",
            PixelEncoding::UInt8 => "uint8",
            PixelEncoding::Int16 => "int16",
            PixelEncoding::UInt16 => "uint16",
            PixelEncoding::Int32 => "int32",
            PixelEncoding::UInt32 => "uint32",
            PixelEncoding::Float32 => "float",
            PixelEncoding::Float64 => "double",
        }
    }

    /// Fixed byte width of one sample.
    #[must_use]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            PixelEncoding::Int8 | PixelEncoding::UInt8 => 1,
            PixelEncoding::Int16 | PixelEncoding::UInt16 => 2,
            PixelEncoding::Int32 | PixelEncoding::UInt32 | PixelEncoding::Float32 => 4,
            PixelEncoding::Float64 => 8,
        }
    }

    /// Read one sample at `offset` and widen it to `f64`.
    pub fn decode(self, buf: &[u8], offset: usize) -> PlaneResult<f64> {
        let end = offset + self.bytes_per_sample();
        if end > buf.len() {
            return Err(PlaneError::OutOfBounds(format!(
                "sample read {offset}..{end} exceeds buffer of {} bytes",
                buf.len()
            )));
        }
        Ok(self.decode_sample(&buf[offset..end]))
    }

    /// Narrow `value` to the target type and write it at `offset`.
    pub fn encode(self, value: f64, buf: &mut [u8], offset: usize) -> PlaneResult<()> {
        let end = offset + self.bytes_per_sample();
        if end > buf.len() {
            return Err(PlaneError::OutOfBounds(format!(
                "sample write {offset}..{end} exceeds buffer of {} bytes",
                buf.len()
            )));
        }
        self.encode_sample(value, &mut buf[offset..end]);
        Ok(())
    }

    /// Decode one sample from a slice of exactly `bytes_per_sample` bytes.
    pub(crate) fn decode_sample(self, bytes: &[u8]) -> f64 {
        match self {
            PixelEncoding::Int8 => f64::from(bytes[0] as i8),
            PixelEncoding::UInt8 => f64::from(bytes[0]),
            PixelEncoding::Int16 => f64::from(i16::from_be_bytes([bytes[0], bytes[1]])),
            PixelEncoding::UInt16 => f64::from(u16::from_be_bytes([bytes[0], bytes[1]])),
            PixelEncoding::Int32 => f64::from(i32::from_be_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            PixelEncoding::UInt32 => f64::from(u32::from_be_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            PixelEncoding::Float32 => f64::from(f32::from_be_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            PixelEncoding::Float64 => f64::from_be_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        }
    }

    /// Encode one sample into a slice of exactly `bytes_per_sample` bytes.
    pub(crate) fn encode_sample(self, value: f64, out: &mut [u8]) {
        match self {
            PixelEncoding::Int8 => out[0] = (value as i8) as u8,
            PixelEncoding::UInt8 => out[0] = value as u8,
            PixelEncoding::Int16 => out.copy_from_slice(&(value as i16).to_be_bytes()),
            PixelEncoding::UInt16 => out.copy_from_slice(&(value as u16).to_be_bytes()),
            PixelEncoding::Int32 => out.copy_from_slice(&(value as i32).to_be_bytes()),
            PixelEncoding::UInt32 => out.copy_from_slice(&(value as u32).to_be_bytes()),
            PixelEncoding::Float32 => out.copy_from_slice(&(value as f32).to_be_bytes()),
            PixelEncoding::Float64 => out.copy_from_slice(&value.to_be_bytes()),
        }
    }
}
