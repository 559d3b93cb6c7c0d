//! Bit-packing and compression for the `status_list` claim's `lst` value:
//! little-endian bit packing at a configurable width, DEFLATE (zlib)
//! compression, then base64url encoding without padding.

use std::io::{Read, Write};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{RegistryError, Result};

/// Bit widths the status-list encoding supports.
pub const SUPPORTED_BIT_WIDTHS: [u8; 4] = [1, 2, 4, 8];

/// Default width: enough to encode VALID/INVALID/SUSPENDED (0..=2).
pub const DEFAULT_BITS: u8 = 2;

/// Pack `statuses` into a byte buffer at `bits`-per-entry, each value's
/// bits written least-significant-bit first starting at its entry's bit
/// offset (`index * bits`).
pub fn pack(statuses: &[u8], bits: u8) -> Result<Vec<u8>> {
    if !SUPPORTED_BIT_WIDTHS.contains(&bits) {
        return Err(RegistryError::BuildFailure(format!(
            "unsupported bits-per-status: {bits}"
        )));
    }
    let total_bits = statuses.len() * bits as usize;
    let mut buf = vec![0u8; total_bits.div_ceil(8)];
    let mask = (1u16 << bits) - 1;

    let mut bit_pos = 0usize;
    for &status in statuses {
        let value = (status as u16) & mask;
        for b in 0..bits {
            if (value >> b) & 1 == 1 {
                let global_bit = bit_pos + b as usize;
                buf[global_bit / 8] |= 1 << (global_bit % 8);
            }
        }
        bit_pos += bits as usize;
    }
    Ok(buf)
}

/// Inverse of [`pack`]. `count` must be supplied by the caller (the
/// section size), since trailing padding bits in the last byte are not
/// otherwise distinguishable from real entries.
pub fn unpack(buf: &[u8], bits: u8, count: usize) -> Result<Vec<u8>> {
    if !SUPPORTED_BIT_WIDTHS.contains(&bits) {
        return Err(RegistryError::BuildFailure(format!(
            "unsupported bits-per-status: {bits}"
        )));
    }
    let needed_bits = count * bits as usize;
    if needed_bits.div_ceil(8) > buf.len() {
        return Err(RegistryError::BuildFailure(
            "packed buffer shorter than requested entry count".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(count);
    let mut bit_pos = 0usize;
    for _ in 0..count {
        let mut value = 0u8;
        for b in 0..bits {
            let global_bit = bit_pos + b as usize;
            let byte = buf[global_bit / 8];
            if (byte >> (global_bit % 8)) & 1 == 1 {
                value |= 1 << b;
            }
        }
        out.push(value);
        bit_pos += bits as usize;
    }
    Ok(out)
}

pub fn zlib_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| RegistryError::BuildFailure(format!("deflate compress: {e}")))?;
    encoder
        .finish()
        .map_err(|e| RegistryError::BuildFailure(format!("deflate finish: {e}")))
}

pub fn zlib_decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| RegistryError::BuildFailure(format!("deflate decompress: {e}")))?;
    Ok(out)
}

pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub fn base64url_decode(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(data)
        .map_err(|e| RegistryError::BuildFailure(format!("base64url decode: {e}")))
}
