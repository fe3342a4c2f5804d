// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Region (.mca) file format handling.

pub mod chunk;
pub mod region;

pub use chunk::Chunk;
pub use region::Region;

use std::io::{self, Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::error::RegionError;

/// The size of a single sector in a region file (4096 bytes).
pub const SECTOR_SIZE: usize = 4096;

/// The two header sectors: the locations table and the timestamps table.
pub const REGION_HEADER_SIZE: usize = 2 * SECTOR_SIZE;

/// Chunks along one side of a region.
pub const REGION_WIDTH: usize = 32;

/// Chunk slots in a region file.
pub const REGION_CHUNKS: usize = REGION_WIDTH * REGION_WIDTH;

/// Largest sector count the one-byte directory field can carry.
pub const MAX_CHUNK_SECTORS: u64 = 255;

/// Compression applied to a chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Gzip compression (standard for .dat files, less common in .mca).
    Gzip = 1,
    /// Zlib compression (standard for .mca chunks).
    #[default]
    Zlib = 2,
    /// No compression.
    None = 3,
}

impl Compression {
    /// The on-disk compression code.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn compress(self, raw: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(raw)?;
                encoder.finish()
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(raw)?;
                encoder.finish()
            }
            Compression::None => Ok(raw.to_vec()),
        }
    }

    pub fn decompress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut decoded = Vec::new();
        match self {
            Compression::Gzip => {
                GzDecoder::new(data).read_to_end(&mut decoded)?;
            }
            Compression::Zlib => {
                ZlibDecoder::new(data).read_to_end(&mut decoded)?;
            }
            Compression::None => decoded.extend_from_slice(data),
        }
        Ok(decoded)
    }
}

impl TryFrom<u8> for Compression {
    type Error = RegionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Compression::Gzip),
            2 => Ok(Compression::Zlib),
            3 => Ok(Compression::None),
            _ => Err(RegionError::BadCompression(value)),
        }
    }
}

/// Lifecycle state of a chunk slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkState {
    /// The slot has never held chunk data.
    #[default]
    NotCreated,
    /// Directory entry, header and payload are consistent.
    Ok,
    /// The payload overruns its allocation or collides with another chunk.
    Overlapping,
    /// The payload needs more sectors than the one-byte field can carry.
    TooBig,
    /// The directory entry, header or payload could not be read.
    Corrupted,
}
