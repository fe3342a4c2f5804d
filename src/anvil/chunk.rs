// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! One chunk slot of a region file.

use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;

use crate::anvil::{ChunkState, Compression, MAX_CHUNK_SECTORS, REGION_WIDTH, SECTOR_SIZE};
use crate::error::{NbtError, RegionError};
use crate::nbt::NamedTag;

fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

fn truncated() -> RegionError {
    RegionError::Nbt(NbtError::TruncatedStream)
}

/// A chunk: one NBT tree plus its region-level metadata.
///
/// A chunk knows how to read itself out of a region byte buffer (directory
/// entry, then header, then payload, each stage gated by the state the
/// previous stage left behind) and how to write itself back at its assigned
/// sector. Errors while reading never escape; they degrade the chunk's
/// [`ChunkState`] instead.
#[derive(Debug, Clone)]
pub struct Chunk {
    cx: u8,
    cz: u8,
    offset: u32,
    sectors: u32,
    timestamp: u32,
    compression: Compression,
    length: u64,
    padding: u64,
    state: ChunkState,
    nbt: Option<NamedTag>,
    compressed: Option<Vec<u8>>,
}

impl Chunk {
    /// An empty slot at the given local coordinates (`0..32`).
    pub fn new(cx: u8, cz: u8) -> Self {
        Self {
            cx,
            cz,
            offset: 0,
            sectors: 0,
            timestamp: 0,
            compression: Compression::default(),
            length: 0,
            padding: 0,
            state: ChunkState::NotCreated,
            nbt: None,
            compressed: None,
        }
    }

    /// A slot pre-filled with an NBT tree, ready to be encoded.
    pub fn with_nbt(cx: u8, cz: u8, root: NamedTag, compression: Compression) -> Self {
        let mut chunk = Self::new(cx, cz);
        chunk.compression = compression;
        chunk.set_nbt(root);
        chunk
    }

    /// Local coordinates within the region grid.
    pub fn coords(&self) -> (u8, u8) {
        (self.cx, self.cz)
    }

    /// Byte offset of this chunk's entry in the locations table.
    pub fn entry_index(&self) -> usize {
        (self.cx as usize + self.cz as usize * REGION_WIDTH) * 4
    }

    /// The state left behind by the last decode or [`Chunk::recompute`].
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Sector index of the payload; 0 while absent or unassigned.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Sectors occupied by the payload.
    pub fn sectors(&self) -> u32 {
        self.sectors
    }

    /// Unix seconds of the last write.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// On-disk payload length, including the compression byte.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Zero bytes that pad the payload out to its sector boundary.
    pub fn padding(&self) -> u64 {
        self.padding
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Changes the compression applied at the next encode.
    pub fn set_compression(&mut self, compression: Compression) {
        self.compression = compression;
    }

    pub fn nbt(&self) -> Option<&NamedTag> {
        self.nbt.as_ref()
    }

    pub fn nbt_mut(&mut self) -> Option<&mut NamedTag> {
        self.nbt.as_mut()
    }

    /// Installs a tree in this slot; derived fields refresh at the next
    /// [`Chunk::recompute`].
    pub fn set_nbt(&mut self, root: NamedTag) {
        self.nbt = Some(root);
        self.compressed = None;
        self.state = ChunkState::Ok;
    }

    pub(crate) fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    pub(crate) fn mark_overlapping(&mut self) {
        if self.state == ChunkState::Ok {
            self.state = ChunkState::Overlapping;
        }
    }

    /// Populates this chunk from a full region image.
    ///
    /// Runs the staged pipeline: directory entry, then header, then
    /// payload, each stage gated by the state the previous one produced.
    /// Nothing fails outward; problems degrade the returned state.
    pub fn decode_from(&mut self, data: &[u8]) -> ChunkState {
        if data.len() < 2 * SECTOR_SIZE {
            self.state = ChunkState::Corrupted;
            return self.state;
        }
        self.read_entry(data);
        self.read_body(data);
        self.state
    }

    /// Encodes this chunk into a region image at its current offset.
    ///
    /// With `update_state` the derived fields are recomputed first, as for
    /// a chunk whose tree was mutated since the last pass. Offset
    /// assignment is the caller's responsibility; [`Region::to_bytes`]
    /// performs it for the whole grid.
    ///
    /// [`Region::to_bytes`]: crate::anvil::Region::to_bytes
    pub fn encode_into(
        &mut self,
        out: &mut Vec<u8>,
        update_state: bool,
    ) -> Result<ChunkState, RegionError> {
        if update_state {
            self.recompute()?;
        }
        self.write_into(out);
        Ok(self.state)
    }

    /// Stage 1: reads the directory entry and timestamp, classifying the
    /// slot. `data` must hold at least the two header sectors.
    pub(crate) fn read_entry(&mut self, data: &[u8]) {
        let e = self.entry_index();
        self.offset = ((data[e] as u32) << 16) | ((data[e + 1] as u32) << 8) | (data[e + 2] as u32);
        self.sectors = data[e + 3] as u32;
        let t = e + SECTOR_SIZE;
        self.timestamp = ((data[t] as u32) << 24)
            | ((data[t + 1] as u32) << 16)
            | ((data[t + 2] as u32) << 8)
            | (data[t + 3] as u32);

        self.state = if self.offset == 0 && self.sectors == 0 {
            ChunkState::NotCreated
        } else if self.sectors == 0 {
            ChunkState::Corrupted
        } else if self.offset < 2 {
            // Would overlap the header sectors.
            ChunkState::Corrupted
        } else if self.sectors as u64 * SECTOR_SIZE as u64 + 5 > data.len() as u64 {
            ChunkState::Corrupted
        } else {
            ChunkState::Ok
        };
    }

    /// Stages 2 and 3: reads the chunk header and payload, absorbing any
    /// error into the state.
    pub(crate) fn read_body(&mut self, data: &[u8]) {
        if !matches!(
            self.state,
            ChunkState::Ok | ChunkState::Overlapping | ChunkState::TooBig
        ) {
            return;
        }
        if let Err(err) = self.try_read_body(data) {
            warn!("chunk ({}, {}) unreadable: {err}", self.cx, self.cz);
            self.state = ChunkState::Corrupted;
        }
    }

    fn try_read_body(&mut self, data: &[u8]) -> Result<(), RegionError> {
        let start = self.offset as usize * SECTOR_SIZE;
        if start + 5 > data.len() {
            return Err(truncated());
        }
        let length = ((data[start] as u64) << 24)
            | ((data[start + 1] as u64) << 16)
            | ((data[start + 2] as u64) << 8)
            | (data[start + 3] as u64);
        let compression = Compression::try_from(data[start + 4])?;
        if length <= 1 {
            // A length that cannot cover the compression byte plus a body.
            return Err(RegionError::Nbt(NbtError::MalformedLength(length as i32)));
        }
        self.length = length;
        self.compression = compression;

        let required = (length + 4).div_ceil(SECTOR_SIZE as u64);
        match self.state {
            // Payload overruns its allocation; it may collide with the next
            // chunk's sectors.
            ChunkState::Ok if required > self.sectors as u64 => {
                self.state = ChunkState::Overlapping;
            }
            ChunkState::TooBig if required <= MAX_CHUNK_SECTORS => {
                self.state = ChunkState::Ok;
                self.sectors = required as u32;
            }
            _ => {}
        }
        if !matches!(self.state, ChunkState::Ok | ChunkState::Overlapping) {
            return Ok(());
        }

        let body_end = start + 4 + length as usize;
        if body_end > data.len() {
            return Err(truncated());
        }
        let payload = &data[start + 5..body_end];
        let raw = compression
            .decompress(payload)
            .map_err(RegionError::DecompressionFailed)?;
        let root = NamedTag::from_bytes(&raw)?;
        self.padding = (self.sectors as u64 * SECTOR_SIZE as u64).saturating_sub(length + 4);
        self.compressed = Some(payload.to_vec());
        self.nbt = Some(root);
        Ok(())
    }

    /// Re-derives length, sectors, padding and state from the current tree.
    ///
    /// If a tree is present it is re-serialized and compressed per the
    /// chunk's compression, so the result reflects any mutation since the
    /// last pass. A slot with nothing to write keeps its NotCreated or
    /// Corrupted state. Serialization and compression failures are fatal.
    pub fn recompute(&mut self) -> Result<ChunkState, RegionError> {
        let payload_len = if let Some(root) = &self.nbt {
            let raw = root.to_bytes()?;
            let compressed = self.compression.compress(&raw)?;
            let len = compressed.len();
            self.compressed = Some(compressed);
            Some(len)
        } else {
            self.compressed.as_ref().map(Vec::len)
        };

        let Some(payload_len) = payload_len else {
            if self.state != ChunkState::NotCreated {
                self.state = ChunkState::Corrupted;
            }
            return Ok(self.state);
        };

        self.length = payload_len as u64 + 1;
        let sectors = (self.length + 4).div_ceil(SECTOR_SIZE as u64);
        self.sectors = sectors as u32;
        self.padding = sectors * SECTOR_SIZE as u64 - self.length - 4;
        self.state = if sectors > MAX_CHUNK_SECTORS {
            ChunkState::TooBig
        } else {
            ChunkState::Ok
        };
        Ok(self.state)
    }

    /// Writes this chunk into the output buffer.
    ///
    /// An `Ok` chunk writes its directory entry, timestamp, header, payload
    /// and sector padding at the offset assigned by the caller; every other
    /// state zeroes its eight directory bytes and emits no payload.
    fn write_into(&mut self, out: &mut Vec<u8>) {
        if self.state != ChunkState::Ok || self.compressed.is_none() {
            self.zero_entry(out);
            return;
        }
        self.timestamp = unix_now();

        let e = self.entry_index();
        out[e] = (self.offset >> 16) as u8;
        out[e + 1] = (self.offset >> 8) as u8;
        out[e + 2] = self.offset as u8;
        out[e + 3] = self.sectors as u8;
        let t = e + SECTOR_SIZE;
        out[t..t + 4].copy_from_slice(&self.timestamp.to_be_bytes());

        let start = self.offset as usize * SECTOR_SIZE;
        let end = start + self.sectors as usize * SECTOR_SIZE;
        if out.len() < end {
            out.resize(end, 0);
        }
        out[start..start + 4].copy_from_slice(&(self.length as u32).to_be_bytes());
        out[start + 4] = self.compression.code();
        // recompute guarantees the payload cache for Ok chunks.
        if let Some(payload) = &self.compressed {
            out[start + 5..start + 5 + payload.len()].copy_from_slice(payload);
        }
    }

    fn zero_entry(&self, out: &mut [u8]) {
        let e = self.entry_index();
        out[e..e + 4].fill(0);
        let t = e + SECTOR_SIZE;
        out[t..t + 4].fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anvil::REGION_HEADER_SIZE;
    use crate::nbt::NbtTag;

    #[test]
    fn entry_index_matches_disk_layout() {
        assert_eq!(Chunk::new(0, 0).entry_index(), 0);
        assert_eq!(Chunk::new(1, 0).entry_index(), 4);
        assert_eq!(Chunk::new(0, 1).entry_index(), 128);
        assert_eq!(Chunk::new(31, 31).entry_index(), 4092);
    }

    #[test]
    fn empty_slot_stays_not_created() {
        let mut chunk = Chunk::new(3, 4);
        assert_eq!(chunk.recompute().unwrap(), ChunkState::NotCreated);
    }

    #[test]
    fn recompute_derives_sector_arithmetic() {
        let root = NamedTag::new("", NbtTag::compound());
        let mut chunk = Chunk::with_nbt(0, 0, root, Compression::Zlib);
        assert_eq!(chunk.recompute().unwrap(), ChunkState::Ok);
        assert_eq!(chunk.sectors(), 1);
        assert_eq!(chunk.padding(), 4096 - chunk.length() - 4);
    }

    #[test]
    fn oversized_payload_is_too_big() {
        let mut root = NamedTag::new("", NbtTag::compound());
        root.tag
            .insert("blob", NbtTag::ByteArray(vec![0xAB; 1_100_000]));
        let mut chunk = Chunk::with_nbt(0, 0, root, Compression::None);
        assert_eq!(chunk.recompute().unwrap(), ChunkState::TooBig);
        assert!(chunk.sectors() > 255);
    }

    #[test]
    fn header_overlap_offsets_are_corrupted() {
        let mut data = vec![0u8; REGION_HEADER_SIZE];
        // offset 1, one sector: points into the header.
        data[2] = 1;
        data[3] = 1;
        let mut chunk = Chunk::new(0, 0);
        chunk.read_entry(&data);
        assert_eq!(chunk.state(), ChunkState::Corrupted);
    }

    #[test]
    fn zero_sectors_with_offset_is_corrupted() {
        let mut data = vec![0u8; REGION_HEADER_SIZE];
        data[2] = 2;
        let mut chunk = Chunk::new(0, 0);
        chunk.read_entry(&data);
        assert_eq!(chunk.state(), ChunkState::Corrupted);
    }

    #[test]
    fn non_ok_chunk_writes_zero_entry() {
        let mut out = vec![0xFFu8; REGION_HEADER_SIZE];
        let mut chunk = Chunk::new(2, 0);
        chunk.write_into(&mut out);
        let e = chunk.entry_index();
        assert_eq!(&out[e..e + 4], &[0, 0, 0, 0]);
        assert_eq!(&out[e + SECTOR_SIZE..e + SECTOR_SIZE + 4], &[0, 0, 0, 0]);
        assert_eq!(out.len(), REGION_HEADER_SIZE);
    }
}
