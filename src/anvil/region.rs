// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! The 32×32 chunk grid backing one .mca file.

use log::debug;

use crate::anvil::chunk::Chunk;
use crate::anvil::{ChunkState, REGION_CHUNKS, REGION_HEADER_SIZE, REGION_WIDTH};
use crate::error::RegionError;

/// A region: a fixed 32×32 grid of chunk slots.
///
/// The grid is always fully populated; absent chunks are slots in the
/// [`ChunkState::NotCreated`] state. Decoding absorbs per-chunk problems
/// into the affected slot's state, so a damaged file still yields a
/// complete grid. Encoding relocates every live chunk onto a contiguous
/// run of sectors starting at sector 2.
pub struct Region {
    rx: i32,
    rz: i32,
    chunks: Vec<Chunk>,
}

impl Region {
    /// An empty region at the given region coordinates.
    pub fn new(rx: i32, rz: i32) -> Self {
        let chunks = (0..REGION_CHUNKS)
            .map(|i| Chunk::new((i % REGION_WIDTH) as u8, (i / REGION_WIDTH) as u8))
            .collect();
        Self { rx, rz, chunks }
    }

    /// Region coordinates `(rx, rz)`.
    pub fn coords(&self) -> (i32, i32) {
        (self.rx, self.rz)
    }

    /// Decodes a region from a fully buffered file image.
    ///
    /// An empty buffer yields an empty region. A non-empty buffer shorter
    /// than the two header sectors is fatal; anything that goes wrong
    /// inside an individual chunk only degrades that chunk's state.
    pub fn from_bytes(rx: i32, rz: i32, data: &[u8]) -> Result<Self, RegionError> {
        let mut region = Self::new(rx, rz);
        if data.is_empty() {
            return Ok(region);
        }
        if data.len() < REGION_HEADER_SIZE {
            return Err(RegionError::MissingHeader(data.len() as u64));
        }
        for chunk in &mut region.chunks {
            chunk.read_entry(data);
        }
        region.mark_overlaps();
        for chunk in &mut region.chunks {
            chunk.read_body(data);
        }
        Ok(region)
    }

    /// Flags chunks whose sector spans intersect.
    ///
    /// Flagged chunks still get their header and payload parsed; the next
    /// encode relocates them onto disjoint sectors.
    fn mark_overlaps(&mut self) {
        let mut spans: Vec<(u64, u64, usize)> = self
            .chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.state() == ChunkState::Ok)
            .map(|(i, chunk)| {
                let start = chunk.offset() as u64;
                (start, start + chunk.sectors() as u64, i)
            })
            .collect();
        spans.sort_unstable();

        let mut flagged = Vec::new();
        let mut furthest: Option<(u64, usize)> = None;
        for &(start, end, index) in &spans {
            if let Some((prev_end, prev_index)) = furthest {
                if start < prev_end {
                    flagged.push(prev_index);
                    flagged.push(index);
                }
            }
            if furthest.is_none_or(|(prev_end, _)| end > prev_end) {
                furthest = Some((end, index));
            }
        }
        if !flagged.is_empty() {
            debug!(
                "region ({}, {}): {} chunks share sectors",
                self.rx,
                self.rz,
                flagged.len()
            );
        }
        for index in flagged {
            self.chunks[index].mark_overlapping();
        }
    }

    /// Serializes the region, relocating chunks as it goes.
    ///
    /// Live chunks are laid out contiguously from sector 2 in row-major
    /// grid order, which removes any overlap and fragmentation present in
    /// the decoded file. Chunks whose payload cannot be represented
    /// (TooBig) or reconstructed (Corrupted) keep a zeroed directory entry.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, RegionError> {
        let mut out = vec![0u8; REGION_HEADER_SIZE];
        let mut next_offset = 2u32;
        for chunk in &mut self.chunks {
            if chunk.recompute()? == ChunkState::Ok {
                chunk.set_offset(next_offset);
                next_offset += chunk.sectors();
            }
            // Derived fields are fresh; the chunk must not recompute again.
            chunk.encode_into(&mut out, false)?;
        }
        Ok(out)
    }

    fn slot(cx: u8, cz: u8) -> usize {
        assert!(
            (cx as usize) < REGION_WIDTH && (cz as usize) < REGION_WIDTH,
            "chunk coordinates ({cx}, {cz}) out of range"
        );
        cx as usize + cz as usize * REGION_WIDTH
    }

    /// The chunk at local coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `cx` or `cz` is 32 or more.
    pub fn chunk(&self, cx: u8, cz: u8) -> &Chunk {
        &self.chunks[Self::slot(cx, cz)]
    }

    /// Mutable access to the chunk at local coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `cx` or `cz` is 32 or more.
    pub fn chunk_mut(&mut self, cx: u8, cz: u8) -> &mut Chunk {
        &mut self.chunks[Self::slot(cx, cz)]
    }

    /// Replaces the slot matching the chunk's own coordinates.
    pub fn set_chunk(&mut self, chunk: Chunk) {
        let (cx, cz) = chunk.coords();
        self.chunks[Self::slot(cx, cz)] = chunk;
    }

    /// Resets a slot to a fresh NotCreated chunk.
    pub fn clear_chunk(&mut self, cx: u8, cz: u8) {
        self.chunks[Self::slot(cx, cz)] = Chunk::new(cx, cz);
    }

    /// The chunk owning the given world chunk coordinates, if it falls in
    /// this region.
    pub fn world_chunk(&self, cx: i32, cz: i32) -> Option<&Chunk> {
        let (lx, lz) = self.to_local(cx, cz)?;
        Some(self.chunk(lx, lz))
    }

    pub fn world_chunk_mut(&mut self, cx: i32, cz: i32) -> Option<&mut Chunk> {
        let (lx, lz) = self.to_local(cx, cz)?;
        Some(self.chunk_mut(lx, lz))
    }

    fn to_local(&self, cx: i32, cz: i32) -> Option<(u8, u8)> {
        let lx = cx - self.rx * REGION_WIDTH as i32;
        let lz = cz - self.rz * REGION_WIDTH as i32;
        if (0..REGION_WIDTH as i32).contains(&lx) && (0..REGION_WIDTH as i32).contains(&lz) {
            Some((lx as u8, lz as u8))
        } else {
            None
        }
    }

    /// Iterates all 1024 slots in row-major order (`cz` outer, `cx` inner),
    /// matching the on-disk directory order.
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anvil::Compression;
    use crate::nbt::{NamedTag, NbtTag};

    #[test]
    fn new_region_is_fully_populated() {
        let region = Region::new(-1, 3);
        assert_eq!(region.iter().count(), REGION_CHUNKS);
        assert!(
            region
                .iter()
                .all(|chunk| chunk.state() == ChunkState::NotCreated)
        );
    }

    #[test]
    fn iteration_is_row_major() {
        let region = Region::new(0, 0);
        let coords: Vec<_> = region.iter().take(34).map(Chunk::coords).collect();
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[31], (31, 0));
        assert_eq!(coords[32], (0, 1));
        assert_eq!(coords[33], (1, 1));
    }

    #[test]
    fn empty_input_decodes_to_empty_region() {
        let region = Region::from_bytes(0, 0, &[]).unwrap();
        assert!(
            region
                .iter()
                .all(|chunk| chunk.state() == ChunkState::NotCreated)
        );
    }

    #[test]
    fn short_input_is_missing_header() {
        assert!(matches!(
            Region::from_bytes(0, 0, &[0u8; 100]),
            Err(RegionError::MissingHeader(100))
        ));
    }

    #[test]
    fn world_coordinates_translate() {
        let mut region = Region::new(1, -1);
        region.set_chunk(Chunk::with_nbt(
            2,
            30,
            NamedTag::new("", NbtTag::compound()),
            Compression::Zlib,
        ));
        assert!(region.world_chunk(34, -2).is_some());
        assert_eq!(region.world_chunk(34, -2).unwrap().coords(), (2, 30));
        assert!(region.world_chunk(2, 30).is_none());
    }

    #[test]
    fn clear_resets_slot() {
        let mut region = Region::new(0, 0);
        region.set_chunk(Chunk::with_nbt(
            4,
            4,
            NamedTag::new("", NbtTag::compound()),
            Compression::Zlib,
        ));
        assert_eq!(region.chunk(4, 4).state(), ChunkState::Ok);
        region.clear_chunk(4, 4);
        assert_eq!(region.chunk(4, 4).state(), ChunkState::NotCreated);
    }
}
