// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integer math between block, chunk and region coordinates.

/// The chunk containing the given block column.
pub fn block_to_chunk(x: i32, z: i32) -> (i32, i32) {
    (x >> 4, z >> 4)
}

/// The region containing the given chunk.
pub fn chunk_to_region(cx: i32, cz: i32) -> (i32, i32) {
    (cx >> 5, cz >> 5)
}

/// The region containing the given block column.
pub fn block_to_region(x: i32, z: i32) -> (i32, i32) {
    let (cx, cz) = block_to_chunk(x, z);
    chunk_to_region(cx, cz)
}

/// World chunk coordinates reduced to their position within their region.
pub fn chunk_local(cx: i32, cz: i32) -> (u8, u8) {
    ((cx & 31) as u8, (cz & 31) as u8)
}

/// The conventional file name for a region.
pub fn region_filename(rx: i32, rz: i32) -> String {
    format!("r.{rx}.{rz}.mca")
}
