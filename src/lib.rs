// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! # region-nbt
//!
//! A Rust library for reading, editing and writing Minecraft's NBT and
//! region (.mca) formats.
//!
//! The library is built in three layers:
//! - an NBT codec over big-endian byte streams, with full Modified UTF-8
//!   handling and byte-exact round-trips for unmutated data;
//! - a [`anvil::Chunk`] wrapping one NBT tree plus its sector, timestamp
//!   and compression metadata, with an explicit lifecycle state;
//! - a [`anvil::Region`] owning the 32×32 chunk grid, which tolerates
//!   damaged files on decode and relocates chunks onto disjoint sectors on
//!   encode.
//!
//! Path-level helpers live in [`files`]; pure coordinate math in
//! [`coords`].

pub mod anvil;
pub mod coords;
pub mod error;
pub mod files;
pub mod nbt;

pub use anvil::{Chunk, ChunkState, Compression, Region};
pub use error::{NbtError, RegionError};
pub use nbt::{NamedTag, NbtString, NbtTag};
