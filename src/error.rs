// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Crate-wide error types.

use std::io;

use thiserror::Error;

use crate::nbt::mutf8::Mutf8Error;

/// Errors that can occur while decoding or encoding NBT data.
///
/// Any of these is fatal for the tree being processed; the codec never
/// returns a partially decoded tree.
#[derive(Debug, Error)]
pub enum NbtError {
    /// The outermost tag of the stream was not a Compound (id 10).
    #[error("root tag id {0} is not a compound")]
    InvalidRoot(u8),
    /// A tag id outside `0..=12` was encountered.
    #[error("unknown tag id {0}")]
    UnknownTagId(u8),
    /// A list or array declared a negative or impossible length.
    #[error("malformed length {0}")]
    MalformedLength(i32),
    /// The input ended in the middle of a tag.
    #[error("input truncated mid-tag")]
    TruncatedStream,
    /// Bytes could not be read as modified UTF-8.
    #[error("invalid modified UTF-8: {0}")]
    InvalidUtf8(#[from] Mutf8Error),
    /// A dynamic length does not fit the fixed width of its wire field.
    #[error("{0} does not fit its wire field")]
    ValueOutOfRange(&'static str),
    /// A non-empty list whose elements disagree on their tag id.
    #[error("list elements must share one tag id")]
    MixedList,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors that can occur while decoding or encoding region files.
///
/// During region decode these are absorbed into the affected chunk's state
/// instead of being returned; during encode they abort the whole pass.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The file is non-empty but shorter than the two header sectors.
    #[error("region file is {0} bytes, shorter than the 8192 byte header")]
    MissingHeader(u64),
    /// A chunk header carried a compression code outside `{1, 2, 3}`.
    #[error("unknown compression code {0}")]
    BadCompression(u8),
    /// The compressed chunk payload could not be inflated.
    #[error("failed to decompress chunk payload")]
    DecompressionFailed(#[source] io::Error),
    #[error(transparent)]
    Nbt(#[from] NbtError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
