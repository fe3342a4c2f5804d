// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path-level wrappers binding the codecs to files on disk.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::{debug, warn};
use memmap2::Mmap;

use crate::anvil::Region;
use crate::error::{NbtError, RegionError};
use crate::nbt::NamedTag;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Outer compression of a standalone NBT file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCompression {
    Gzip,
    Plain,
}

/// A standalone NBT file such as `level.dat`.
///
/// Opening sniffs the gzip magic; saving re-applies whichever outer
/// compression the file had.
pub struct NbtFile {
    path: PathBuf,
    compression: FileCompression,
    pub root: NamedTag,
}

impl NbtFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, NbtError> {
        let path = path.as_ref().to_path_buf();
        let mut bytes = Vec::new();
        File::open(&path)?.read_to_end(&mut bytes)?;

        let (compression, raw) = if bytes.starts_with(&GZIP_MAGIC) {
            let mut raw = Vec::new();
            GzDecoder::new(&bytes[..]).read_to_end(&mut raw)?;
            (FileCompression::Gzip, raw)
        } else {
            (FileCompression::Plain, bytes)
        };
        debug!("{}: outer compression {compression:?}", path.display());

        let root = NamedTag::from_bytes(&raw)?;
        Ok(Self {
            path,
            compression,
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> FileCompression {
        self.compression
    }

    /// Writes the document back to the path it was opened from.
    pub fn save(&self) -> Result<(), NbtError> {
        self.save_as(&self.path)
    }

    pub fn save_as<P: AsRef<Path>>(&self, path: P) -> Result<(), NbtError> {
        let raw = self.root.to_bytes()?;
        match self.compression {
            FileCompression::Gzip => {
                let mut encoder =
                    GzEncoder::new(File::create(path)?, flate2::Compression::default());
                encoder.write_all(&raw)?;
                encoder.finish()?;
            }
            FileCompression::Plain => File::create(path)?.write_all(&raw)?,
        }
        Ok(())
    }
}

/// An `.mca` region file bound to a path.
pub struct RegionFile {
    path: PathBuf,
    pub region: Region,
}

impl RegionFile {
    /// Opens and decodes a region file, taking the region coordinates from
    /// its `r.<x>.<z>.mca` name. A name that does not parse falls back to
    /// region (0, 0) with a warning; Minecraft will not recognise such a
    /// file either way.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RegionError> {
        let path = path.as_ref().to_path_buf();
        let (rx, rz) = match path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_region_coords)
        {
            Some(coords) => coords,
            None => {
                warn!(
                    "{}: not an r.<x>.<z>.mca name, assuming region (0, 0)",
                    path.display()
                );
                (0, 0)
            }
        };

        let file = File::open(&path)?;
        let region = if file.metadata()?.len() == 0 {
            Region::new(rx, rz)
        } else {
            let mmap = unsafe { Mmap::map(&file)? };
            Region::from_bytes(rx, rz, &mmap)?
        };
        debug!("{}: loaded as region ({rx}, {rz})", path.display());
        Ok(Self { path, region })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-encodes the region over the file it was opened from.
    pub fn save(&mut self) -> Result<(), RegionError> {
        let bytes = self.region.to_bytes()?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RegionError> {
        let path = path.as_ref();
        if path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_region_coords)
            .is_none()
        {
            warn!(
                "{}: not an r.<x>.<z>.mca name, Minecraft will not read it",
                path.display()
            );
        }
        let bytes = self.region.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Extracts region coordinates from an `r.<x>.<z>.mca` file name.
pub fn parse_region_coords(name: &str) -> Option<(i32, i32)> {
    let rest = name.strip_prefix("r.")?.strip_suffix(".mca")?;
    let (x, z) = rest.split_once('.')?;
    Some((x.parse().ok()?, z.parse().ok()?))
}
