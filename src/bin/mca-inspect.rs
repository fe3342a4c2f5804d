// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use region_nbt::anvil::ChunkState;
use region_nbt::coords::chunk_local;
use region_nbt::files::{NbtFile, RegionFile};

#[derive(Parser)]
#[command(name = "mca-inspect")]
#[command(about = "Inspect Minecraft NBT and region files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a .dat (NBT) file
    Nbt {
        /// Path to the .dat file
        path: PathBuf,
    },
    /// Inspect an .mca region file
    Region {
        /// Path to the .mca file
        path: PathBuf,
        /// Chunk X coordinate
        #[arg(short, long)]
        x: Option<i32>,
        /// Chunk Z coordinate
        #[arg(short, long)]
        z: Option<i32>,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        let msg = format!("{:?}", e).to_lowercase();
        if msg.contains("broken pipe") || msg.contains("os error 32") {
            std::process::exit(0);
        }
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Commands::Nbt { path } => {
            let file = NbtFile::open(path)?;
            writeln!(handle, "Root tag name: '{}'", file.root.name)?;
            writeln!(handle, "{:#?}", file.root.tag)?;
        }
        Commands::Region { path, x, z } => {
            let file = RegionFile::open(path)?;
            if let (Some(x), Some(z)) = (x, z) {
                let (lx, lz) = chunk_local(x, z);
                let chunk = file.region.chunk(lx, lz);
                writeln!(handle, "Chunk ({x}, {z}) state: {:?}", chunk.state())?;
                if let Some(root) = chunk.nbt() {
                    writeln!(handle, "Root tag name: '{}'", root.name)?;
                    writeln!(handle, "{:#?}", root.tag)?;
                }
            } else {
                let mut counts = [0usize; 5];
                for chunk in file.region.iter() {
                    let bucket = match chunk.state() {
                        ChunkState::NotCreated => 0,
                        ChunkState::Ok => 1,
                        ChunkState::Overlapping => 2,
                        ChunkState::TooBig => 3,
                        ChunkState::Corrupted => 4,
                    };
                    counts[bucket] += 1;
                }
                let (rx, rz) = file.region.coords();
                writeln!(handle, "Region ({rx}, {rz})")?;
                writeln!(handle, "  ok:          {}", counts[1])?;
                writeln!(handle, "  not created: {}", counts[0])?;
                writeln!(handle, "  overlapping: {}", counts[2])?;
                writeln!(handle, "  too big:     {}", counts[3])?;
                writeln!(handle, "  corrupted:   {}", counts[4])?;
                writeln!(handle, "Use -x and -z to inspect a specific chunk.")?;
            }
        }
    }
    Ok(())
}
