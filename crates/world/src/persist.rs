//! World persistence with zstd compression.
//!
//! A save file carries a fixed header (magic, version, CRC32, payload length)
//! followed by a zstd-compressed bincode payload. Grabbers persist only their
//! facing (a single byte) and inventory; every other grabber field
//! reinitializes to its idle default on load.

use crate::block::{BlockId, BlockRegistry};
use crate::grabber::GrabberState;
use crate::grid::{BlockEntity, Facing, Tile, TileGrid, TilePos};
use crate::inventory::Inventory;
use anyhow::{Context, Result};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Magic number for save file identification ("GGSV" = gridgrab save).
const SAVE_MAGIC: u32 = 0x47475356;

/// Current save format version.
const SAVE_VERSION: u16 = 1;

/// zstd compression level for save payloads.
const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone)]
struct SaveHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl SaveHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: SAVE_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(14);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 14 {
            anyhow::bail!("Save header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != SAVE_MAGIC {
            anyhow::bail!(
                "Invalid save magic: expected 0x{:08X}, got 0x{:08X}",
                SAVE_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != SAVE_VERSION {
            anyhow::bail!("Unsupported save version: {}", version);
        }

        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedWorld {
    seed: u64,
    tick: u64,
    tiles: Vec<SavedTile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedTile {
    pos: TilePos,
    block: BlockId,
    entity: Option<SavedEntity>,
}

#[derive(Debug, Serialize, Deserialize)]
enum SavedEntity {
    Container {
        inventory: Inventory,
    },
    Grabber {
        /// Facing as its 2-bit index; the only persisted machine field.
        facing: u8,
        inventory: Inventory,
    },
}

/// Write the grid and simulation clock to a save file.
pub fn save_world(path: &Path, grid: &TileGrid, seed: u64, tick: u64) -> Result<()> {
    let tiles = grid
        .iter()
        .map(|(pos, tile)| SavedTile {
            pos,
            block: tile.block,
            entity: tile.entity.as_ref().map(|entity| match entity {
                BlockEntity::Container(inv) => SavedEntity::Container {
                    inventory: inv.clone(),
                },
                BlockEntity::Grabber(state) => SavedEntity::Grabber {
                    facing: state.facing.index(),
                    inventory: state.inventory.clone(),
                },
            }),
        })
        .collect();

    let saved = SavedWorld { seed, tick, tiles };
    let payload = bincode::serialize(&saved).context("Failed to serialize world")?;
    let compressed =
        zstd::encode_all(payload.as_slice(), COMPRESSION_LEVEL).context("Failed to compress save")?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let header = SaveHeader::new(hasher.finalize(), compressed.len() as u32);

    let mut bytes = header.to_bytes();
    bytes.extend_from_slice(&compressed);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create save directory")?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a save file back into a grid, returning `(grid, seed, tick)`.
///
/// Grabber transients (phase, arm, target, held item, cooldown) come back at
/// their idle defaults; only facing and inventory survive the round trip.
pub fn load_world(path: &Path, registry: BlockRegistry) -> Result<(TileGrid, u64, u64)> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let header = SaveHeader::from_bytes(&bytes)?;

    let payload_start = 14;
    let payload_end = payload_start + header.payload_len as usize;
    if bytes.len() < payload_end {
        anyhow::bail!("Save payload truncated");
    }
    let compressed = &bytes[payload_start..payload_end];

    let mut hasher = Hasher::new();
    hasher.update(compressed);
    if hasher.finalize() != header.crc32 {
        anyhow::bail!("Save CRC mismatch, file is corrupt");
    }

    let payload = zstd::decode_all(compressed).context("Failed to decompress save")?;
    let saved: SavedWorld =
        bincode::deserialize(&payload).context("Failed to deserialize world")?;

    let grabber_capacity = registry.grabber().item_capacity;
    let mut grid = TileGrid::new(registry);
    for tile in saved.tiles {
        let entity = match tile.entity {
            Some(SavedEntity::Container { inventory }) => {
                Some(BlockEntity::Container(inventory))
            }
            Some(SavedEntity::Grabber { facing, inventory }) => {
                if facing > 3 {
                    anyhow::bail!("Invalid facing byte in save: {}", facing);
                }
                let mut state = GrabberState::new(Facing::from_index(facing), grabber_capacity);
                state.inventory = inventory;
                Some(BlockEntity::Grabber(state))
            }
            None => None,
        };
        grid.insert_raw(
            tile.pos,
            Tile {
                block: tile.block,
                entity,
            },
        );
    }

    Ok((grid, saved.seed, saved.tick))
}
