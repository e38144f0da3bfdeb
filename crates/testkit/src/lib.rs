#![warn(missing_docs)]
//! Deterministic testing surfaces: transfer event stream + micro worlds.

use anyhow::Result;
use gridgrab_core::{ItemType, SimTick};
use gridgrab_world::{
    register_blocks, tick_grabbers, Facing, GrabberConfig, GrabberEvent, TileGrid, TilePos,
};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Primary event record captured by headless runs and tests.
#[derive(Debug, Serialize)]
pub struct TransferRecord<'a> {
    /// Simulation tick when the transfer step occurred.
    pub tick: SimTick,
    /// Grid position of the grabber that produced the event.
    pub pos: (i32, i32),
    /// Event kind label: "grabbed", "stored" or "discarded".
    pub kind: &'a str,
    /// Stable item name involved in the transfer.
    pub item: &'a str,
}

impl TransferRecord<'_> {
    /// Build a record from a scheduler event.
    pub fn from_event(tick: SimTick, pos: TilePos, event: GrabberEvent) -> Self {
        let (kind, item) = match event {
            GrabberEvent::Grabbed(item) => ("grabbed", item),
            GrabberEvent::Stored(item) => ("stored", item),
            GrabberEvent::Discarded(item) => ("discarded", item),
        };
        TransferRecord {
            tick,
            pos: (pos.x, pos.y),
            kind,
            item: item.name(),
        }
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, record: &TransferRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// Build a minimal world: one grabber at the origin facing east, one stocked
/// container `distance` tiles in front of it. Returns the grid and the
/// grabber's position.
pub fn single_source_world(
    cfg: GrabberConfig,
    distance: i32,
    stock: &[(ItemType, u32)],
) -> (TileGrid, TilePos) {
    let mut grid = TileGrid::new(register_blocks(cfg));
    let grabber_pos = TilePos::new(0, 0);
    let source_pos = grabber_pos.step(Facing::East, distance);

    grid.place_grabber(grabber_pos, Facing::East);
    let inventory = grid.place_container(source_pos);
    for (item, count) in stock {
        inventory.add_many(*item, *count);
    }

    (grid, grabber_pos)
}

/// Run the grabber scheduler for `ticks` ticks, collecting every event with
/// the tick it occurred on.
pub fn run_ticks(grid: &mut TileGrid, ticks: u64) -> Vec<(SimTick, TilePos, GrabberEvent)> {
    let mut events = Vec::new();
    let mut tick = SimTick::ZERO;
    for _ in 0..ticks {
        for (pos, event) in tick_grabbers(grid) {
            events.push((tick, pos, event));
        }
        tick = tick.advance(1);
    }
    events
}
