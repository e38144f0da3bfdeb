use crate::config::SimConfig;
use anyhow::{Context, Result};
use gridgrab_core::{scoped_rng, ItemType, SimTick, ITEM_TYPES};
use gridgrab_testkit::{single_source_world, JsonlSink, TransferRecord};
use gridgrab_world::{
    register_blocks, save_world, tick_grabbers, Facing, GrabberEvent, TileGrid, TilePos,
};
use rand::Rng;
use std::path::PathBuf;
use tracing::{debug, info};

/// RNG domain tag for demo-world layout.
const LAYOUT_DOMAIN: u64 = 0x6772_6162;

/// Vertical spacing between demo stations.
const STATION_PITCH: i32 = 4;

/// Scenario used when `--scenario` is not given.
const DEFAULT_SCENARIO: &str = "demo";

pub struct HeadlessConfig {
    pub sim: SimConfig,
    pub scenario: Option<String>,
    pub max_ticks: Option<u64>,
    pub world_seed: Option<u64>,
    pub save_dir: Option<PathBuf>,
    pub no_save: bool,
    pub event_log: Option<PathBuf>,
}

pub fn run(cfg: HeadlessConfig) -> Result<()> {
    let seed = cfg.world_seed.unwrap_or(cfg.sim.world.seed);
    let max_ticks = cfg.max_ticks.unwrap_or(cfg.sim.max_ticks);
    let scenario = cfg.scenario.as_deref().unwrap_or(DEFAULT_SCENARIO);

    let mut grid = build_world(scenario, &cfg.sim, seed)?;
    info!(
        seed,
        max_ticks,
        scenario,
        "{}",
        grid.registry().grabber_details()
    );

    let mut sink = match &cfg.event_log {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => None,
    };

    let mut grabbed = 0u64;
    let mut stored = 0u64;
    let mut discarded = 0u64;

    for tick in 0..max_ticks {
        for (pos, event) in tick_grabbers(&mut grid) {
            match event {
                GrabberEvent::Grabbed(_) => grabbed += 1,
                GrabberEvent::Stored(_) => stored += 1,
                GrabberEvent::Discarded(_) => discarded += 1,
            }

            let record = TransferRecord::from_event(SimTick(tick), pos, event);
            debug!(tick, ?pos, kind = record.kind, item = record.item, "transfer step");
            if let Some(sink) = sink.as_mut() {
                sink.write(&record)?;
            }
        }
    }

    info!(grabbed, stored, discarded, "simulation finished");
    for pos in grid.grabber_positions() {
        if let Some(state) = grid.grabber(pos) {
            info!(?pos, held = state.inventory.total(), "grabber inventory");
        }
    }

    if !cfg.no_save {
        let dir = cfg.save_dir.unwrap_or_else(|| PathBuf::from("saves"));
        let path = dir.join("world.ggv");
        save_world(&path, &grid, seed, max_ticks)?;
        info!("World saved to {}", path.display());
    }

    Ok(())
}

/// Build the world for a named scenario.
///
/// `demo` lays out `station_count` seeded grabber/container pairs; `drain`
/// is a single grabber emptying one container at its maximum reach.
fn build_world(scenario: &str, sim: &SimConfig, seed: u64) -> Result<TileGrid> {
    match scenario {
        "demo" => Ok(demo_world(sim, seed)),
        "drain" => {
            let distance = sim.grabber.grab_range.max(1);
            let (grid, _) = single_source_world(
                sim.grabber.clone(),
                distance,
                &[(ItemType::Copper, sim.world.source_stock)],
            );
            Ok(grid)
        }
        other => anyhow::bail!("Unknown scenario: {other} (expected \"demo\" or \"drain\")"),
    }
}

/// Lay out `station_count` grabber/container pairs, seeded deterministically:
/// same seed, same world.
fn demo_world(sim: &SimConfig, seed: u64) -> TileGrid {
    let mut grid = TileGrid::new(register_blocks(sim.grabber.clone()));
    let grab_range = grid.registry().grabber().grab_range.max(1);
    let mut rng = scoped_rng(seed, LAYOUT_DOMAIN, SimTick::ZERO);

    for station in 0..sim.world.station_count {
        let y = station as i32 * STATION_PITCH;
        let grabber_pos = TilePos::new(0, y);
        let distance = rng.gen_range(1..=grab_range);
        let source_pos = grabber_pos.step(Facing::East, distance);

        grid.place_grabber(grabber_pos, Facing::East);
        let inventory = grid.place_container(source_pos);
        for _ in 0..sim.world.source_stock {
            let item: ItemType = ITEM_TYPES[rng.gen_range(0..ITEM_TYPES.len())];
            inventory.add_one(item);
        }

        debug!(?grabber_pos, ?source_pos, distance, "placed station");
    }

    grid
}
