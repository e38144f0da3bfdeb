//! Grabber state machine.
//!
//! A grabber is a 1x1 block that reaches along its facing with an animated
//! arm, takes one item unit from the nearest output block, and deposits it
//! into its own inventory. The per-tick cycle is
//! idle -> extending -> grabbing -> retracting -> dropping, throttled by a
//! post-cycle cooldown. World access is injected through [`GrabberWorld`] so
//! the machine is testable without a live grid.

use crate::grid::{Facing, TilePos};
use crate::inventory::Inventory;
use gridgrab_core::ItemType;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Phase of the grab cycle.
///
/// `Grabbing` and `Dropping` execute in the same tick that completes the
/// preceding arm movement, so a grabber at rest between ticks is only ever
/// observed in `Idle`, `Extending` or `Retracting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabberPhase {
    /// Scanning for a source block along the facing.
    Idle,
    /// Arm moving toward the captured target.
    Extending,
    /// Arm fully extended, taking one unit from the target.
    Grabbing,
    /// Arm moving back with the held item.
    Retracting,
    /// Arm home, depositing the held item locally.
    Dropping,
}

/// Tuning shared by every placed grabber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabberConfig {
    /// How far the grabber can reach, in tiles.
    pub grab_range: i32,
    /// Arm travel per tick, as a fraction of full extension.
    pub grab_speed: f32,
    /// Cooldown in ticks between completed cycles.
    pub operation_time: u32,
    /// Unit capacity of the grabber's own inventory.
    pub item_capacity: u32,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            grab_range: 3,
            grab_speed: 0.08,
            operation_time: 90,
            item_capacity: 5,
        }
    }
}

/// Observable outcome of a single grabber tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabberEvent {
    /// One unit left the source and is now held by the arm.
    Grabbed(ItemType),
    /// The held unit was deposited into the grabber's inventory.
    Stored(ItemType),
    /// The held unit was lost because the inventory was full.
    Discarded(ItemType),
}

/// World access required by the state machine.
///
/// `take_one` removes at most one unit per call; an empty result is a normal
/// abort path, never an error.
pub trait GrabberWorld {
    /// Whether the block at `pos` declares the outputs-items capability and
    /// has a live entity.
    fn outputs_items(&self, pos: TilePos) -> bool;

    /// Unit total of the entity inventory at `pos`, or `None` when the tile
    /// is missing or holds no inventory.
    fn inventory_total(&self, pos: TilePos) -> Option<u32>;

    /// Remove one unit from the entity inventory at `pos`.
    fn take_one(&mut self, pos: TilePos) -> Option<ItemType>;
}

/// Live state of one placed grabber.
#[derive(Debug, Clone)]
pub struct GrabberState {
    /// Cardinal direction the arm reaches toward. Persisted.
    pub facing: Facing,
    /// Current cycle phase. Transient; resets to idle on load.
    pub phase: GrabberPhase,
    /// Arm extension in `[0, 1]`. Transient.
    pub arm_extension: f32,
    /// Ticks remaining before the state machine may step again. Transient.
    pub cooldown_ticks: u32,
    /// Source tile currently being drained. Transient.
    pub target: Option<TilePos>,
    /// Single unit carried by the arm, distinct from `inventory`. Transient.
    pub held_item: Option<ItemType>,
    /// The grabber's own bounded storage. Persisted.
    pub inventory: Inventory,
}

impl GrabberState {
    /// Fresh state for a newly placed grabber.
    pub fn new(facing: Facing, item_capacity: u32) -> Self {
        Self {
            facing,
            phase: GrabberPhase::Idle,
            arm_extension: 0.0,
            cooldown_ticks: 0,
            target: None,
            held_item: None,
            inventory: Inventory::new(item_capacity),
        }
    }

    /// Advance the cycle by one tick.
    ///
    /// While the cooldown is positive only the cooldown changes. Otherwise
    /// one phase's logic runs; completing an arm movement also executes the
    /// grab or drop it was traveling toward in the same tick.
    pub fn tick(
        &mut self,
        origin: TilePos,
        cfg: &GrabberConfig,
        world: &mut dyn GrabberWorld,
    ) -> Option<GrabberEvent> {
        if self.cooldown_ticks > 0 {
            self.cooldown_ticks -= 1;
            return None;
        }

        match self.phase {
            GrabberPhase::Idle => {
                match find_nearest_source(world, origin, self.facing, cfg.grab_range) {
                    Some(target) => {
                        trace!(?origin, ?target, "grabber acquired source");
                        self.target = Some(target);
                        self.phase = GrabberPhase::Extending;
                    }
                    None => {
                        self.arm_extension = 0.0;
                    }
                }
                None
            }
            GrabberPhase::Extending => {
                self.arm_extension = (self.arm_extension + cfg.grab_speed).min(1.0);
                if self.arm_extension >= 1.0 {
                    self.phase = GrabberPhase::Grabbing;
                    self.step_grab(world)
                } else {
                    None
                }
            }
            GrabberPhase::Grabbing => self.step_grab(world),
            GrabberPhase::Retracting => {
                self.arm_extension = (self.arm_extension - cfg.grab_speed).max(0.0);
                if self.arm_extension <= 0.0 {
                    self.phase = GrabberPhase::Dropping;
                    self.step_drop(cfg)
                } else {
                    None
                }
            }
            GrabberPhase::Dropping => self.step_drop(cfg),
        }
    }

    /// Overwrite the facing unconditionally.
    ///
    /// An in-flight grab keeps its captured target and finishes along the old
    /// direction before the new facing takes effect at the next idle scan.
    pub fn configure_facing(&mut self, value: u32) {
        self.facing = Facing::from_index(value as u8);
    }

    /// Read-only view for a draw callback.
    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.phase,
            arm_extension: self.arm_extension,
            facing: self.facing,
            held_item: self.held_item,
        }
    }

    fn step_grab(&mut self, world: &mut dyn GrabberWorld) -> Option<GrabberEvent> {
        let Some(target) = self.target else {
            self.abort_grab();
            return None;
        };

        let stocked = world
            .inventory_total(target)
            .is_some_and(|total| total > 0);
        if !stocked {
            trace!(?target, "grab target vanished or emptied");
            self.abort_grab();
            return None;
        }

        match world.take_one(target) {
            Some(item) => {
                self.held_item = Some(item);
                self.target = None;
                self.phase = GrabberPhase::Retracting;
                Some(GrabberEvent::Grabbed(item))
            }
            None => {
                self.abort_grab();
                None
            }
        }
    }

    fn step_drop(&mut self, cfg: &GrabberConfig) -> Option<GrabberEvent> {
        let event = match self.held_item.take() {
            Some(item) => {
                if self.inventory.add_one(item) {
                    Some(GrabberEvent::Stored(item))
                } else {
                    debug!(item = item.name(), "grabber inventory full, held item discarded");
                    Some(GrabberEvent::Discarded(item))
                }
            }
            None => None,
        };

        self.reset();
        self.cooldown_ticks = cfg.operation_time;
        event
    }

    /// Grab-time abort: back to idle with the target cleared. The arm is left
    /// where it is; the next fruitless idle scan pulls it home, while a scan
    /// that finds a new source re-extends from the current position. An arm
    /// still at full reach therefore grabs again one tick after the scan,
    /// with no fresh travel time.
    fn abort_grab(&mut self) {
        self.phase = GrabberPhase::Idle;
        self.target = None;
    }

    fn reset(&mut self) {
        self.phase = GrabberPhase::Idle;
        self.arm_extension = 0.0;
        self.target = None;
    }
}

/// Per-tick state a renderer would consume. Pure read of entity state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSnapshot {
    pub phase: GrabberPhase,
    pub arm_extension: f32,
    pub facing: Facing,
    pub held_item: Option<ItemType>,
}

/// Scan `1..=range` tiles along `facing`, nearest first, returning the first
/// tile whose block outputs items and whose inventory is non-empty.
pub fn find_nearest_source(
    world: &dyn GrabberWorld,
    origin: TilePos,
    facing: Facing,
    range: i32,
) -> Option<TilePos> {
    (1..=range)
        .map(|distance| origin.step(facing, distance))
        .find(|&pos| {
            world.outputs_items(pos) && world.inventory_total(pos).unwrap_or(0) > 0
        })
}

/// Tiles a candidate placement would cover, for a range indicator. Uses only
/// static configuration, never entity state.
pub fn placement_preview(origin: TilePos, facing: Facing, range: i32) -> Vec<TilePos> {
    (1..=range)
        .map(|distance| origin.step(facing, distance))
        .collect()
}
