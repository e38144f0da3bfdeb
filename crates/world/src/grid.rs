//! Tile grid, facings and the per-tick grabber scheduler.

use crate::block::{BlockId, BlockRegistry, BLOCK_CONTAINER, BLOCK_GRABBER, BLOCK_WALL};
use crate::grabber::{GrabberEvent, GrabberState, GrabberWorld};
use crate::inventory::Inventory;
use gridgrab_core::ItemType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cardinal facing, stored in saves as a 2-bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    North,
    South,
    East,
    West,
}

impl Facing {
    /// Get facing from a configuration value (2 bits, extra bits masked off).
    pub fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => Facing::North,
            1 => Facing::South,
            2 => Facing::East,
            _ => Facing::West,
        }
    }

    /// Convert to the 2-bit index used in saves and configuration.
    pub fn index(self) -> u8 {
        match self {
            Facing::North => 0,
            Facing::South => 1,
            Facing::East => 2,
            Facing::West => 3,
        }
    }

    /// Get the opposite facing.
    pub fn opposite(self) -> Self {
        match self {
            Facing::North => Facing::South,
            Facing::South => Facing::North,
            Facing::East => Facing::West,
            Facing::West => Facing::East,
        }
    }

    /// Unit offset vector for this facing.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::South => (0, 1),
            Facing::East => (1, 0),
            Facing::West => (-1, 0),
        }
    }
}

/// Grid coordinate of a single tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile `distance` steps along `facing` from this one.
    pub fn step(self, facing: Facing, distance: i32) -> Self {
        let (dx, dy) = facing.offset();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }
}

/// Live per-placement state attached to a tile.
#[derive(Debug, Clone)]
pub enum BlockEntity {
    /// Passive storage other blocks can pull from.
    Container(Inventory),
    /// A grabber's full cycle state.
    Grabber(GrabberState),
}

impl BlockEntity {
    /// The entity's item inventory, whatever its kind.
    pub fn inventory(&self) -> &Inventory {
        match self {
            BlockEntity::Container(inv) => inv,
            BlockEntity::Grabber(state) => &state.inventory,
        }
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        match self {
            BlockEntity::Container(inv) => inv,
            BlockEntity::Grabber(state) => &mut state.inventory,
        }
    }
}

/// One occupied grid cell.
#[derive(Debug, Clone)]
pub struct Tile {
    pub block: BlockId,
    pub entity: Option<BlockEntity>,
}

/// Sparse tile world keyed by position.
///
/// Iteration order over tiles is the `TilePos` ordering, which keeps the
/// grabber scheduler deterministic across runs.
#[derive(Debug)]
pub struct TileGrid {
    registry: BlockRegistry,
    tiles: BTreeMap<TilePos, Tile>,
}

impl TileGrid {
    /// Empty grid over the given content registry.
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            tiles: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Look up the tile at `pos`, if any block occupies it.
    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    /// Iterate over occupied tiles in deterministic position order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, &Tile)> {
        self.tiles.iter().map(|(pos, tile)| (*pos, tile))
    }

    /// Place a plain wall.
    pub fn place_wall(&mut self, pos: TilePos) {
        self.tiles.insert(
            pos,
            Tile {
                block: BLOCK_WALL,
                entity: None,
            },
        );
    }

    /// Place a container and return its (empty) inventory for stocking.
    pub fn place_container(&mut self, pos: TilePos) -> &mut Inventory {
        let capacity = self
            .registry
            .def(BLOCK_CONTAINER)
            .map(|def| def.item_capacity)
            .unwrap_or(0);
        self.tiles.insert(
            pos,
            Tile {
                block: BLOCK_CONTAINER,
                entity: Some(BlockEntity::Container(Inventory::new(capacity))),
            },
        );
        match self.tiles.get_mut(&pos) {
            Some(Tile {
                entity: Some(entity),
                ..
            }) => entity.inventory_mut(),
            _ => unreachable!("container tile always carries an inventory"),
        }
    }

    /// Place a grabber facing the given direction.
    pub fn place_grabber(&mut self, pos: TilePos, facing: Facing) {
        let capacity = self.registry.grabber().item_capacity;
        self.tiles.insert(
            pos,
            Tile {
                block: BLOCK_GRABBER,
                entity: Some(BlockEntity::Grabber(GrabberState::new(facing, capacity))),
            },
        );
    }

    /// Remove whatever occupies `pos`. The entity and any in-flight grab are
    /// discarded with it; a source that already lost an item stays short one.
    pub fn remove_block(&mut self, pos: TilePos) {
        self.tiles.remove(&pos);
    }

    /// Inventory of the container at `pos`, if one is placed there.
    pub fn container_mut(&mut self, pos: TilePos) -> Option<&mut Inventory> {
        match self.tiles.get_mut(&pos) {
            Some(Tile {
                entity: Some(BlockEntity::Container(inv)),
                ..
            }) => Some(inv),
            _ => None,
        }
    }

    /// State of the grabber at `pos`, if one is placed there.
    pub fn grabber(&self, pos: TilePos) -> Option<&GrabberState> {
        match self.tiles.get(&pos) {
            Some(Tile {
                entity: Some(BlockEntity::Grabber(state)),
                ..
            }) => Some(state),
            _ => None,
        }
    }

    pub fn grabber_mut(&mut self, pos: TilePos) -> Option<&mut GrabberState> {
        match self.tiles.get_mut(&pos) {
            Some(Tile {
                entity: Some(BlockEntity::Grabber(state)),
                ..
            }) => Some(state),
            _ => None,
        }
    }

    /// Positions of all placed grabbers in scheduling order.
    pub fn grabber_positions(&self) -> Vec<TilePos> {
        self.tiles
            .iter()
            .filter(|(_, tile)| tile.block == BLOCK_GRABBER)
            .map(|(pos, _)| *pos)
            .collect()
    }

    pub(crate) fn insert_raw(&mut self, pos: TilePos, tile: Tile) {
        self.tiles.insert(pos, tile);
    }

    fn entity_inventory(&self, pos: TilePos) -> Option<&Inventory> {
        self.tiles
            .get(&pos)?
            .entity
            .as_ref()
            .map(BlockEntity::inventory)
    }

    fn take_grabber_state(&mut self, pos: TilePos) -> Option<GrabberState> {
        let tile = self.tiles.get_mut(&pos)?;
        match tile.entity.take() {
            Some(BlockEntity::Grabber(state)) => Some(state),
            other => {
                tile.entity = other;
                None
            }
        }
    }

    fn restore_grabber_state(&mut self, pos: TilePos, state: GrabberState) {
        if let Some(tile) = self.tiles.get_mut(&pos) {
            tile.entity = Some(BlockEntity::Grabber(state));
        }
    }
}

impl GrabberWorld for TileGrid {
    fn outputs_items(&self, pos: TilePos) -> bool {
        self.tiles
            .get(&pos)
            .is_some_and(|tile| self.registry.outputs_items(tile.block) && tile.entity.is_some())
    }

    fn inventory_total(&self, pos: TilePos) -> Option<u32> {
        self.entity_inventory(pos).map(Inventory::total)
    }

    fn take_one(&mut self, pos: TilePos) -> Option<ItemType> {
        self.tiles
            .get_mut(&pos)?
            .entity
            .as_mut()?
            .inventory_mut()
            .take_first()
    }
}

/// Advance every grabber by one tick.
///
/// Each grabber's state is lifted out of its tile while it runs so the
/// machine can mutate the rest of the grid through [`GrabberWorld`].
pub fn tick_grabbers(grid: &mut TileGrid) -> Vec<(TilePos, GrabberEvent)> {
    let cfg = grid.registry().grabber().clone();
    let mut events = Vec::new();

    for pos in grid.grabber_positions() {
        let Some(mut state) = grid.take_grabber_state(pos) else {
            continue;
        };
        let event = state.tick(pos, &cfg, grid);
        grid.restore_grabber_state(pos, state);

        if let Some(event) = event {
            events.push((pos, event));
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::register_blocks;
    use crate::grabber::{GrabberConfig, GrabberPhase};

    fn grid_with(cfg: GrabberConfig) -> TileGrid {
        TileGrid::new(register_blocks(cfg))
    }

    #[test]
    fn facing_index_round_trips() {
        for index in 0u8..4 {
            assert_eq!(Facing::from_index(index).index(), index);
        }
        assert_eq!(Facing::from_index(7), Facing::West);
        assert_eq!(Facing::North.opposite(), Facing::South);
        assert_eq!(Facing::East.opposite(), Facing::West);
    }

    #[test]
    fn outputs_items_requires_capability_and_entity() {
        let mut grid = grid_with(GrabberConfig::default());
        let container = TilePos::new(1, 0);
        let wall = TilePos::new(2, 0);
        let grabber = TilePos::new(3, 0);

        grid.place_container(container);
        grid.place_wall(wall);
        grid.place_grabber(grabber, Facing::East);

        assert!(grid.outputs_items(container));
        assert!(!grid.outputs_items(wall));
        assert!(!grid.outputs_items(grabber));
        assert!(!grid.outputs_items(TilePos::new(9, 9)));
    }

    #[test]
    fn take_one_pulls_from_container_inventory() {
        let mut grid = grid_with(GrabberConfig::default());
        let pos = TilePos::new(0, 0);
        grid.place_container(pos).add_many(ItemType::Copper, 2);

        assert_eq!(grid.inventory_total(pos), Some(2));
        assert_eq!(grid.take_one(pos), Some(ItemType::Copper));
        assert_eq!(grid.inventory_total(pos), Some(1));
    }

    #[test]
    fn full_transfer_through_the_grid() {
        let cfg = GrabberConfig {
            grab_speed: 1.0,
            operation_time: 0,
            ..GrabberConfig::default()
        };
        let mut grid = grid_with(cfg);
        let grabber_pos = TilePos::new(0, 0);
        let source_pos = TilePos::new(2, 0);

        grid.place_grabber(grabber_pos, Facing::East);
        grid.place_container(source_pos).add_many(ItemType::Lead, 1);

        let mut all_events = Vec::new();
        for _ in 0..3 {
            all_events.extend(tick_grabbers(&mut grid));
        }

        assert_eq!(
            all_events,
            vec![
                (grabber_pos, GrabberEvent::Grabbed(ItemType::Lead)),
                (grabber_pos, GrabberEvent::Stored(ItemType::Lead)),
            ]
        );
        assert_eq!(grid.inventory_total(source_pos), Some(0));
        let state = grid.grabber(grabber_pos).unwrap();
        assert_eq!(state.inventory.count_of(ItemType::Lead), 1);
        assert_eq!(state.phase, GrabberPhase::Idle);
    }

    #[test]
    fn scheduler_order_is_position_order() {
        let cfg = GrabberConfig {
            grab_speed: 1.0,
            operation_time: 0,
            ..GrabberConfig::default()
        };
        let mut grid = grid_with(cfg);

        // Two grabbers flank a single source holding one item; the one that
        // schedules first (lower TilePos) wins it every run.
        let left = TilePos::new(0, 0);
        let right = TilePos::new(2, 0);
        let source = TilePos::new(1, 0);
        grid.place_grabber(left, Facing::East);
        grid.place_grabber(right, Facing::West);
        grid.place_container(source).add_many(ItemType::Silicon, 1);

        for _ in 0..4 {
            tick_grabbers(&mut grid);
        }

        assert_eq!(grid.grabber(left).unwrap().inventory.total(), 1);
        assert_eq!(grid.grabber(right).unwrap().inventory.total(), 0);
    }

    #[test]
    fn removing_a_block_discards_its_entity() {
        let mut grid = grid_with(GrabberConfig::default());
        let pos = TilePos::new(4, 4);
        grid.place_container(pos).add_many(ItemType::Copper, 3);

        grid.remove_block(pos);
        assert!(grid.tile(pos).is_none());
        assert_eq!(grid.inventory_total(pos), None);
    }
}
