//! Block definitions and the content registry.
//!
//! Content is registered once through [`register_blocks`], which returns an
//! immutable [`BlockRegistry`]; nothing mutates block definitions after that.

use crate::grabber::GrabberConfig;

/// Block type identifier.
pub type BlockId = u16;

/// Empty tile.
pub const BLOCK_AIR: BlockId = 0;
/// Plain solid wall, no entity.
pub const BLOCK_WALL: BlockId = 1;
/// Storage container; declares the `outputs_items` capability.
pub const BLOCK_CONTAINER: BlockId = 2;
/// The grabber itself: reaches along its facing and pulls items in.
pub const BLOCK_GRABBER: BlockId = 3;

/// Unit capacity of a container block.
pub const CONTAINER_CAPACITY: u32 = 30;

/// Static definition of a block type.
#[derive(Debug, Clone)]
pub struct BlockDef {
    pub id: BlockId,
    /// Stable lowercase name used in logs and saves.
    pub name: &'static str,
    /// Localized display name.
    pub display_name: &'static str,
    /// Short description shown in the block picker.
    pub description: &'static str,
    /// Whether this block blocks placement/movement.
    pub solid: bool,
    /// Whether other blocks may pull items out of this one.
    pub outputs_items: bool,
    /// Unit capacity of the block's inventory (0 = holds no items).
    pub item_capacity: u32,
}

/// Immutable registry of all block definitions plus grabber tuning.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    defs: Vec<BlockDef>,
    grabber: GrabberConfig,
}

/// One-shot content registration.
///
/// The grabber tuning is threaded in so the registry is the single source of
/// truth for both block capabilities and grabber behavior.
pub fn register_blocks(grabber: GrabberConfig) -> BlockRegistry {
    let defs = vec![
        BlockDef {
            id: BLOCK_AIR,
            name: "air",
            display_name: "Air",
            description: "",
            solid: false,
            outputs_items: false,
            item_capacity: 0,
        },
        BlockDef {
            id: BLOCK_WALL,
            name: "wall",
            display_name: "Wall",
            description: "Blocks movement. Holds no items.",
            solid: true,
            outputs_items: false,
            item_capacity: 0,
        },
        BlockDef {
            id: BLOCK_CONTAINER,
            name: "container",
            display_name: "Container",
            description: "Stores items and lets other blocks pull from it.",
            solid: true,
            outputs_items: true,
            item_capacity: CONTAINER_CAPACITY,
        },
        BlockDef {
            id: BLOCK_GRABBER,
            name: "grabber",
            display_name: "Grabber",
            description: "Grabs items from blocks in front and stores them. \
                          Works like an inserter arm but without fuel.",
            solid: true,
            outputs_items: false,
            item_capacity: grabber.item_capacity,
        },
    ];

    BlockRegistry { defs, grabber }
}

impl BlockRegistry {
    /// Look up a block definition by id.
    pub fn def(&self, id: BlockId) -> Option<&BlockDef> {
        self.defs.iter().find(|def| def.id == id)
    }

    /// Grabber tuning shared by every placed grabber.
    pub fn grabber(&self) -> &GrabberConfig {
        &self.grabber
    }

    /// Whether the block type allows items to be pulled out of it.
    pub fn outputs_items(&self, id: BlockId) -> bool {
        self.def(id).is_some_and(|def| def.outputs_items)
    }

    /// Detail string for the grabber block, interpolating its reach.
    pub fn grabber_details(&self) -> String {
        format!(
            "Can reach up to {} tiles away. Automatically grabs items from output blocks.",
            self.grabber.grab_range
        )
    }
}
