mod block;
mod grabber;
mod grid;
mod inventory;
mod persist;

pub use block::*;
pub use grabber::*;
pub use grid::*;
pub use inventory::*;
pub use persist::*;
