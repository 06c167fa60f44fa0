//! Game instances and the registry that hosts them.

mod instance;
mod registry;

pub use instance::{GameInstance, PlayerSlot};
pub use registry::{GameHandle, GameRegistry};
