//! Dungeon world model: location graphs, descriptor loading, and joinable
//! instances.

pub mod dungeon;
pub mod errors;
pub mod graph;
pub mod loader;
pub mod types;

pub use dungeon::Dungeon;
pub use errors::MudError;
pub use graph::{Exit, Location, WorldGraph};
pub use loader::{build_world, load_world};
pub use types::{Direction, Occupant};
