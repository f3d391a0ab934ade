use thiserror::Error;

/// Errors that can arise while operating on dungeon worlds. Descriptor file
/// IO failures stay on the `anyhow` path in the loader; by the time these
/// types run, the world is already in memory.
#[derive(Debug, Error)]
pub enum MudError {
    /// Returned when a gameplay operation names a location that does not exist.
    /// Locations are only created at world-load time, never during play.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// Returned when an operation names a dungeon missing from the catalog.
    #[error("unknown dungeon: {0}")]
    UnknownDungeon(String),

    /// Returned when an in-dungeon operation is issued for a player who has
    /// not joined a dungeon.
    #[error("player {0} is not in a dungeon")]
    NotInDungeon(String),

    /// The serialization gate could not be acquired within the configured wait.
    #[error("timed out waiting for the world gate")]
    GateTimeout,

    /// The world descriptors produced no usable start location.
    #[error("world has no start location (empty or malformed message descriptor)")]
    NoStartLocation,
}
