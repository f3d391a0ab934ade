//! A dungeon instance: one world graph plus a capacity-bounded roster.

use log::debug;

use super::errors::MudError;
use super::graph::WorldGraph;
use super::types::Occupant;

/// One independent, joinable world. Created on demand by `/create` and kept
/// for the server's lifetime; an emptied roster does not retire the instance.
#[derive(Debug, Clone)]
pub struct Dungeon {
    world: WorldGraph,
    capacity: usize,
    roster: Vec<String>,
}

impl Dungeon {
    pub fn new(world: WorldGraph, capacity: usize) -> Self {
        Dungeon {
            world,
            capacity,
            roster: Vec::new(),
        }
    }

    /// Add a player to the roster. Refused when already present or when the
    /// roster is at capacity.
    pub fn join(&mut self, username: &str) -> bool {
        if self.roster.iter().any(|p| p == username) {
            debug!("join refused: {} already on roster", username);
            return false;
        }
        if self.roster.len() >= self.capacity {
            debug!(
                "join refused: roster full ({}/{})",
                self.roster.len(),
                self.capacity
            );
            return false;
        }
        self.roster.push(username.to_string());
        true
    }

    /// Remove a player from the roster and from whatever location they
    /// occupy. Idempotent.
    pub fn leave(&mut self, username: &str) {
        self.roster.retain(|p| p != username);
        self.world.remove_player_everywhere(username);
    }

    /// Place a joined player at the world's start location and return its
    /// name.
    pub fn enter_at_start(&mut self, username: &str) -> Result<String, MudError> {
        let start = self.world.start_location().to_string();
        if start.is_empty() {
            return Err(MudError::NoStartLocation);
        }
        self.world
            .add_occupant(&start, Occupant::Player(username.to_string()))?;
        Ok(start)
    }

    pub fn start_location(&self) -> &str {
        self.world.start_location()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub fn on_roster(&self, username: &str) -> bool {
        self.roster.iter().any(|p| p == username)
    }

    pub fn world(&self) -> &WorldGraph {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldGraph {
        &mut self.world
    }

    /// Debug dump: the full graph plus instance limits, as shown by
    /// `/display`.
    pub fn display(&self) -> String {
        format!(
            "{}Maximum number of players: {}\n",
            self.world.summary(),
            self.capacity
        )
    }
}
