//! Name-keyed registry of dungeon instances, bounded by a server-wide cap.

use std::collections::HashMap;

use log::{info, warn};

use crate::world::Dungeon;

/// All dungeons on the server. Instances are created on demand and never
/// removed; an abandoned dungeon keeps its catalog slot until the process
/// exits, so the catalog only grows toward its cap.
#[derive(Debug)]
pub struct DungeonCatalog {
    dungeons: HashMap<String, Dungeon>,
    limit: usize,
}

impl DungeonCatalog {
    pub fn new(limit: usize) -> Self {
        DungeonCatalog {
            dungeons: HashMap::new(),
            limit,
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dungeons.contains_key(name)
    }

    /// True when no slot is free for another instance.
    pub fn is_full(&self) -> bool {
        self.dungeons.len() >= self.limit
    }

    /// Insert a new instance. Fails without mutation when the name is taken
    /// or the catalog is at its cap.
    pub fn create(&mut self, name: &str, dungeon: Dungeon) -> bool {
        if self.exists(name) {
            warn!("create refused: dungeon [{}] already exists", name);
            return false;
        }
        if self.is_full() {
            warn!(
                "create refused: catalog full ({}/{})",
                self.dungeons.len(),
                self.limit
            );
            return false;
        }
        info!(
            "Dungeon [{}] created ({} player slots)",
            name,
            dungeon.capacity()
        );
        self.dungeons.insert(name.to_string(), dungeon);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Dungeon> {
        self.dungeons.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Dungeon> {
        self.dungeons.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.dungeons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dungeons.is_empty()
    }

    /// (name, current players, capacity) for every instance, for listings.
    pub fn roster_counts(&self) -> Vec<(String, usize, usize)> {
        self.dungeons
            .iter()
            .map(|(name, d)| (name.clone(), d.player_count(), d.capacity()))
            .collect()
    }
}
