//! The location graph backing a dungeon instance.
//!
//! A world is a directed graph of named locations. Each location carries a
//! description, a direction→exit map (each exit with its own view text), and
//! the occupants currently present. Implicit location creation is confined to
//! build time: the loader may reference a location before it is defined, but
//! gameplay operations on an unknown name return an error instead of creating
//! it.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::errors::MudError;
use super::types::Occupant;

/// A directed, labeled connection to another location.
#[derive(Debug, Clone)]
pub struct Exit {
    /// Name of the destination location.
    pub to: String,
    /// What a player sees when looking down this exit.
    pub view: String,
}

/// A named node in the world graph.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: String,
    pub description: String,
    pub exits: HashMap<String, Exit>,
    occupants: Vec<Occupant>,
}

impl Location {
    fn new(name: &str) -> Self {
        Location {
            name: name.to_string(),
            description: String::new(),
            exits: HashMap::new(),
            occupants: Vec::new(),
        }
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// Render this location the way `/look` presents it: description, one
    /// line per exit, then the visible occupants. Exit iteration order is
    /// not contractual.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str(self.description.trim_end());
        out.push('\n');
        for (direction, exit) in &self.exits {
            let _ = writeln!(out, "To the {} there is {}", direction, exit.view);
        }
        if !self.occupants.is_empty() {
            out.push_str("You can see:");
            for occ in &self.occupants {
                let _ = write!(out, " {}", occ);
            }
            out.push('\n');
        }
        out
    }
}

/// Directed graph of locations plus a distinguished start location.
#[derive(Debug, Clone, Default)]
pub struct WorldGraph {
    locations: HashMap<String, Location>,
    start: String,
}

impl WorldGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build-time only: fetch a location, creating it empty if unseen.
    fn get_or_create(&mut self, name: &str) -> &mut Location {
        self.locations
            .entry(name.to_string())
            .or_insert_with(|| Location::new(name))
    }

    /// Add a directed edge. Declaring the same direction twice from one
    /// source overwrites the earlier exit (last write wins).
    pub fn add_edge(&mut self, source: &str, direction: &str, dest: &str, view: &str) {
        self.get_or_create(dest);
        let src = self.get_or_create(source);
        src.exits.insert(
            direction.to_string(),
            Exit {
                to: dest.to_string(),
                view: view.to_string(),
            },
        );
    }

    /// Build-time only: set (or replace) a location's description text.
    pub fn set_description(&mut self, name: &str, text: &str) {
        self.get_or_create(name).description = text.to_string();
    }

    /// Build-time only: record the start location for joining players.
    pub fn set_start(&mut self, name: &str) {
        self.start = name.to_string();
    }

    pub fn start_location(&self) -> &str {
        &self.start
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    fn location(&self, name: &str) -> Result<&Location, MudError> {
        self.locations
            .get(name)
            .ok_or_else(|| MudError::UnknownLocation(name.to_string()))
    }

    fn location_mut(&mut self, name: &str) -> Result<&mut Location, MudError> {
        self.locations
            .get_mut(name)
            .ok_or_else(|| MudError::UnknownLocation(name.to_string()))
    }

    /// Place an occupant at a location if not already present there.
    pub fn add_occupant(&mut self, loc: &str, occupant: Occupant) -> Result<(), MudError> {
        let location = self.location_mut(loc)?;
        if !location.occupants.contains(&occupant) {
            location.occupants.push(occupant);
        }
        Ok(())
    }

    /// Remove an occupant from a location. Removing an absent occupant is a
    /// no-op.
    pub fn remove_occupant(&mut self, loc: &str, occupant: &Occupant) -> Result<(), MudError> {
        let location = self.location_mut(loc)?;
        location.occupants.retain(|o| o != occupant);
        Ok(())
    }

    /// Remove a player from every location they appear at. Used on leave and
    /// forced shutdown, where the player's tracked location is not trusted.
    pub fn remove_player_everywhere(&mut self, username: &str) {
        let target = Occupant::Player(username.to_string());
        for location in self.locations.values_mut() {
            location.occupants.retain(|o| o != &target);
        }
    }

    /// Move an occupant from `loc` along `direction`. If no exit leads that
    /// way the occupant stays put and the unchanged location name is
    /// returned; this is not an error.
    pub fn move_occupant(
        &mut self,
        loc: &str,
        direction: &str,
        occupant: &Occupant,
    ) -> Result<String, MudError> {
        let dest = match self.location(loc)?.exits.get(direction) {
            Some(exit) => exit.to.clone(),
            None => return Ok(loc.to_string()),
        };
        self.remove_occupant(loc, occupant)?;
        self.add_occupant(&dest, occupant.clone())?;
        Ok(dest)
    }

    /// Remove an item by name from a location, reporting whether it was
    /// still there. A like-named player occupant never matches. One call
    /// does both the check and the removal, so two concurrent pickers can
    /// never both take the same item.
    pub fn take_item(&mut self, loc: &str, id: &str) -> Result<bool, MudError> {
        let location = self.location_mut(loc)?;
        let before = location.occupants.len();
        location
            .occupants
            .retain(|o| o.is_player() || o.name() != id);
        Ok(location.occupants.len() != before)
    }

    pub fn describe(&self, loc: &str) -> Result<String, MudError> {
        Ok(self.location(loc)?.describe())
    }

    /// True only when an *item* named `id` sits at `loc`. Player occupants
    /// never match, whatever they are called.
    pub fn item_exists(&self, loc: &str, id: &str) -> Result<bool, MudError> {
        let location = self.location(loc)?;
        Ok(location
            .occupants
            .iter()
            .any(|o| !o.is_player() && o.name() == id))
    }

    /// Full-world dump used by `/display` and the `inspect` subcommand.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (name, location) in &self.locations {
            let _ = writeln!(out, "Node: {}", name);
            out.push_str(&location.describe());
        }
        let _ = writeln!(out, "Start location = {}", self.start);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> WorldGraph {
        let mut g = WorldGraph::new();
        g.add_edge("start", "north", "hall", "a dim hall");
        g.set_description("start", "A cold stone chamber.");
        g.set_description("hall", "A long hallway.");
        g.set_start("start");
        g
    }

    #[test]
    fn edges_create_both_endpoints() {
        let g = small_world();
        assert!(g.contains("start"));
        assert!(g.contains("hall"));
        assert_eq!(g.location_count(), 2);
    }

    #[test]
    fn duplicate_direction_overwrites() {
        let mut g = small_world();
        g.add_edge("start", "north", "crypt", "a dark crypt");
        let exit = &g.locations["start"].exits["north"];
        assert_eq!(exit.to, "crypt");
        assert_eq!(exit.view, "a dark crypt");
    }

    #[test]
    fn move_with_route_relocates_occupant() {
        let mut g = small_world();
        let p1 = Occupant::Player("p1".into());
        g.add_occupant("start", p1.clone()).unwrap();
        let dest = g.move_occupant("start", "north", &p1).unwrap();
        assert_eq!(dest, "hall");
        assert!(g.locations["start"].occupants.is_empty());
        assert_eq!(g.locations["hall"].occupants, vec![p1]);
    }

    #[test]
    fn move_without_route_is_a_noop() {
        let mut g = small_world();
        let p1 = Occupant::Player("p1".into());
        g.add_occupant("start", p1.clone()).unwrap();
        let dest = g.move_occupant("start", "south", &p1).unwrap();
        assert_eq!(dest, "start");
        assert_eq!(g.locations["start"].occupants, vec![p1]);
        assert!(g.locations["hall"].occupants.is_empty());
    }

    #[test]
    fn move_from_unknown_location_errors() {
        let mut g = small_world();
        let p1 = Occupant::Player("p1".into());
        let err = g.move_occupant("nowhere", "north", &p1).unwrap_err();
        assert!(matches!(err, MudError::UnknownLocation(_)));
    }

    #[test]
    fn add_occupant_is_idempotent() {
        let mut g = small_world();
        let coin = Occupant::Item("coin".into());
        g.add_occupant("start", coin.clone()).unwrap();
        g.add_occupant("start", coin.clone()).unwrap();
        assert_eq!(g.locations["start"].occupants.len(), 1);
    }

    #[test]
    fn item_exists_ignores_players() {
        let mut g = small_world();
        g.add_occupant("start", Occupant::Item("lamp".into())).unwrap();
        g.add_occupant("start", Occupant::Player("lamp".into())).unwrap();
        g.add_occupant("start", Occupant::Player("alice".into())).unwrap();
        assert!(g.item_exists("start", "lamp").unwrap());
        assert!(!g.item_exists("start", "alice").unwrap());
        assert!(!g.item_exists("start", "coin").unwrap());
    }

    #[test]
    fn take_item_yields_the_item_exactly_once() {
        let mut g = small_world();
        g.add_occupant("start", Occupant::Item("coin".into())).unwrap();
        g.add_occupant("start", Occupant::Player("coin".into())).unwrap();
        assert!(g.take_item("start", "coin").unwrap());
        assert!(!g.take_item("start", "coin").unwrap());
        // the like-named player stays put
        assert_eq!(
            g.locations["start"].occupants,
            vec![Occupant::Player("coin".into())]
        );
    }

    #[test]
    fn describe_lists_exits_and_occupants() {
        let mut g = small_world();
        g.add_occupant("start", Occupant::Item("torch".into())).unwrap();
        let text = g.describe("start").unwrap();
        assert!(text.contains("A cold stone chamber."));
        assert!(text.contains("To the north there is a dim hall"));
        assert!(text.contains("You can see: torch"));
    }

    #[test]
    fn remove_player_everywhere_clears_all_copies() {
        let mut g = small_world();
        g.add_occupant("start", Occupant::Player("bob".into())).unwrap();
        g.add_occupant("hall", Occupant::Player("bob".into())).unwrap();
        g.remove_player_everywhere("bob");
        assert!(g.locations["start"].occupants.is_empty());
        assert!(g.locations["hall"].occupants.is_empty());
    }
}
