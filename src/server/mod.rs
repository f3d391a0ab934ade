//! # MUD Server - Core Application Controller
//!
//! The `MudServer` owns all shared mutable state: the session registry
//! (connected players and the waiting queue), the dungeon catalog, and the
//! per-player dungeon/location directory. Client connections are thin
//! tasks that drive the server through the remote-operation surface below;
//! every invariant lives here, none in the transport.
//!
//! ## Serialization discipline
//!
//! Dungeon-mutating operations (join, set-start-location, move, look,
//! item-exists, item-pickup, display) all funnel through one global
//! `tokio::sync::Mutex` acquired with a finite wait: the gate. This keeps
//! the one-at-a-time critical section the design calls for, across all
//! dungeons, while an exhausted wait surfaces as [`MudError::GateTimeout`]
//! instead of spinning forever. Login and logout use the registry's own
//! lock and never touch the gate.
//!
//! Operations are keyed by plain username strings; the server never holds a
//! handle into a client.

pub mod catalog;
pub mod registry;
pub mod session;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{timeout, Duration};

use crate::config::Config;
use crate::world::{load_world, Dungeon, MudError, Occupant, WorldGraph};
use catalog::DungeonCatalog;
use registry::SessionRegistry;
use session::ClientSession;

/// Where a logged-in player currently is, as tracked by the server.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub dungeon: String,
    pub location: Option<String>,
}

/// Everything behind the gate: the catalog and the player directory that
/// must stay consistent with dungeon rosters.
#[derive(Debug)]
struct WorldState {
    catalog: DungeonCatalog,
    players: HashMap<String, PlayerState>,
}

pub struct MudServer {
    config: Config,
    registry: Mutex<SessionRegistry>,
    state: Mutex<WorldState>,
    gate_wait: Duration,
}

impl MudServer {
    pub fn new(config: Config) -> Self {
        let registry = SessionRegistry::new(config.server.max_players as usize);
        let catalog = DungeonCatalog::new(config.server.max_dungeons as usize);
        let gate_wait = Duration::from_millis(config.timing.gate_wait_ms);
        MudServer {
            config,
            registry: Mutex::new(registry),
            state: Mutex::new(WorldState {
                catalog,
                players: HashMap::new(),
            }),
            gate_wait,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Acquire the global gate, giving up after the configured wait.
    async fn gate(&self) -> Result<MutexGuard<'_, WorldState>, MudError> {
        timeout(self.gate_wait, self.state.lock())
            .await
            .map_err(|_| MudError::GateTimeout)
    }

    // ---- session registry operations (outside the gate) ----

    pub async fn is_server_full(&self) -> bool {
        self.registry.lock().await.is_full()
    }

    pub async fn player_exists(&self, username: &str) -> bool {
        self.registry.lock().await.is_active(username)
    }

    pub async fn player_log_in(&self, username: &str) -> bool {
        self.registry.lock().await.login(username)
    }

    pub async fn player_disconnect(&self, username: &str) {
        self.registry.lock().await.logout(username);
    }

    pub async fn list_players(&self) -> String {
        let registry = self.registry.lock().await;
        let mut out = String::from("|List of online players:");
        for user in registry.active() {
            let _ = write!(out, "\n  -> [{}]", user);
        }
        out
    }

    // ---- catalog queries (brief lock, no gate wait) ----

    pub async fn dungeon_exists(&self, name: &str) -> bool {
        self.state.lock().await.catalog.exists(name)
    }

    /// True when no slot remains for another dungeon instance.
    pub async fn catalog_full(&self) -> bool {
        self.state.lock().await.catalog.is_full()
    }

    /// Render the dungeon listing. With `embedded` the header is omitted,
    /// for inclusion in the main menu.
    pub async fn list_dungeons(&self, embedded: bool) -> String {
        let state = self.state.lock().await;
        let mut out = if embedded {
            String::new()
        } else {
            String::from("|List of currently active dungeons:")
        };
        if state.catalog.is_empty() {
            out.push_str("\n  *No dungeons active.");
            return out;
        }
        let mut counts = state.catalog.roster_counts();
        counts.sort();
        for (name, current, max) in counts {
            let _ = write!(out, "\n  -> {} ({}/{})", name, current, max);
        }
        out
    }

    pub async fn menu(&self) -> String {
        let mut msg = String::from("|Main Menu|\n");
        let _ = writeln!(
            msg,
            "|Currently connected to server -> {}",
            self.config.server.name
        );
        msg.push_str("|Create a new dungeon -> /create <name>\n");
        msg.push_str("|Join a dungeon -> /join <name>\n");
        msg.push_str("|Exit server -> /disconnect\n");
        msg.push_str("|List of currently active dungeons:");
        msg.push_str(&self.list_dungeons(true).await);
        msg
    }

    /// A fresh, all-empty fixed-size inventory for a player entering play.
    pub fn new_inventory(&self) -> Vec<Option<String>> {
        vec![None; self.config.server.inventory_slots as usize]
    }

    // ---- dungeon lifecycle ----

    /// Create a dungeon instance from the configured world descriptors.
    /// Fails (no catalog mutation) on a duplicate name or a full catalog.
    /// Unreadable descriptor files yield an empty world, not a failure.
    /// Capacity is raised to at least 1: with no teardown path, a
    /// zero-capacity instance would hold its catalog slot forever without
    /// ever admitting a player.
    pub async fn create_dungeon(&self, name: &str, capacity: usize, creator: &str) -> Result<bool, MudError> {
        let capacity = capacity.max(1);
        let world = match load_world(
            self.config.world.edges_path(),
            self.config.world.messages_path(),
            self.config.world.items_path(),
        )
        .await
        {
            Ok(world) => world,
            Err(e) => {
                warn!("World descriptors unreadable, creating empty world: {e:#}");
                WorldGraph::new()
            }
        };
        let mut state = self.gate().await?;
        let created = state.catalog.create(name, Dungeon::new(world, capacity));
        if created {
            info!("User [{}] has created a dungeon named [{}]", creator, name);
        } else {
            warn!("User [{}] failed to create dungeon [{}]", creator, name);
        }
        Ok(created)
    }

    // ---- gate-protected gameplay operations ----

    pub async fn join_dungeon(&self, username: &str, name: &str) -> Result<bool, MudError> {
        let mut state = self.gate().await?;
        let dungeon = state
            .catalog
            .get_mut(name)
            .ok_or_else(|| MudError::UnknownDungeon(name.to_string()))?;
        if dungeon.join(username) {
            info!(
                "User [{}] has joined dungeon [{}] ({}/{})",
                username,
                name,
                dungeon.player_count(),
                dungeon.capacity()
            );
            state.players.insert(
                username.to_string(),
                PlayerState {
                    dungeon: name.to_string(),
                    location: None,
                },
            );
            Ok(true)
        } else {
            warn!(
                "User [{}] attempted to join dungeon [{}] ({}/{})",
                username,
                name,
                dungeon.player_count(),
                dungeon.capacity()
            );
            Ok(false)
        }
    }

    /// Place the player at their dungeon's start location and return its
    /// name.
    pub async fn set_start_location(&self, username: &str) -> Result<String, MudError> {
        let mut state = self.gate().await?;
        let dungeon_name = state.player(username)?.dungeon.clone();
        let dungeon = state
            .catalog
            .get_mut(&dungeon_name)
            .ok_or(MudError::UnknownDungeon(dungeon_name))?;
        let start = dungeon.enter_at_start(username)?;
        state.player_mut(username)?.location = Some(start.clone());
        Ok(start)
    }

    /// Move the player. With no route in that direction the unchanged
    /// location name comes back and nothing moves.
    pub async fn player_move(&self, username: &str, direction: &str) -> Result<String, MudError> {
        let mut state = self.gate().await?;
        let (dungeon_name, location) = state.position(username)?;
        let dungeon = state
            .catalog
            .get_mut(&dungeon_name)
            .ok_or(MudError::UnknownDungeon(dungeon_name))?;
        let occupant = Occupant::Player(username.to_string());
        let dest = dungeon
            .world_mut()
            .move_occupant(&location, direction, &occupant)?;
        state.player_mut(username)?.location = Some(dest.clone());
        Ok(dest)
    }

    /// Describe the player's current location.
    pub async fn location_info(&self, username: &str) -> Result<String, MudError> {
        let state = self.gate().await?;
        let (dungeon_name, location) = state.position(username)?;
        let dungeon = state
            .catalog
            .get(&dungeon_name)
            .ok_or(MudError::UnknownDungeon(dungeon_name))?;
        dungeon.world().describe(&location)
    }

    /// True when an item (never a player) named `item` sits at the
    /// player's location.
    pub async fn item_exists(&self, username: &str, item: &str) -> Result<bool, MudError> {
        let state = self.gate().await?;
        let (dungeon_name, location) = state.position(username)?;
        let dungeon = state
            .catalog
            .get(&dungeon_name)
            .ok_or(MudError::UnknownDungeon(dungeon_name))?;
        dungeon.world().item_exists(&location, item)
    }

    /// Check for and remove an item at the player's location in one gate
    /// acquisition. Returns whether the item was still there; `false` means
    /// another player took it first.
    pub async fn item_picked_up(&self, username: &str, item: &str) -> Result<bool, MudError> {
        let mut state = self.gate().await?;
        let (dungeon_name, location) = state.position(username)?;
        let dungeon = state
            .catalog
            .get_mut(&dungeon_name)
            .ok_or_else(|| MudError::UnknownDungeon(dungeon_name.clone()))?;
        let taken = dungeon.world_mut().take_item(&location, item)?;
        if taken {
            info!(
                "User [{}] has picked up a(n) [{}] from location [{}] in dungeon [{}]",
                username, item, location, dungeon_name
            );
        }
        Ok(taken)
    }

    /// True when `candidate` is on the roster of the player's dungeon.
    pub async fn is_user(&self, username: &str, candidate: &str) -> Result<bool, MudError> {
        let state = self.state.lock().await;
        let dungeon_name = state.player(username)?.dungeon.clone();
        let dungeon = state
            .catalog
            .get(&dungeon_name)
            .ok_or(MudError::UnknownDungeon(dungeon_name))?;
        Ok(dungeon.on_roster(candidate))
    }

    /// List the roster of the player's current dungeon.
    pub async fn who(&self, username: &str) -> Result<String, MudError> {
        let state = self.state.lock().await;
        let dungeon_name = state.player(username)?.dungeon.clone();
        let dungeon = state
            .catalog
            .get(&dungeon_name)
            .ok_or_else(|| MudError::UnknownDungeon(dungeon_name.clone()))?;
        let mut out = format!("|Adventurers in [{}]:", dungeon_name);
        for player in dungeon.roster() {
            let _ = write!(out, "\n  -> [{}]", player);
        }
        Ok(out)
    }

    /// Remove the player from their dungeon's roster and location and drop
    /// their tracked position. Safe to call for players not in a dungeon.
    pub async fn player_force_shutdown(&self, username: &str) -> Result<(), MudError> {
        let mut state = self.gate().await?;
        if let Some(player) = state.players.remove(username) {
            if let Some(dungeon) = state.catalog.get_mut(&player.dungeon) {
                dungeon.leave(username);
                info!(
                    "User [{}] has left dungeon [{}]. Inventory emptied.",
                    username, player.dungeon
                );
            }
        }
        Ok(())
    }

    /// Full debug dump of one dungeon instance.
    pub async fn display_dungeon(&self, name: &str) -> Result<String, MudError> {
        let state = self.gate().await?;
        let dungeon = state
            .catalog
            .get(name)
            .ok_or_else(|| MudError::UnknownDungeon(name.to_string()))?;
        Ok(dungeon.display())
    }

    // ---- accept loop ----

    /// Bind the listener and serve connections until ctrl-c.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.bind, self.config.server.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("Server [{}] listening on {}", self.config.server.name, addr);
        info!("Maximum number of dungeons: {}", self.config.server.max_dungeons);
        info!("Maximum number of players:  {}", self.config.server.max_players);
        info!("Server is running. . .");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    info!("Connection from {}", peer);
                    let server = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = ClientSession::run(server, stream).await {
                            warn!("Session from {} ended with error: {e:#}", peer);
                        }
                    });
                }
            }
        }
        Ok(())
    }
}

impl WorldState {
    fn player(&self, username: &str) -> Result<&PlayerState, MudError> {
        self.players
            .get(username)
            .ok_or_else(|| MudError::NotInDungeon(username.to_string()))
    }

    fn player_mut(&mut self, username: &str) -> Result<&mut PlayerState, MudError> {
        self.players
            .get_mut(username)
            .ok_or_else(|| MudError::NotInDungeon(username.to_string()))
    }

    /// The player's dungeon and current location, or `NotInDungeon` when
    /// either is missing.
    fn position(&self, username: &str) -> Result<(String, String), MudError> {
        let player = self.player(username)?;
        let location = player
            .location
            .clone()
            .ok_or_else(|| MudError::NotInDungeon(username.to_string()))?;
        Ok((player.dungeon.clone(), location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_server() -> MudServer {
        let mut config = Config::default();
        config.server.max_players = 3;
        config.server.max_dungeons = 2;
        config.timing.gate_wait_ms = 50;
        MudServer::new(config)
    }

    async fn seeded_server() -> MudServer {
        let server = test_server();
        let world = crate::world::build_world(
            "start north hall a dim hall",
            "start a bare room\nhall a long hall",
            "hall coin",
        );
        {
            let mut state = server.state.lock().await;
            state.catalog.create("A", Dungeon::new(world, 2));
        }
        server
    }

    #[tokio::test]
    async fn gate_timeout_is_a_distinct_outcome() {
        let server = seeded_server().await;
        let _held = server.state.lock().await;
        let err = server.join_dungeon("u1", "A").await.unwrap_err();
        assert!(matches!(err, MudError::GateTimeout));
    }

    #[tokio::test]
    async fn join_move_pick_flow() {
        let server = seeded_server().await;
        assert!(server.player_log_in("u1").await);
        assert!(server.join_dungeon("u1", "A").await.unwrap());
        assert_eq!(server.set_start_location("u1").await.unwrap(), "start");
        assert_eq!(server.player_move("u1", "north").await.unwrap(), "hall");
        assert!(server.item_exists("u1", "coin").await.unwrap());
        assert!(server.item_picked_up("u1", "coin").await.unwrap());
        assert!(!server.item_exists("u1", "coin").await.unwrap());
        // no route back east; stays put
        assert_eq!(server.player_move("u1", "east").await.unwrap(), "hall");
    }

    #[tokio::test]
    async fn racing_picks_take_the_item_exactly_once() {
        let server = seeded_server().await;
        server.join_dungeon("u1", "A").await.unwrap();
        server.join_dungeon("u2", "A").await.unwrap();
        server.set_start_location("u1").await.unwrap();
        server.set_start_location("u2").await.unwrap();
        server.player_move("u1", "north").await.unwrap();
        server.player_move("u2", "north").await.unwrap();
        // both checked /look and saw the coin; only one removal wins
        assert!(server.item_picked_up("u1", "coin").await.unwrap());
        assert!(!server.item_picked_up("u2", "coin").await.unwrap());
    }

    #[tokio::test]
    async fn zero_capacity_request_is_raised_to_one() {
        let server = test_server();
        assert!(server.create_dungeon("z", 0, "u1").await.unwrap());
        assert!(server.join_dungeon("u1", "z").await.unwrap());
        assert!(!server.join_dungeon("u2", "z").await.unwrap());
    }

    #[tokio::test]
    async fn gameplay_ops_require_a_dungeon() {
        let server = seeded_server().await;
        assert!(matches!(
            server.player_move("ghost", "north").await.unwrap_err(),
            MudError::NotInDungeon(_)
        ));
        assert!(matches!(
            server.location_info("ghost").await.unwrap_err(),
            MudError::NotInDungeon(_)
        ));
    }

    #[tokio::test]
    async fn force_shutdown_clears_roster_and_position() {
        let server = seeded_server().await;
        server.join_dungeon("u1", "A").await.unwrap();
        server.set_start_location("u1").await.unwrap();
        server.player_force_shutdown("u1").await.unwrap();
        {
            let state = server.state.lock().await;
            assert!(!state.catalog.get("A").unwrap().on_roster("u1"));
            assert!(state.players.get("u1").is_none());
        }
        // idempotent
        server.player_force_shutdown("u1").await.unwrap();
    }

    #[tokio::test]
    async fn is_user_sees_fellow_players() {
        let server = seeded_server().await;
        server.join_dungeon("u1", "A").await.unwrap();
        server.join_dungeon("u2", "A").await.unwrap();
        assert!(server.is_user("u1", "u2").await.unwrap());
        assert!(!server.is_user("u1", "coin").await.unwrap());
    }

    #[tokio::test]
    async fn menu_embeds_dungeon_listing() {
        let server = seeded_server().await;
        let menu = server.menu().await;
        assert!(menu.contains("/create"));
        assert!(menu.contains("A (0/2)"));
        let standalone = server.list_dungeons(false).await;
        assert!(standalone.starts_with("|List of currently active dungeons:"));
    }

    #[tokio::test]
    async fn unknown_dungeon_is_an_error() {
        let server = test_server();
        assert!(matches!(
            server.join_dungeon("u1", "nope").await.unwrap_err(),
            MudError::UnknownDungeon(_)
        ));
        assert!(matches!(
            server.display_dungeon("nope").await.unwrap_err(),
            MudError::UnknownDungeon(_)
        ));
    }
}
