//! Per-connection command loop.
//!
//! Each accepted connection gets one `ClientSession` task. The session walks
//! a small state machine (registering → at menu → in dungeon → terminated),
//! reads one line per command, and drives the shared [`MudServer`] through
//! its remote-operation surface. The session owns only presentation state:
//! its username, its inventory slots, and a mirror of the player's current
//! dungeon and location for prompts. Everything authoritative lives in the
//! server.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::time::{sleep, Duration, Instant};

use super::MudServer;
use crate::logutil::clean_line;
use crate::world::{Direction, MudError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Registering,
    AtMenu,
    InDungeon,
    Terminated,
}

pub struct ClientSession<S> {
    server: Arc<MudServer>,
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    state: SessionState,
    username: String,
    dungeon: Option<String>,
    location: Option<String>,
    inventory: Vec<Option<String>>,
}

impl<S: AsyncRead + AsyncWrite + Send> ClientSession<S> {
    /// Drive one connection to completion. Cleanup of whatever the session
    /// held (roster slot, location, registry entry) is attempted on every
    /// exit path, including errors and dropped connections.
    pub async fn run(server: Arc<MudServer>, stream: S) -> Result<()> {
        let (read_half, write_half) = tokio::io::split(stream);
        let mut session = ClientSession {
            server,
            reader: BufReader::new(read_half),
            writer: write_half,
            state: SessionState::Connecting,
            username: String::new(),
            dungeon: None,
            location: None,
            inventory: Vec::new(),
        };
        let outcome = session.converse().await;
        session.cleanup().await;
        outcome
    }

    async fn converse(&mut self) -> Result<()> {
        self.state = SessionState::Registering;
        if !self.register().await? {
            self.state = SessionState::Terminated;
            return Ok(());
        }
        if !self.log_in().await? {
            self.state = SessionState::Terminated;
            return Ok(());
        }
        self.inventory = self.server.new_inventory();
        self.state = SessionState::AtMenu;
        let menu = self.server.menu().await;
        self.send(&menu).await?;
        while self.state != SessionState::Terminated {
            match self.state {
                SessionState::AtMenu => self.menu_turn().await?,
                SessionState::InDungeon => self.dungeon_turn().await?,
                _ => break,
            }
        }
        Ok(())
    }

    /// Prompt for usernames until an unused one arrives. Returns false on a
    /// dropped connection.
    async fn register(&mut self) -> Result<bool> {
        loop {
            let Some(raw) = self.prompt("Enter a username: ").await? else {
                return Ok(false);
            };
            // strip outer whitespace, then squeeze out inner spaces
            let name: String = raw.trim().chars().filter(|c| *c != ' ').collect();
            if name.is_empty() {
                self.send("Error, username cannot be empty.").await?;
                continue;
            }
            if self.server.player_exists(&name).await {
                self.send("A user with this name already exists. Choose a different one.")
                    .await?;
                continue;
            }
            self.username = name;
            return Ok(true);
        }
    }

    /// Log in, waiting on a full server by re-polling at a fixed interval.
    /// The wait is capped; an exhausted cap ends the session with its own
    /// message rather than looping forever.
    async fn log_in(&mut self) -> Result<bool> {
        if self.server.player_log_in(&self.username).await {
            self.send(&format!("You have joined the server {}", self.server.config().server.name))
                .await?;
            return Ok(true);
        }
        // two registrations can race past the name check; the registry
        // admits only one of them
        if self.server.player_exists(&self.username).await {
            self.send("A user with this name already exists. Choose a different one.")
                .await?;
            self.username.clear();
            return Ok(false);
        }
        self.send("Server full. You will be added to the waiting list.")
            .await?;
        let poll = Duration::from_secs(self.server.config().timing.login_poll_secs);
        let deadline = Instant::now() + Duration::from_secs(self.server.config().timing.login_wait_cap_secs);
        loop {
            self.send("Waiting for authorization. . .").await?;
            sleep(poll).await;
            if self.server.player_log_in(&self.username).await {
                self.send(&format!("You have joined the server {}", self.server.config().server.name))
                    .await?;
                return Ok(true);
            }
            if Instant::now() >= deadline {
                self.server.player_disconnect(&self.username).await;
                self.send("No slot freed up in time. Disconnecting.").await?;
                warn!("User [{}] gave up waiting for a server slot", self.username);
                return Ok(false);
            }
        }
    }

    async fn menu_turn(&mut self) -> Result<()> {
        let Some(raw) = self.prompt(&format!("{}: ", self.username)).await? else {
            self.state = SessionState::Terminated;
            return Ok(());
        };
        let line = raw.trim().to_lowercase();
        if line.is_empty() {
            return Ok(());
        }
        if !line.starts_with('/') {
            self.send("Error, command must start with '/'.").await?;
            return Ok(());
        }
        debug!("Session [{}] menu command: {}", self.username, clean_line(&line));
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let argument = parts.next();
        match (command, argument) {
            ("/create", Some(name)) => self.create_dungeon(name).await?,
            ("/create", None) => {
                self.send("Error, usage: /create <name>").await?;
            }
            ("/join", Some(name)) => self.join_dungeon(name).await?,
            ("/join", None) => {
                self.send("Error, usage: /join <name>").await?;
            }
            ("/disconnect", _) => {
                self.send("Leaving the server. . .").await?;
                self.state = SessionState::Terminated;
            }
            ("/1", _) => {
                let listing = self.server.list_dungeons(false).await;
                self.send(&listing).await?;
            }
            ("/2", _) => {
                let listing = self.server.list_players().await;
                self.send(&listing).await?;
            }
            ("/menu", _) => {
                let menu = self.server.menu().await;
                self.send(&menu).await?;
            }
            ("/inv", _) => self.show_inventory().await?,
            _ => {
                self.send("Error, command does not exist.").await?;
            }
        }
        Ok(())
    }

    async fn create_dungeon(&mut self, name: &str) -> Result<()> {
        if self.server.dungeon_exists(name).await {
            self.send("Error, a dungeon with that name already exists.").await?;
            return Ok(());
        }
        if self.server.catalog_full().await {
            self.send("Error, maximum number of dungeons created.").await?;
            return Ok(());
        }
        let Some(reply) = self.prompt("Maximum number of players: ").await? else {
            self.state = SessionState::Terminated;
            return Ok(());
        };
        // zero would make the instance unjoinable forever, so it is treated
        // like unparseable input
        let capacity = match reply.trim().parse::<i64>() {
            Ok(n) if n != 0 => n.unsigned_abs() as usize,
            _ => {
                self.send("Error, wrong input. Defaulting to 2.").await?;
                2
            }
        };
        match self.server.create_dungeon(name, capacity, &self.username).await {
            Ok(true) => self.send("Dungeon created.").await?,
            Ok(false) => self.send("Error, could not create the dungeon.").await?,
            Err(e) => self.report(&e).await?,
        }
        let menu = self.server.menu().await;
        self.send(&menu).await?;
        Ok(())
    }

    async fn join_dungeon(&mut self, name: &str) -> Result<()> {
        if !self.server.dungeon_exists(name).await {
            self.send("Error, no instance matches the given name.").await?;
            return Ok(());
        }
        match self.server.join_dungeon(&self.username, name).await {
            Ok(true) => {}
            Ok(false) => {
                self.send("Error, cannot join the specified dungeon instance. Try again later.")
                    .await?;
                return Ok(());
            }
            Err(e) => {
                self.report(&e).await?;
                return Ok(());
            }
        }
        self.send(&format!("You have successfully joined {}", name)).await?;
        self.dungeon = Some(name.to_string());
        self.inventory = self.server.new_inventory();
        self.send(gameplay_help()).await?;
        match self.server.set_start_location(&self.username).await {
            Ok(start) => {
                self.send(&format!("Start location has been set to [{}].", start))
                    .await?;
                self.location = Some(start);
                self.state = SessionState::InDungeon;
            }
            Err(e) => {
                // the join is rolled back so the roster slot is not leaked
                self.report(&e).await?;
                let _ = self.server.player_force_shutdown(&self.username).await;
                self.dungeon = None;
            }
        }
        Ok(())
    }

    async fn dungeon_turn(&mut self) -> Result<()> {
        let Some(raw) = self.prompt(&format!("{}: ", self.username)).await? else {
            self.state = SessionState::Terminated;
            return Ok(());
        };
        let line = raw.trim().to_lowercase();
        if line.is_empty() {
            return Ok(());
        }
        if !line.starts_with('/') {
            self.send("Error, invalid command. Try again.").await?;
            return Ok(());
        }
        debug!("Session [{}] dungeon command: {}", self.username, clean_line(&line));
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let argument = parts.next();
        match (command, argument) {
            ("/help", _) => self.send(gameplay_help()).await?,
            ("/move", Some(dir)) => match Direction::from_str(dir) {
                Ok(direction) => self.player_move(direction).await?,
                Err(()) => self.send("Error, wrong direction.").await?,
            },
            ("/move", None) => self.send("Error, usage: /move <north|east|south|west>").await?,
            ("/look", _) => match self.server.location_info(&self.username).await {
                Ok(info) => self.send(&info).await?,
                Err(e) => self.report(&e).await?,
            },
            ("/display", _) => {
                let name = self.dungeon.clone().unwrap_or_default();
                match self.server.display_dungeon(&name).await {
                    Ok(dump) => self.send(&dump).await?,
                    Err(e) => self.report(&e).await?,
                }
            }
            ("/who", _) => match self.server.who(&self.username).await {
                Ok(listing) => self.send(&listing).await?,
                Err(e) => self.report(&e).await?,
            },
            ("/pick", Some(item)) => self.pick_up(item).await?,
            ("/pick", None) => self.send("Error, usage: /pick <item>").await?,
            ("/inventory", _) | ("/inv", _) => self.show_inventory().await?,
            ("/exit", _) => {
                if let Err(e) = self.server.player_force_shutdown(&self.username).await {
                    self.report(&e).await?;
                }
                let name = self.dungeon.take().unwrap_or_default();
                self.location = None;
                self.inventory = self.server.new_inventory();
                self.send(&format!("You have left the dungeon [{}].", name)).await?;
                self.state = SessionState::AtMenu;
                let menu = self.server.menu().await;
                self.send(&menu).await?;
            }
            _ => self.send("Error, invalid command. Try again.").await?,
        }
        Ok(())
    }

    async fn player_move(&mut self, direction: Direction) -> Result<()> {
        match self.server.player_move(&self.username, direction.as_str()).await {
            Ok(dest) => {
                self.send(&format!("Your new location is [{}].", dest)).await?;
                self.location = Some(dest);
                match self.server.location_info(&self.username).await {
                    Ok(info) => self.send(&info).await?,
                    Err(e) => self.report(&e).await?,
                }
            }
            Err(e) => self.report(&e).await?,
        }
        Ok(())
    }

    /// Pick up an item: it must exist at the player's location (players
    /// never match), and a free inventory slot must remain. The item lands
    /// in the first empty slot.
    async fn pick_up(&mut self, item: &str) -> Result<()> {
        let exists = match self.server.item_exists(&self.username, item).await {
            Ok(b) => b,
            Err(e) => return self.report(&e).await,
        };
        let is_user = match self.server.is_user(&self.username, item).await {
            Ok(b) => b,
            Err(e) => return self.report(&e).await,
        };
        let free_slot = self.inventory.iter().position(|slot| slot.is_none());
        if exists && free_slot.is_some() {
            // the removal re-checks presence under the gate; a false means
            // someone else grabbed it between our look and our pick
            match self.server.item_picked_up(&self.username, item).await {
                Ok(true) => {
                    if let Some(slot) = free_slot {
                        self.inventory[slot] = Some(item.to_string());
                    }
                    self.send(&format!("Item [{}] picked up.", item)).await?;
                }
                Ok(false) => {
                    self.send("Looking around, you cannot seem to find such an item.")
                        .await?;
                }
                Err(e) => return self.report(&e).await,
            }
        } else if free_slot.is_none() {
            self.send("You do not have free space in your inventory.").await?;
        } else if is_user {
            self.send("Fellow adventurers prefer to not be picked up.").await?;
        } else {
            self.send("Looking around, you cannot seem to find such an item.")
                .await?;
        }
        Ok(())
    }

    async fn show_inventory(&mut self) -> Result<()> {
        let rendered: String = self
            .inventory
            .iter()
            .map(|slot| match slot {
                Some(item) => format!("[{}] ", item),
                None => "[ ] ".to_string(),
            })
            .collect();
        self.send(&format!("Inventory: {}", rendered.trim_end())).await?;
        Ok(())
    }

    /// Best-effort teardown on any exit path. Cleanup progresses as far as
    /// it can; a broken connection or a gate timeout leaves the remainder
    /// as-is.
    async fn cleanup(&mut self) {
        if self.username.is_empty() {
            return;
        }
        if self.dungeon.is_some() {
            if let Err(e) = self.server.player_force_shutdown(&self.username).await {
                warn!("Cleanup for [{}] incomplete: {}", self.username, e);
            }
        }
        self.server.player_disconnect(&self.username).await;
        info!("Session for [{}] closed", self.username);
    }

    async fn report(&mut self, err: &MudError) -> Result<()> {
        match err {
            MudError::GateTimeout => {
                self.send("The server is busy. Try again in a moment.").await
            }
            other => self.send(&format!("Error, {}", other)).await,
        }
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Write a prompt and read one line. `None` means the peer hung up.
    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

fn gameplay_help() -> &'static str {
    "\
|HELP|
|If you wish to move
|  Move North:        /move north
|  Move East:         /move east
|  Move South:        /move south
|  Move West:         /move west
|If you wish to interact with the world
|  Look around:       /look
|  Pick an item:      /pick <item>
|  Open inventory:    /inventory
|If you wish to interact with the game
|  Exit the instance: /exit
|  Others in dungeon: /who
|  Help menu:         /help"
}
