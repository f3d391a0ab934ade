//! Connected-player accounting: the active set and the waiting queue.

use std::collections::VecDeque;

use log::{info, warn};

/// Per-username login state machine: unregistered → waiting → active →
/// removed.
///
/// A username is unique among currently connected sessions only; once logged
/// out the name is free again. When a slot frees, nobody is promoted from
/// the queue: each waiter re-polls `login` and the first poll to observe the
/// free slot wins, regardless of queue position.
#[derive(Debug)]
pub struct SessionRegistry {
    active: Vec<String>,
    waiting: VecDeque<String>,
    limit: usize,
}

impl SessionRegistry {
    pub fn new(limit: usize) -> Self {
        SessionRegistry {
            active: Vec::new(),
            waiting: VecDeque::new(),
            limit,
        }
    }

    pub fn is_active(&self, username: &str) -> bool {
        self.active.iter().any(|u| u == username)
    }

    pub fn is_waiting(&self, username: &str) -> bool {
        self.waiting.iter().any(|u| u == username)
    }

    pub fn is_full(&self) -> bool {
        self.active.len() >= self.limit
    }

    /// Try to log a username in. An already-active name is refused outright:
    /// the active set never holds duplicates. Below the limit: the name
    /// leaves the waiting queue if it was there, joins the active set, and
    /// `true` is returned. At the limit: the name joins the waiting queue
    /// (once) and `false` is returned.
    pub fn login(&mut self, username: &str) -> bool {
        if self.is_active(username) {
            warn!("User [{}] is already logged in; refusing duplicate", username);
            return false;
        }
        if self.active.len() < self.limit {
            self.waiting.retain(|u| u != username);
            self.active.push(username.to_string());
            info!(
                "User [{}] has joined the server. Capacity {}/{} ({} waiting)",
                username,
                self.active.len(),
                self.limit,
                self.waiting.len()
            );
            true
        } else {
            if !self.is_waiting(username) {
                self.waiting.push_back(username.to_string());
                info!(
                    "User [{}] attempted to join a full server; {} now waiting",
                    username,
                    self.waiting.len()
                );
            }
            false
        }
    }

    /// Remove a username from both the active set and the waiting queue.
    /// Idempotent.
    pub fn logout(&mut self, username: &str) {
        let was_active = self.is_active(username);
        self.active.retain(|u| u != username);
        self.waiting.retain(|u| u != username);
        if was_active {
            info!(
                "User [{}] has left the server. Capacity {}/{}",
                username,
                self.active.len(),
                self.limit
            );
        }
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }
}
