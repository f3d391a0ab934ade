//! World descriptor parsing.
//!
//! A world is described by three independent text files:
//!
//! - edges:    `source direction destination view-words...`
//! - messages: `location description-words...` (first well-formed line names
//!   the start location)
//! - items:    `location item1 item2 ...`
//!
//! Lines with fewer than the minimum token count are skipped with a warning;
//! a malformed descriptor is never fatal. Referencing a location before it is
//! defined creates it empty, which is the only point where implicit creation
//! is allowed.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use super::graph::WorldGraph;
use super::types::Occupant;

/// Parse the three descriptors from in-memory text and build the graph.
pub fn build_world(edges: &str, messages: &str, items: &str) -> WorldGraph {
    let mut graph = WorldGraph::new();
    parse_edges(&mut graph, edges);
    parse_messages(&mut graph, messages);
    parse_items(&mut graph, items);
    graph
}

/// Read the three descriptor files and build the graph.
pub async fn load_world(edges: &Path, messages: &Path, items: &Path) -> Result<WorldGraph> {
    let edges_text = tokio::fs::read_to_string(edges)
        .await
        .with_context(|| format!("reading edge descriptor {}", edges.display()))?;
    let messages_text = tokio::fs::read_to_string(messages)
        .await
        .with_context(|| format!("reading message descriptor {}", messages.display()))?;
    let items_text = tokio::fs::read_to_string(items)
        .await
        .with_context(|| format!("reading item descriptor {}", items.display()))?;
    let graph = build_world(&edges_text, &messages_text, &items_text);
    info!(
        "World loaded: {} locations, start = [{}]",
        graph.location_count(),
        graph.start_location()
    );
    Ok(graph)
}

fn parse_edges(graph: &mut WorldGraph, text: &str) {
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 3 {
            warn!("Skipping ill-formatted edge line: {}", line);
            continue;
        }
        let view = tokens[3..].join(" ");
        graph.add_edge(tokens[0], tokens[1], tokens[2], &view);
    }
}

fn parse_messages(graph: &mut WorldGraph, text: &str) {
    let mut first = true;
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 2 {
            warn!("Skipping ill-formatted message line: {}", line);
            continue;
        }
        let description = tokens[1..].join(" ");
        graph.set_description(tokens[0], &description);
        if first {
            graph.set_start(tokens[0]);
            first = false;
        }
    }
}

fn parse_items(graph: &mut WorldGraph, text: &str) {
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 2 {
            warn!("Skipping ill-formatted item line: {}", line);
            continue;
        }
        for item in &tokens[1..] {
            // Idempotent; a location listed twice keeps one copy per item.
            let _ = graph.add_occupant(tokens[0], Occupant::Item(item.to_string()));
        }
    }
}

/// Starter edge descriptor written by `mudkeep init`.
pub const STARTER_EDGES: &str = "\
entrance north hallway a torch-lit hallway
hallway south entrance the dungeon entrance
hallway north armoury a cluttered armoury
hallway east cells a row of iron-barred cells
armoury south hallway the torch-lit hallway
cells west hallway the torch-lit hallway
";

/// Starter message descriptor written by `mudkeep init`.
pub const STARTER_MESSAGES: &str = "\
entrance You stand at the mouth of the dungeon. Cold air drifts up from below.
hallway Torches gutter along the walls of a narrow hallway.
armoury Racks of rusted weapons line the walls.
cells Empty cells stretch into the dark.
";

/// Starter item descriptor written by `mudkeep init`.
pub const STARTER_ITEMS: &str = "\
entrance torch
armoury sword shield
cells key
";
