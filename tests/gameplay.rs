//! Movement, looking, and item pickup through the remote-operation surface.

mod common;

use mudkeep::server::MudServer;
use tempfile::TempDir;

async fn server_with_player() -> (MudServer, &'static str, TempDir) {
    let (config, tmp) = common::world_fixture();
    let server = MudServer::new(config);
    server.player_log_in("u1").await;
    server.create_dungeon("a", 2, "u1").await.unwrap();
    server.join_dungeon("u1", "a").await.unwrap();
    let start = server.set_start_location("u1").await.unwrap();
    assert_eq!(start, "start");
    (server, "u1", tmp)
}

#[tokio::test]
async fn move_along_edges_and_back() {
    let (server, u, _tmp) = server_with_player().await;
    assert_eq!(server.player_move(u, "north").await.unwrap(), "hall");
    assert_eq!(server.player_move(u, "north").await.unwrap(), "vault");
    assert_eq!(server.player_move(u, "south").await.unwrap(), "hall");
}

#[tokio::test]
async fn move_without_route_stays_put() {
    let (server, u, _tmp) = server_with_player().await;
    // no westward edge from start
    assert_eq!(server.player_move(u, "west").await.unwrap(), "start");
    let look = server.location_info(u).await.unwrap();
    assert!(look.contains("A bare stone chamber."));
    assert!(look.contains("u1"));
}

#[tokio::test]
async fn look_shows_exits_and_occupants() {
    let (server, u, _tmp) = server_with_player().await;
    server.player_move(u, "north").await.unwrap();
    let look = server.location_info(u).await.unwrap();
    assert!(look.contains("A long, dim hall."));
    assert!(look.contains("To the north there is a heavy iron door"));
    assert!(look.contains("coin"));
    assert!(look.contains("u1"));
}

#[tokio::test]
async fn pickup_removes_item_from_world_exactly_once() {
    let (server, u, _tmp) = server_with_player().await;
    server.player_move(u, "north").await.unwrap();

    assert!(server.item_exists(u, "coin").await.unwrap());
    assert!(server.item_picked_up(u, "coin").await.unwrap());

    // gone from the location, and not duplicated back by leaving
    assert!(!server.item_exists(u, "coin").await.unwrap());
    let look = server.location_info(u).await.unwrap();
    assert!(!look.contains("coin"));
    server.player_force_shutdown(u).await.unwrap();
    let dump = server.display_dungeon("a").await.unwrap();
    assert!(!dump.contains("coin"));
}

#[tokio::test]
async fn a_taken_item_cannot_be_taken_again() {
    let (server, u, _tmp) = server_with_player().await;
    server.player_log_in("u2").await;
    server.join_dungeon("u2", "a").await.unwrap();
    server.set_start_location("u2").await.unwrap();
    server.player_move(u, "north").await.unwrap();
    server.player_move("u2", "north").await.unwrap();

    assert!(server.item_picked_up(u, "coin").await.unwrap());
    assert!(!server.item_picked_up("u2", "coin").await.unwrap());
    assert!(!server.item_exists("u2", "coin").await.unwrap());
}

#[tokio::test]
async fn players_are_never_pickable_items() {
    let (server, u, _tmp) = server_with_player().await;
    server.player_log_in("u2").await;
    server.join_dungeon("u2", "a").await.unwrap();
    server.set_start_location("u2").await.unwrap();

    // both players stand at start; a fellow player is not an item
    assert!(!server.item_exists(u, "u2").await.unwrap());
    assert!(server.is_user(u, "u2").await.unwrap());
}

#[tokio::test]
async fn display_dump_includes_limits_and_start() {
    let (server, _u, _tmp) = server_with_player().await;
    let dump = server.display_dungeon("a").await.unwrap();
    assert!(dump.contains("Start location = start"));
    assert!(dump.contains("Maximum number of players: 2"));
    assert!(dump.contains("Node: vault"));
}

#[tokio::test]
async fn who_lists_the_dungeon_roster() {
    let (server, u, _tmp) = server_with_player().await;
    server.player_log_in("u2").await;
    server.join_dungeon("u2", "a").await.unwrap();
    let who = server.who(u).await.unwrap();
    assert!(who.contains("[u1]"));
    assert!(who.contains("[u2]"));
}
