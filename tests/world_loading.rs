//! World descriptor loading through the real file path.

mod common;

use mudkeep::world::load_world;

#[tokio::test]
async fn loads_fixture_world_from_files() {
    let (config, _tmp) = common::world_fixture();
    let world = load_world(
        config.world.edges_path(),
        config.world.messages_path(),
        config.world.items_path(),
    )
    .await
    .expect("world should load");

    assert_eq!(world.start_location(), "start");
    assert_eq!(world.location_count(), 3);
    assert!(world.item_exists("hall", "coin").unwrap());
    assert!(world.item_exists("vault", "lamp").unwrap());
    assert!(world.item_exists("vault", "rope").unwrap());
    assert!(!world.item_exists("start", "coin").unwrap());
}

#[tokio::test]
async fn missing_descriptor_file_is_an_error() {
    let (config, tmp) = common::world_fixture();
    let missing = tmp.path().join("nope.edg");
    let result = load_world(
        &missing,
        config.world.messages_path(),
        config.world.items_path(),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn malformed_lines_do_not_poison_the_rest() {
    let (mut config, tmp) = common::world_fixture();
    let edges = tmp.path().join("broken.edg");
    std::fs::write(&edges, "start\nstart north hall a dim hall\nhall\n").unwrap();
    config.world.edges_file = edges.to_string_lossy().into_owned();

    let world = load_world(
        config.world.edges_path(),
        config.world.messages_path(),
        config.world.items_path(),
    )
    .await
    .expect("world should load");
    assert!(world.contains("hall"));
    let look = world.describe("start").unwrap();
    assert!(look.contains("To the north there is a dim hall"));
}
