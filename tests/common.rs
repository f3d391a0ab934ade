//! Test utilities & fixtures.
//! Builds a temp-dir world (descriptor files) and a config pointing at it.

use mudkeep::config::Config;
use tempfile::TempDir;

pub const FIXTURE_EDGES: &str = "\
start north hall a dim hall
hall south start the starting chamber
hall north vault a heavy iron door
vault south hall the dim hall
";

pub const FIXTURE_MESSAGES: &str = "\
start A bare stone chamber.
hall A long, dim hall.
vault A vault stacked with old crates.
";

pub const FIXTURE_ITEMS: &str = "\
hall coin
vault lamp rope
";

/// Write the fixture world descriptors into a temp dir and return a config
/// wired to them. Limits are small so capacity paths are easy to hit; the
/// gate wait is short so timeout tests stay fast.
pub fn world_fixture() -> (Config, TempDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();

    std::fs::write(root.join("world.edg"), FIXTURE_EDGES).unwrap();
    std::fs::write(root.join("world.msg"), FIXTURE_MESSAGES).unwrap();
    std::fs::write(root.join("world.thg"), FIXTURE_ITEMS).unwrap();

    let mut config = Config::default();
    config.world.edges_file = root.join("world.edg").to_string_lossy().into_owned();
    config.world.messages_file = root.join("world.msg").to_string_lossy().into_owned();
    config.world.items_file = root.join("world.thg").to_string_lossy().into_owned();
    config.server.max_players = 4;
    config.server.max_dungeons = 2;
    config.server.inventory_slots = 3;
    config.timing.gate_wait_ms = 250;
    config.timing.login_poll_secs = 1;
    config.timing.login_wait_cap_secs = 2;
    (config, tmp)
}
