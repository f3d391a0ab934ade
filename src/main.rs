//! Binary entrypoint for the mudkeep CLI.
//!
//! Commands:
//! - `serve [--bind <addr>] [--port <n>]` - run the dungeon server
//! - `init` - create a starter `config.toml` and default world descriptors
//! - `inspect` - parse the configured world files and print the graph dump
//!
//! See the library crate docs for module-level details: `mudkeep::`.
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use mudkeep::config::Config;
use mudkeep::server::MudServer;
use mudkeep::world::{load_world, loader};

#[derive(Parser)]
#[command(name = "mudkeep")]
#[command(about = "A multi-tenant text dungeon server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dungeon server
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Initialize a new server configuration and starter world
    Init,
    /// Parse the configured world descriptors and print the resulting graph
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init which writes it)
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Serve { bind, port } => {
            let mut config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await?,
            };
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            info!("Starting mudkeep v{}", env!("CARGO_PKG_VERSION"));
            let server = Arc::new(MudServer::new(config));
            server.run().await?;
        }
        Commands::Init => {
            info!("Initializing new server configuration");
            let config = Config::default();
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);

            // Starter world descriptors so `serve` works out of the box
            let world_dir = config.world_dir();
            tokio::fs::create_dir_all(&world_dir).await?;
            tokio::fs::write(config.world.edges_path(), loader::STARTER_EDGES).await?;
            tokio::fs::write(config.world.messages_path(), loader::STARTER_MESSAGES).await?;
            tokio::fs::write(config.world.items_path(), loader::STARTER_ITEMS).await?;
            info!("Starter world descriptors created in {}", world_dir.display());
        }
        Commands::Inspect => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await?,
            };
            let world = load_world(
                config.world.edges_path(),
                config.world.messages_path(),
                config.world.items_path(),
            )
            .await?;
            println!("{}", world.summary());
            println!("{} locations", world.location_count());
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level.parse().unwrap_or(log::LevelFilter::Info))
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    if let Some(file) = log_file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // When stdout is a terminal, mirror the file output to the console
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        } else {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
