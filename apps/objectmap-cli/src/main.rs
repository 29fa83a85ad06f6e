use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use objectmap_common::{ClientId, ItemRef, MapId, ObjectMetadata, OwnerId, Position};
use objectmap_kernel::{
    InventoryLedger, ObjectRegistry, PlaceOptions, PlaceRequest, PlacementInfo,
    StaticItemCatalog, WorldConfig,
};
use objectmap_persist::{Snapshot, SnapshotStore};
use objectmap_sync::{ClientMessage, ClientSync, Outbox, Recipient, SyncOptions};

#[derive(Parser)]
#[command(name = "objectmap-cli", about = "CLI tool for the static object registry")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML world config (registry settings and item catalog)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and registry settings
    Info,
    /// Run a placement, sync and removal scenario
    Demo {
        /// Save the resulting registry into this snapshot store
        #[arg(short, long)]
        store: Option<PathBuf>,
    },
    /// Summarise a saved snapshot
    Inspect {
        /// Snapshot store directory
        store: PathBuf,
    },
    /// Check a saved snapshot's checksum and structure
    Verify {
        /// Snapshot store directory
        store: PathBuf,
    },
    /// Restore a saved snapshot and run an area query
    Query {
        /// Snapshot store directory
        store: PathBuf,
        #[arg(short, long)]
        map: String,
        #[arg(short = 'x', long, allow_hyphen_values = true)]
        x: f32,
        #[arg(short = 'y', long, allow_hyphen_values = true)]
        y: f32,
        #[arg(short = 'W', long, default_value = "32")]
        width: f32,
        #[arg(short = 'H', long, default_value = "32")]
        height: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(
        tile_size = config.registry.tile_size,
        chunk_tiles = config.registry.chunk_tiles,
        items = config.items.len(),
        "using world config"
    );

    match cli.command {
        Commands::Info => {
            println!("objectmap-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "registry: tile_size={} chunk_tiles={} chunk_size={}",
                config.registry.tile_size,
                config.registry.chunk_tiles,
                config.registry.chunk_size()
            );
            println!(
                "default footprint: {}x{} tiles",
                config.registry.default_footprint.width, config.registry.default_footprint.height
            );
            println!("catalog: {} item types", config.items.len());
        }
        Commands::Demo { store } => run_demo(&config, store.as_deref())?,
        Commands::Inspect { store } => {
            let snapshot = open_store(&store)?.load()?;
            let registry = restore(&config, &snapshot)?;
            println!("{}", registry.stats());
            for map_id in registry.map_ids() {
                let chunks = registry
                    .chunk_index(map_id)
                    .map(|index| index.chunk_count())
                    .unwrap_or_default();
                println!(
                    "  {map_id}: objects={} chunks={chunks}",
                    registry.objects_for_map(map_id).len()
                );
            }
            println!("sha256: {}", snapshot.content_hash()?);
        }
        Commands::Verify { store } => {
            let store = open_store(&store)?;
            store.verify_integrity()?;
            let snapshot = store.load()?;
            println!("OK: {} objects on {} maps", snapshot.object_count(), snapshot.maps.len());
        }
        Commands::Query {
            store,
            map,
            x,
            y,
            width,
            height,
        } => {
            let snapshot = open_store(&store)?.load()?;
            let registry = restore(&config, &snapshot)?;
            let map_id = MapId::new(map);
            let hits = registry.objects_in_area(&map_id, Position::new(x, y), width, height);
            println!(
                "{} objects near ({x}, {y}) {width}x{height} on {map_id}",
                hits.len()
            );
            for object in hits {
                println!(
                    "  {} {} at ({}, {}) owner={}",
                    object.id,
                    object.item.item_type,
                    object.position.x,
                    object.position.y,
                    object.owner_id
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WorldConfig> {
    match path {
        Some(path) => WorldConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(WorldConfig::default()),
    }
}

fn open_store(path: &Path) -> anyhow::Result<SnapshotStore> {
    SnapshotStore::open(path).with_context(|| format!("opening store {}", path.display()))
}

/// Catalog from config, or a small built-in one when the config lists no items.
fn catalog(config: &WorldConfig) -> StaticItemCatalog {
    if !config.items.is_empty() {
        return config.catalog();
    }
    StaticItemCatalog::new()
        .with_item("wall", PlacementInfo::blocking(1, 1))
        .with_item("workshop", PlacementInfo::blocking(4, 3))
        .with_item("storage-pile", PlacementInfo::passable(1, 1))
        .with_item("ore", PlacementInfo::passable(1, 1))
        .with_item("torch", PlacementInfo::passable(1, 1))
}

fn registry(config: &WorldConfig) -> anyhow::Result<ObjectRegistry> {
    Ok(ObjectRegistry::with_config(config.registry, Arc::new(catalog(config)))?)
}

fn restore(config: &WorldConfig, snapshot: &Snapshot) -> anyhow::Result<ObjectRegistry> {
    let mut registry = registry(config)?;
    snapshot.restore_into(&mut registry)?;
    Ok(registry)
}

fn run_demo(config: &WorldConfig, store: Option<&Path>) -> anyhow::Result<()> {
    const ALICE: ClientId = ClientId(1);
    const BOB: ClientId = ClientId(2);
    let town = MapId::from("town");

    let mut sync = ClientSync::new(registry(config)?, Outbox::new(), InventoryLedger::new());
    tracing::info!(map = %town, "running demo scenario");
    sync.enter_map(ALICE, town.clone(), SyncOptions::default());

    let place = |sync: &mut ClientSync<Outbox, InventoryLedger>, request: PlaceRequest| {
        sync.place_object(OwnerId::from("alice"), request, ALICE, PlaceOptions::default())
    };

    let workshop = place(
        &mut sync,
        PlaceRequest::new("town", ItemRef::new("ws-1", "workshop"), Position::new(64.0, 64.0))
            .with_metadata(ObjectMetadata::building("workshop", "workshop-1")),
    );
    let pile = place(
        &mut sync,
        PlaceRequest::new(
            "town",
            ItemRef::new("pile-1", "storage-pile"),
            Position::new(96.0, 96.0),
        )
        .with_metadata(ObjectMetadata::storage_pile("workshop-1")),
    );
    let wall = place(
        &mut sync,
        PlaceRequest::new("town", ItemRef::new("wall-1", "wall"), Position::new(96.0, 64.0)),
    );
    let ore = place(
        &mut sync,
        PlaceRequest::new("town", ItemRef::new("ore-1", "ore"), Position::new(600.0, 32.0))
            .with_metadata(ObjectMetadata::resource_node()),
    );
    let torch = place(
        &mut sync,
        PlaceRequest::new("town", ItemRef::new("torch-1", "torch"), Position::new(0.0, 0.0)),
    );
    println!(
        "placed: workshop={} pile={} wall={} ore={} torch={}",
        workshop.is_some(),
        pile.is_some(),
        wall.is_some(),
        ore.is_some(),
        torch.is_some()
    );

    sync.handle(
        BOB,
        ClientMessage::PlayerJoinedMap {
            map_id: town.clone(),
        },
    );
    println!(
        "bob received {} objects on join",
        sync.transport().sent_to(&Recipient::Client(BOB)).count()
    );

    if let Some(torch) = &torch {
        sync.handle(ALICE, ClientMessage::RemoveObject { object_id: torch.id });
        println!(
            "alice picked up torch: inventory={}",
            sync.inventory().items_for(ALICE).count()
        );
    }

    println!(
        "broadcasts to {town}: {}",
        sync.transport().sent_to(&Recipient::Map(town.clone())).count()
    );
    println!("{}", sync.registry().stats());

    if let Some(path) = store {
        let snapshot = Snapshot::capture(sync.registry());
        open_store(path)?.save(&snapshot)?;
        println!("saved {} objects to {}", snapshot.object_count(), path.display());
    }
    Ok(())
}
