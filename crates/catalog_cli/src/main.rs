//! Catalog command-line entry point.
//!
//! # Responsibility
//! - Wire configuration, logging, storage and `CatalogService`.
//! - Expose the service-level operations as subcommands with JSON output.
//!
//! # Invariants
//! - No business rules live here; every operation goes through the service.
//! - Server-fault details go to the log, never to stdout/stderr output.

use catalog_core::db::open_pool;
use catalog_core::{
    init_logging, CatalogConfig, CatalogService, FsImageStore, RepoError, ServiceError,
    SqliteItemRepository,
};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "catalog", version, about = "Item catalog with content-addressed images")]
struct Cli {
    /// SQLite database file (overrides CATALOG_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Image directory (overrides CATALOG_IMAGE_DIR).
    #[arg(long, global = true)]
    images: Option<PathBuf>,

    /// Log level (overrides CATALOG_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit an item with its image.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        /// Path of the image file to upload.
        #[arg(long)]
        image: PathBuf,
    },
    /// List all items.
    List,
    /// List items whose name contains KEYWORD.
    Search { keyword: String },
    /// Show one item by id.
    Get { id: i64 },
    /// Write the image for REFERENCE to a file (placeholder if missing).
    Image {
        reference: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// List all categories.
    Categories,
    /// Print core health and version.
    Ping,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("logging init failed: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, &config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> CatalogConfig {
    let mut config = CatalogConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(images) = cli.images.clone() {
        config.image_dir = images;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    config
}

type FsCatalogService = CatalogService<SqliteItemRepository, FsImageStore>;

fn open_service(config: &CatalogConfig) -> Result<FsCatalogService, String> {
    let repo = open_pool(&config.db_path)
        .map_err(RepoError::from)
        .and_then(SqliteItemRepository::try_new)
        .map_err(|err| {
            error!("event=cli_open module=cli status=error error={err}");
            "database unavailable".to_string()
        })?;
    Ok(CatalogService::new(
        repo,
        FsImageStore::new(config.image_dir.clone()),
    ))
}

fn run(command: Command, config: &CatalogConfig) -> Result<String, String> {
    let value = match command {
        Command::Ping => serde_json::json!({
            "message": catalog_core::ping(),
            "version": catalog_core::core_version(),
        }),
        Command::Add {
            name,
            category,
            image,
        } => {
            let bytes = std::fs::read(&image)
                .map_err(|err| format!("cannot read image `{}`: {err}", image.display()))?;
            let id = open_service(config)?
                .submit_item(&name, &category, Some(bytes.as_slice()))
                .map_err(public)?;
            info!("event=cli_add module=cli status=ok item_id={id}");
            serde_json::json!({ "id": id, "message": format!("item received: {name}") })
        }
        Command::List => {
            let items = open_service(config)?.list_items().map_err(public)?;
            serde_json::json!({ "items": items })
        }
        Command::Search { keyword } => {
            let items = open_service(config)?
                .search_items(&keyword)
                .map_err(public)?;
            serde_json::json!({ "items": items })
        }
        Command::Get { id } => {
            let item = open_service(config)?.get_item(id).map_err(public)?;
            serde_json::to_value(item).map_err(|err| err.to_string())?
        }
        Command::Image { reference, out } => {
            let fetched = open_service(config)?
                .get_image(&reference)
                .map_err(public)?;
            std::fs::write(&out, &fetched.bytes)
                .map_err(|err| format!("cannot write `{}`: {err}", out.display()))?;
            serde_json::json!({
                "path": out.display().to_string(),
                "bytes": fetched.bytes.len(),
                "placeholder": fetched.placeholder,
            })
        }
        Command::Categories => {
            let categories = open_service(config)?.list_categories().map_err(public)?;
            serde_json::json!({ "categories": categories })
        }
    };

    Ok(value.to_string())
}

fn public(err: ServiceError) -> String {
    err.public_message()
}
