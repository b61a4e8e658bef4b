//! bookstore-rs server entry point.

use bookstore_rs::{
    config::{Cli, Command, Config},
    db::{BookPayload, Database},
    server,
};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    // Handle command
    match cli.command {
        Some(Command::Init { force }) => cmd_init(force).await,
        Some(Command::Seed { file }) => cmd_seed(&file, &config).await,
        Some(Command::Serve { bind }) => cmd_serve(config, bind).await,
        None => {
            // Default: start server
            cmd_serve(config, None).await
        }
    }
}

/// Initialize config and database.
async fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    // Write default config
    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    // Initialize database
    let config = Config::default();
    let _db = Database::open(&config.database.path)?;
    println!("Initialized database: {}", config.database.path.display());

    println!("\nEdit config.toml to configure your store.");
    println!("Then run: bookstore-rs seed books.json");
    println!("And: bookstore-rs serve");

    Ok(())
}

/// Load books into the catalog from a JSON payload file.
async fn cmd_seed(file: &PathBuf, config: &Config) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)?;

    let content = std::fs::read_to_string(file)?;
    let payloads: Vec<BookPayload> = serde_json::from_str(&content)?;

    let mut inserted = 0usize;
    for payload in &payloads {
        if let Err(e) = payload.validate() {
            println!("Skipping '{}': {}", payload.title, e);
            continue;
        }

        db.create_book(payload)?;
        inserted += 1;
    }

    println!(
        "Seeded {} of {} books into {}",
        inserted,
        payloads.len(),
        config.database.path.display()
    );

    Ok(())
}

/// Start the server.
async fn cmd_serve(mut config: Config, bind: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    // Override bind address if specified
    if let Some(addr) = bind {
        config.server.bind = addr;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookstore_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Open database
    let db = Database::open(&config.database.path)?;

    tracing::info!(
        bind = %config.server.bind,
        database = %config.database.path.display(),
        "Starting bookstore-rs server"
    );

    if let Some(dir) = &config.server.static_dir
        && !dir.is_dir()
    {
        tracing::warn!(
            dir = %dir.display(),
            "Static directory does not exist, serving status page only"
        );
        config.server.static_dir = None;
    }

    // Create application state and router
    let state = server::AppState::new(config.clone(), db);
    let app = server::create_router(state);

    // Start server
    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(address = %config.server.bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
