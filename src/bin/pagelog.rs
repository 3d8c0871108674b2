//! pagelog CLI
//!
//! Inspect and append to a pagelog write-ahead log.

use clap::{Parser, Subcommand};
use pagelog::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// pagelog WAL tool
#[derive(Parser, Debug)]
#[command(name = "pagelog")]
#[command(about = "Inspect and append to a page-based write-ahead log")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./pagelog_data")]
    data_dir: String,

    /// Page size in bytes
    #[arg(short, long, default_value = "8192")]
    page_size: usize,

    /// WAL file, relative to the data directory
    #[arg(short, long, default_value = "wal/log")]
    wal_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show page size and WAL block layout
    Info,

    /// Append records and flush them
    Append {
        /// Records to append, in order
        #[arg(required = true)]
        records: Vec<String>,
    },

    /// Print records newest first
    Dump {
        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pagelog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("pagelog v{}", pagelog::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .page_size(args.page_size)
        .wal_file(&args.wal_file)
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&engine, args.command) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn run(engine: &Engine, command: Commands) -> pagelog::Result<()> {
    match command {
        Commands::Info => {
            let wal = engine.wal();
            println!("page size:     {}", engine.config().page_size);
            println!("wal file:      {}", wal.log_file());
            println!("wal blocks:    {}", engine.wal_block_count()?);
            println!("current block: {}", wal.current_block().block_num());
            println!("new directory: {}", engine.is_new());
        }
        Commands::Append { records } => {
            let mut last = 0;
            for record in &records {
                last = engine.append(record.as_bytes())?;
                println!("{}", last);
            }
            engine.flush(last)?;
        }
        Commands::Dump { limit } => {
            let iter = engine.iterator()?;
            for (i, record) in iter.take(limit.unwrap_or(usize::MAX)).enumerate() {
                let record = record?;
                println!("{:>6}  {}", i, String::from_utf8_lossy(&record));
            }
        }
    }

    Ok(())
}
