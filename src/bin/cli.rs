//! bmark CLI
//!
//! Save and list bookmarks in a local store file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bmarkdb::db::Database;
use bmarkdb::{BookmarkStore, Config, NewBookmark};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// bmark CLI
#[derive(Parser, Debug)]
#[command(name = "bmark")]
#[command(about = "Save and list bookmarks in a local store file")]
#[command(version)]
struct Args {
    /// Path to the store file
    #[arg(short, long = "db", default_value = "./bookmarks.db")]
    db: PathBuf,

    /// Give up waiting for the file lock after this many milliseconds
    #[arg(long)]
    lock_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save a link
    Save {
        /// The URL to save
        link: String,

        /// Page title
        #[arg(long, default_value = "")]
        title: String,

        /// Site name
        #[arg(long, default_value = "")]
        site_name: String,

        /// Page description
        #[arg(long, default_value = "")]
        description: String,

        /// Preview image URL
        #[arg(long, default_value = "")]
        image_url: String,
    },

    /// List bookmarks, newest first
    List,

    /// Check the store file without modifying it
    Verify,
}

fn main() -> ExitCode {
    // Logs go to stderr so listings stay pipeable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bmarkdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> bmarkdb::Result<()> {
    let mut builder = Config::builder().path(&args.db);
    if let Some(ms) = args.lock_timeout_ms {
        builder = builder.lock_timeout(Duration::from_millis(ms));
    }
    let config = builder.build();

    match args.command {
        Commands::Save {
            link,
            title,
            site_name,
            description,
            image_url,
        } => {
            let bookmark = NewBookmark::new(link)
                .title(title)
                .site_name(site_name)
                .description(description)
                .image_url(image_url);

            let id = BookmarkStore::new(config).save(bookmark)?;
            println!("{}", id);
        }
        Commands::List => {
            for bookmark in BookmarkStore::new(config).list_newest_first()? {
                println!(
                    "{}\t{}\t{}\t{}",
                    bookmark.id, bookmark.link, bookmark.title, bookmark.site_name
                );
            }
        }
        Commands::Verify => {
            let report = Database::verify(&config.path)?;
            println!("commits:   {}", report.commits_replayed);
            println!("last txid: {}", report.last_txid);
            println!("valid len: {}", report.valid_len);
            if report.has_torn_tail() {
                println!("torn tail: {} bytes", report.discarded_bytes);
            }
        }
    }

    Ok(())
}
