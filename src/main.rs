mod config;
mod error;
mod library;
mod player;
mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;
use crate::error::Result;
use crate::library::{LibraryCatalog, SeriesEntry};
use crate::player::PlaybackSession;
use crate::player::launcher::CommandLauncher;
use crate::watch::WatchStateStore;

fn setup_logging() {
    // Logs go to stderr; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("shiori=info".parse().unwrap()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn usage() {
    eprintln!("usage: shiori [list | scan | episodes <series> | play <series> [episode] | resume <series>]");
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let config = Config::load()?;
    let root = config.expanded_root();
    let mut catalog = LibraryCatalog::open(&root, config.library.series_file_threshold)?;
    let store = Arc::new(WatchStateStore::open_default()?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("list") => {
            for entry in catalog.list_series()? {
                println!("{}\t{}", entry.name, entry.path.display());
            }
        }
        Some("scan") => {
            let summary = catalog.scan()?;
            println!("Catalogued {} series", summary.catalogued);
            for folder in &summary.skipped {
                println!("Skipped {} (name not detected)", folder);
            }
        }
        Some("episodes") => {
            let Some(name) = args.get(1) else {
                usage();
                return Ok(());
            };
            let Some(entry) = lookup(&mut catalog, name)? else {
                eprintln!("No series named {:?} in the catalog", name);
                return Ok(());
            };
            let episodes = catalog.list_episodes(&entry.path);
            let last = store.load(&entry.name)?.map(|r| r.episode);
            for episode in &episodes {
                if last.as_deref() == Some(episode.as_str()) {
                    println!("{}\t(last watched)", episode);
                } else {
                    println!("{}", episode);
                }
            }
        }
        Some("play") => {
            let Some(name) = args.get(1) else {
                usage();
                return Ok(());
            };
            // Episode numbers are 1-based on the command line
            let start_index = match args.get(2) {
                Some(raw) => match raw.parse::<usize>() {
                    Ok(n) if n >= 1 => n - 1,
                    _ => {
                        eprintln!("Episode must be a number starting at 1");
                        return Ok(());
                    }
                },
                None => 0,
            };
            let Some(entry) = lookup(&mut catalog, name)? else {
                eprintln!("No series named {:?} in the catalog", name);
                return Ok(());
            };
            play_series(&config, &catalog, &store, &entry, start_index).await?;
        }
        Some("resume") => {
            let Some(name) = args.get(1) else {
                usage();
                return Ok(());
            };
            let Some(entry) = lookup(&mut catalog, name)? else {
                eprintln!("No series named {:?} in the catalog", name);
                return Ok(());
            };
            let episodes = catalog.list_episodes(&entry.path);
            let start_index = store
                .load(&entry.name)?
                .and_then(|record| episodes.iter().position(|e| *e == record.episode));
            let Some(start_index) = start_index else {
                println!("Nothing to resume for {}", entry.name);
                return Ok(());
            };
            info!(series = %entry.name, episode = start_index + 1, "Resuming last watched");
            play_series(&config, &catalog, &store, &entry, start_index).await?;
        }
        Some(_) => usage(),
    }

    Ok(())
}

fn lookup(catalog: &mut LibraryCatalog, name: &str) -> Result<Option<SeriesEntry>> {
    // Materialize a cold catalog before looking anything up
    catalog.list_series()?;
    Ok(catalog.series(name).cloned())
}

async fn play_series(
    config: &Config,
    catalog: &LibraryCatalog,
    store: &Arc<WatchStateStore>,
    entry: &SeriesEntry,
    start_index: usize,
) -> Result<()> {
    let episodes = catalog.list_episodes(&entry.path);
    let paths: Vec<PathBuf> = episodes.iter().map(|e| entry.path.join(e)).collect();

    let launcher = Arc::new(CommandLauncher::new(
        config.player.command.clone(),
        config.player.args.clone(),
    ));
    let mut session = PlaybackSession::new(launcher, Arc::clone(store));
    session.play(&entry.name, &paths, start_index).await?;
    session.wait().await?;
    Ok(())
}
