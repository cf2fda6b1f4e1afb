//! playlist-shuffler: copy one of your YouTube playlists into a new one, in random order.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlist_shuffler::app::App;
use playlist_shuffler::config::{Config, DEFAULT_CONFIG_PATH};
use playlist_shuffler::manager::PlaylistManager;
use playlist_shuffler::models::Playlist;
use playlist_shuffler::console;

#[derive(Parser, Debug)]
#[command(name = "playlist-shuffler")]
#[command(about = "Shuffle a YouTube playlist into a new playlist")]
#[command(version)]
struct Args {
    /// Path of the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "PLAYLIST_SHUFFLER_CONFIG")]
    config: PathBuf,

    /// OAuth client secrets downloaded from the Google Cloud console
    #[arg(long, env = "PLAYLIST_SHUFFLER_CLIENT_SECRETS")]
    client_secrets: Option<PathBuf>,

    /// Where the OAuth token is cached between runs
    #[arg(long, env = "PLAYLIST_SHUFFLER_TOKEN_CACHE")]
    token_cache: Option<PathBuf>,

    /// Print the authorization URL instead of opening a browser
    #[arg(long)]
    no_browser: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive shell (default)
    Run,
    /// List your playlists
    List,
    /// Shuffle a playlist into a new one without the interactive shell
    Shuffle {
        /// Id or exact title of the playlist to shuffle
        #[arg(short, long)]
        source: String,
        /// Name of the playlist to create
        #[arg(short, long)]
        name: String,
    },
}

fn find_playlist<'p>(playlists: &'p [Playlist], needle: &str) -> Result<&'p Playlist> {
    if let Some(playlist) = playlists.iter().find(|p| p.id == needle) {
        return Ok(playlist);
    }

    let matches: Vec<&Playlist> = playlists.iter().filter(|p| p.title == needle).collect();
    match matches.as_slice() {
        [playlist] => Ok(playlist),
        [] => bail!("No playlist with id or title '{}'", needle),
        _ => bail!("Several playlists are titled '{}'; pass the playlist id instead", needle),
    }
}

async fn list(config: &Config) -> Result<()> {
    let manager = PlaylistManager::connect(config)
        .await
        .context("Failed to connect to YouTube")?;

    let playlists = manager.get_user_playlists().await.context("Failed to load playlists")?;
    if playlists.is_empty() {
        println!("No playlists found");
    }
    for playlist in &playlists {
        println!("{}  {}", playlist.id, playlist);
    }
    Ok(())
}

async fn shuffle(config: &Config, source: &str, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Please enter a name for the new playlist");
    }

    let manager = PlaylistManager::connect(config)
        .await
        .context("Failed to connect to YouTube")?;

    let playlists = manager.get_user_playlists().await.context("Failed to load playlists")?;
    let source = find_playlist(&playlists, source)?;

    let outcome = manager
        .shuffle_into_new_playlist(source, name, |progress| println!("{}", progress))
        .await
        .context("Operation failed")?;

    for failure in &outcome.report.failed {
        eprintln!("Video {} ({}) was not added: {}", failure.position, failure.video_id, failure.error);
    }
    println!(
        "Success! Added {}/{} videos to '{}' ({})",
        outcome.report.added, outcome.total, outcome.title, outcome.playlist_id
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlist_shuffler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::init(&args.config);
    if let Some(client_secrets) = args.client_secrets {
        config.client_secrets = client_secrets;
    }
    if let Some(token_cache) = args.token_cache {
        config.token_cache = token_cache;
    }
    if args.no_browser {
        config.open_browser = false;
    }

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let (app, events) = App::new(config, tokio::runtime::Handle::current());
            console::run(app, events).await.context("Console I/O failed")?;
        }
        Commands::List => list(&config).await?,
        Commands::Shuffle { source, name } => shuffle(&config, &source, &name).await?,
    }

    Ok(())
}
