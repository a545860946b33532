use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

use ytm_bridge::{AlbumItem, Config, HomeFeedData, MusicBridge, SongItem};

#[derive(Parser)]
#[command(name = "ytm-bridge")]
#[command(about = "Browse the YouTube Music catalog as stable, typed records")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for songs
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Search for albums
    Albums {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Show search suggestions for a partial query
    Suggest {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Fetch the home feed: trending, top tracks, new singles and new albums
    Home {
        /// Print the feed as JSON
        #[arg(long)]
        json: bool,

        /// Save a timestamped JSON snapshot to feed_snapshots/
        #[arg(long)]
        save: bool,

        /// Give up on unfinished sections after this many seconds (or set YTM_FEED_DEADLINE_SECS)
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// Resolve the best audio stream for a video id or watch URL
    Stream { target: String },

    /// Show an album and its tracks
    Album { browse_id: String },

    /// Show setup guide
    Setup,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    if let Commands::Setup = cli.command {
        show_setup_guide();
        return Ok(());
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    let bridge = MusicBridge::from_config(&config).context("Failed to initialize catalog client")?;

    match cli.command {
        Commands::Search { query } => search_songs(&bridge, &query.join(" ")).await,
        Commands::Albums { query } => search_albums(&bridge, &query.join(" ")).await,
        Commands::Suggest { query } => suggest(&bridge, &query.join(" ")).await,
        Commands::Home {
            json,
            save,
            deadline,
        } => {
            let bridge = match deadline {
                Some(0) => bridge.with_feed_deadline(None),
                Some(secs) => bridge.with_feed_deadline(Some(Duration::from_secs(secs))),
                None => bridge,
            };
            home(&bridge, json, save).await
        }
        Commands::Stream { target } => stream(&bridge, &target).await,
        Commands::Album { browse_id } => album(&bridge, &browse_id).await,
        Commands::Setup => Ok(()),
    }
}

async fn search_songs(bridge: &MusicBridge, query: &str) -> Result<()> {
    println!("{}", format!("Songs matching \"{}\"", query).cyan().bold());
    println!("{}", "=".repeat(50));

    let Some(songs) = bridge.search_songs(query).await else {
        println!("{}", "Search failed, run with --verbose for details".red());
        return Ok(());
    };

    if songs.is_empty() {
        println!("{}", "No songs found".yellow());
        return Ok(());
    }

    print_songs(&songs);
    Ok(())
}

async fn search_albums(bridge: &MusicBridge, query: &str) -> Result<()> {
    println!("{}", format!("Albums matching \"{}\"", query).cyan().bold());
    println!("{}", "=".repeat(50));

    let Some(albums) = bridge.search_albums(query).await else {
        println!("{}", "Search failed, run with --verbose for details".red());
        return Ok(());
    };

    if albums.is_empty() {
        println!("{}", "No albums found".yellow());
        return Ok(());
    }

    print_albums(&albums);
    Ok(())
}

async fn suggest(bridge: &MusicBridge, query: &str) -> Result<()> {
    match bridge.search_suggestions(query).await {
        Some(suggestions) if !suggestions.is_empty() => {
            for suggestion in &suggestions {
                println!("  {}", suggestion.green());
            }
        }
        Some(_) => println!("{}", "No suggestions".yellow()),
        None => println!("{}", "Suggestions unavailable".red()),
    }
    Ok(())
}

async fn home(bridge: &MusicBridge, json: bool, save: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message("Fetching home feed...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let feed = bridge.home_feed_sections().await;

    spinner.finish_and_clear();

    if save {
        let path = save_snapshot(&feed, Path::new("feed_snapshots"))?;
        println!("{} {}", "Snapshot saved to".green(), path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }

    print_feed(&feed);
    Ok(())
}

async fn stream(bridge: &MusicBridge, target: &str) -> Result<()> {
    let video_id = parse_watch_target(target)
        .with_context(|| format!("Could not find a video id in '{}'", target))?;

    let Some(stream) = bridge.stream_data(&video_id).await else {
        println!("{}", format!("Could not resolve video {}", video_id).red());
        return Ok(());
    };

    let title = stream.title.as_deref().unwrap_or("Unknown title");
    let author = stream.author.as_deref().unwrap_or("Unknown artist");
    println!("{} - {}", title.green().bold(), author.cyan());

    if let Some(secs) = stream.duration_seconds {
        println!("   Duration: {}", format_duration(secs));
    }

    match stream.url.as_deref() {
        Some(url) => {
            println!(
                "   Format:   {} (itag {}, {} kbps)",
                stream.mime_type.as_deref().unwrap_or("?"),
                stream.itag.map(|i| i.to_string()).unwrap_or_else(|| "?".into()),
                stream.bitrate.unwrap_or(0) / 1000
            );
            println!("   URL:      {}", url);
        }
        None => println!("{}", "   No direct audio stream offered".yellow()),
    }

    Ok(())
}

async fn album(bridge: &MusicBridge, browse_id: &str) -> Result<()> {
    let Some(details) = bridge.album_details(browse_id).await else {
        println!("{}", format!("Could not load album {}", browse_id).red());
        return Ok(());
    };

    let year = details.year.map(|y| format!(" ({})", y)).unwrap_or_default();
    println!("{}{}", details.title.cyan().bold(), year);
    if !details.artists.is_empty() {
        println!("{}", details.artists.join(", "));
    }
    println!("{}", "=".repeat(50));

    print_songs(&details.songs);
    println!("\n{}", format!("Total: {} tracks", details.songs.len()).cyan());

    Ok(())
}

fn print_feed(feed: &HomeFeedData) {
    let sections = [
        ("Trending", &feed.trending_songs),
        ("Top tracks", &feed.top_tracks),
        ("New singles", &feed.new_releases),
    ];

    for (heading, songs) in sections {
        println!("\n{}", heading.cyan().bold());
        if songs.is_empty() {
            println!("   {}", "nothing available".yellow());
        } else {
            print_songs(songs);
        }
    }

    println!("\n{}", "New albums".cyan().bold());
    if feed.new_albums.is_empty() {
        println!("   {}", "nothing available".yellow());
    } else {
        print_albums(&feed.new_albums);
    }
}

fn print_songs(songs: &[SongItem]) {
    for (i, song) in songs.iter().enumerate() {
        let duration = song.duration().map(format_duration).unwrap_or_default();
        println!(
            "{:2}. {} - {} {} {}",
            i + 1,
            song.title().green(),
            song.artists().join(", "),
            duration.dimmed(),
            song.id().dimmed()
        );
    }
}

fn print_albums(albums: &[AlbumItem]) {
    for (i, album) in albums.iter().enumerate() {
        let artists = album
            .artists
            .as_ref()
            .map(|a| a.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        let year = album.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!(
            "{:2}. {}{} - {} {}",
            i + 1,
            album.title.green(),
            year,
            artists,
            album.browse_id.dimmed()
        );
    }
}

fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn save_snapshot(feed: &HomeFeedData, dir: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    fs::create_dir_all(dir)?;

    let filename = dir.join(format!("home_feed_{}.json", timestamp));
    let json = serde_json::to_string_pretty(feed)?;

    fs::write(&filename, json)?;

    info!("Feed snapshot saved to: {}", filename.display());

    Ok(filename)
}

/// Accepts a bare video id or a `watch?v=` / `youtu.be/` URL.
fn parse_watch_target(target: &str) -> Option<String> {
    let target = target.trim();

    let Ok(url) = Url::parse(target) else {
        return (!target.is_empty() && !target.contains('/')).then(|| target.to_string());
    };

    match url.host_str() {
        Some("youtu.be") => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        Some(_) => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty()),
        None => None,
    }
}

fn show_setup_guide() {
    println!("{}", "YouTube Music Bridge Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Configuration".yellow());
    println!("   - Everything has a working default; override in a .env file:");
    println!("     YTM_BASE_URL=https://music.youtube.com/youtubei/v1/");
    println!("     YTM_CLIENT_VERSION=1.20240918.01.00");
    println!("     YTM_PLAYER_CLIENT_VERSION=7.27.52");
    println!("     YTM_LANGUAGE=en");
    println!("     YTM_REGION=US");
    println!("     YTM_REQUEST_TIMEOUT_SECS=15");
    println!("     YTM_FEED_DEADLINE_SECS=0          (0 = wait for every section)");

    println!("\n{}", "2. Usage".yellow());
    println!("   - ytm-bridge home                   (trending, charts, new releases)");
    println!("   - ytm-bridge home --json --save     (dump and snapshot the feed)");
    println!("   - ytm-bridge search daft punk       (song search)");
    println!("   - ytm-bridge albums discovery       (album search)");
    println!("   - ytm-bridge stream <video id|url>  (resolve an audio stream)");
    println!("   - ytm-bridge album <browse id>      (album tracks)");

    println!("\n{}", "Ready to browse!".green());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_target() {
        assert_eq!(parse_watch_target("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            parse_watch_target("https://music.youtube.com/watch?v=dQw4w9WgXcQ&list=RD").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            parse_watch_target("https://youtu.be/dQw4w9WgXcQ?t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert!(parse_watch_target("https://music.youtube.com/explore").is_none());
        assert!(parse_watch_target("   ").is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(225), "3:45");
        assert_eq!(format_duration(9), "0:09");
    }

    #[test]
    fn test_save_snapshot_writes_json() {
        let dir = std::env::temp_dir().join(format!("ytm-bridge-snapshot-{}", std::process::id()));
        let path = save_snapshot(&HomeFeedData::default(), &dir).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["trending_songs"], serde_json::json!([]));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("home_feed_"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
