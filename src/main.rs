mod logger;
mod songinfo;

use crate::songinfo::{
    CatalogSource, SettingsStore, Song, SongInfoProvider, SongInfoSettings, SongInfoView, ViewEvent,
};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about)]
pub struct Config {
    /// Lyrics provider catalog (XML). Defaults to the bundled catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Settings file (JSON). Defaults to $XDG_CONFIG_HOME/songinfo/settings.json
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Comma-separated lyric providers in preferred order; saved to settings.
    /// If empty, the SONGINFO_SEARCH_ORDER env var will be used as a fallback.
    #[arg(long, value_delimiter = ',')]
    search_order: Vec<String>,
    /// Forget the saved search order and go back to the default ranking
    #[arg(long, conflicts_with = "search_order")]
    reset_order: bool,
    /// Print the lyric providers in display order
    #[arg(long)]
    list: bool,
    /// Artist of the song to look up
    #[arg(long, requires = "title")]
    artist: Option<String>,
    /// Title of the song to look up
    #[arg(long, requires = "artist")]
    title: Option<String>,
    /// Album of the song to look up (optional)
    #[arg(long)]
    album: Option<String>,
    /// Wrap width for rendered info
    #[arg(long, default_value_t = 80)]
    width: usize,
    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

fn search_order_from_env_if_empty(cli: &mut Config) {
    if cli.search_order.is_empty()
        && !cli.reset_order
        && let Ok(s) = std::env::var("SONGINFO_SEARCH_ORDER")
    {
        let parts: Vec<String> = s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if !parts.is_empty() {
            cli.search_order = parts;
        }
    }
}

fn default_settings_path() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("songinfo").join("settings.json")
}

fn print_providers(view: &SongInfoView) {
    for (enabled, provider) in view.lyric_providers() {
        let mark = if enabled { "x" } else { " " };
        println!("[{}] {:>3}  {}", mark, provider.relevance(), provider.name);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut cfg = Config::parse();
    search_order_from_env_if_empty(&mut cfg);
    logger::init_logger(cfg.debug_log);

    let settings_path = cfg.settings.clone().unwrap_or_else(default_settings_path);
    let mut settings = SettingsStore::load(&settings_path);
    if cfg.reset_order {
        SongInfoSettings::store_search_order(None, &mut settings);
        settings.save()?;
    } else if !cfg.search_order.is_empty() {
        SongInfoSettings::store_search_order(Some(cfg.search_order.as_slice()), &mut settings);
        settings.save()?;
        tracing::info!(path = %settings_path.display(), "Saved lyrics search order");
    }

    let catalog = cfg.catalog.clone().map_or(CatalogSource::Bundled, CatalogSource::File);
    let (mut view, events_tx, mut events) =
        SongInfoView::new(settings, catalog, vec![SongInfoProvider::lrclib()]);

    let song = match (&cfg.artist, &cfg.title) {
        (Some(artist), Some(title)) => {
            Some(Song::new(artist.as_str(), title.as_str()).with_album(cfg.album.clone().unwrap_or_default()))
        }
        _ => None,
    };

    let mut request_id = None;
    while let Some(event) = events.recv().await {
        let result_id = match &event {
            ViewEvent::ResultReady(id, _) => Some(*id),
            _ => None,
        };
        if !view.handle_event(event) {
            break;
        }

        if result_id.is_some() && result_id == request_id {
            print!("{}", view.render(cfg.width));
            if view.sections().is_empty() {
                eprintln!("No song info found");
            }
            let _ = events_tx.send(ViewEvent::Shutdown).await;
            continue;
        }

        if view.catalog_loaded() && request_id.is_none() {
            tracing::debug!(providers = view.providers().len(), "Providers ready");
            if cfg.list {
                print_providers(&view);
            }
            match &song {
                Some(song) => request_id = Some(view.song_changed(song)),
                None => break,
            }
        }
    }
    Ok(())
}
