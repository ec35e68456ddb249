//! The song info view: owns the providers, keeps their order in sync with
//! the user's settings, and shows the sections of the latest lookup.
//!
//! All state here lives on the single task that drains the view's event
//! channel, so nothing is shared or locked. Background work (the catalog
//! parse, provider fetches) reports back through [`ViewEvent`]s.

use tokio::sync::mpsc;

use crate::songinfo::catalog::{CatalogSource, spawn_catalog_load};
use crate::songinfo::event::ViewEvent;
use crate::songinfo::fetcher::{FetchResult, InfoPane, SongInfoFetcher};
use crate::songinfo::ordering;
use crate::songinfo::provider::SongInfoProvider;
use crate::songinfo::settings::{SettingsStore, SongInfoSettings};
use crate::songinfo::song::Song;
use crate::songinfo::types::SongInfoError;
use crate::songinfo::ultimate::UltimateLyricsProvider;

/// Capacity of the view's event channel.
const EVENT_CHANNEL_SIZE: usize = 32;

pub struct SongInfoView {
    fetcher: SongInfoFetcher,
    settings: SettingsStore,
    current_request_id: Option<u64>,
    sections: Vec<InfoPane>,
    catalog_loaded: bool,
}

impl SongInfoView {
    /// Build the view and start parsing the lyrics catalog in the background.
    ///
    /// The parsed providers arrive on the returned receiver as
    /// `ViewEvent::CatalogParsed`; feed every event back into
    /// [`SongInfoView::handle_event`].
    pub fn new(
        settings: SettingsStore,
        catalog: CatalogSource,
        builtin: Vec<SongInfoProvider>,
    ) -> (Self, mpsc::Sender<ViewEvent>, mpsc::Receiver<ViewEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let mut fetcher = SongInfoFetcher::new(tx.clone());
        for provider in builtin {
            fetcher.add_provider(provider);
        }

        let parse = spawn_catalog_load(catalog);
        let catalog_tx = tx.clone();
        tokio::spawn(async move {
            let result = match parse.await {
                Ok(result) => result,
                Err(e) => Err(SongInfoError::Catalog(format!(
                    "catalog task failed: {e}"
                ))),
            };
            let _ = catalog_tx.send(ViewEvent::CatalogParsed(result)).await;
        });

        let view = Self {
            fetcher,
            settings,
            current_request_id: None,
            sections: Vec::new(),
            catalog_loaded: false,
        };
        (view, tx, rx)
    }

    /// Returns false once the loop should stop.
    pub fn handle_event(&mut self, event: ViewEvent) -> bool {
        match event {
            ViewEvent::CatalogParsed(result) => {
                self.catalog_parsed(result);
                true
            }
            ViewEvent::ResultReady(id, result) => {
                self.result_ready(id, result);
                true
            }
            ViewEvent::Shutdown => false,
        }
    }

    fn catalog_parsed(&mut self, result: Result<Vec<SongInfoProvider>, SongInfoError>) {
        match result {
            Ok(providers) => {
                for provider in providers {
                    self.fetcher.add_provider(provider);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to parse lyrics catalog"),
        }
        self.catalog_loaded = true;
        self.reload_settings();
    }

    pub fn catalog_loaded(&self) -> bool {
        self.catalog_loaded
    }

    /// Show the result of a lookup, unless a newer one has started since.
    pub fn result_ready(&mut self, id: u64, result: FetchResult) {
        if self.current_request_id != Some(id) {
            tracing::debug!(id, "Dropping stale song info result");
            return;
        }
        self.clear();
        for pane in result.info {
            self.add_section(pane);
        }
    }

    pub fn song_changed(&mut self, song: &Song) -> u64 {
        self.clear();
        let id = self.fetcher.fetch_info(song);
        self.current_request_id = Some(id);
        id
    }

    /// Re-apply the saved search order to the catalog providers.
    pub fn reload_settings(&mut self) {
        let settings = SongInfoSettings::from_store(&self.settings);
        ordering::reconcile(self.fetcher.providers_mut(), settings.search_order.as_deref());
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    /// Catalog providers sorted for display, each with its enabled flag.
    pub fn lyric_providers(&self) -> Vec<(bool, &UltimateLyricsProvider)> {
        ordering::lyric_providers(self.fetcher.providers())
    }

    pub fn providers(&self) -> &[SongInfoProvider] {
        self.fetcher.providers()
    }

    pub fn sections(&self) -> &[InfoPane] {
        &self.sections
    }

    fn clear(&mut self) {
        self.sections.clear();
    }

    fn add_section(&mut self, pane: InfoPane) {
        self.sections.push(pane);
    }

    /// Plain-text rendering of the current sections.
    pub fn render(&self, width: usize) -> String {
        let mut out = String::new();
        for pane in &self.sections {
            out.push_str(&format!("== {} ({}) ==\n", pane.title, pane.provider));
            for line in pane.body.lines() {
                if line.is_empty() {
                    out.push('\n');
                    continue;
                }
                for wrapped in textwrap::wrap(line, width.max(1)) {
                    out.push_str(&wrapped);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"<lyricproviders>
  <provider name="lyrics.com" title="Lyrics.com" url="http://x/{artist}"/>
  <provider name="azlyrics.com" title="AZLyrics" url="http://y/{artist}"/>
  <provider name="custom.example" title="Custom" url="http://z/{artist}"/>
</lyricproviders>"#;

    fn catalog_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), CATALOG).unwrap();
        file
    }

    fn pane(provider: &str) -> InfoPane {
        InfoPane {
            title: "Lyrics".to_string(),
            provider: provider.to_string(),
            body: "la la la".to_string(),
            relevance: 1,
        }
    }

    async fn wait_for_catalog(view: &mut SongInfoView, rx: &mut mpsc::Receiver<ViewEvent>) {
        while !view.catalog_loaded() {
            let event = rx.recv().await.unwrap();
            view.handle_event(event);
        }
    }

    #[tokio::test]
    async fn catalog_load_applies_default_order() {
        let file = catalog_file();
        let (mut view, _tx, mut rx) = SongInfoView::new(
            SettingsStore::in_memory(),
            CatalogSource::File(file.path().to_path_buf()),
            vec![SongInfoProvider::lrclib()],
        );
        wait_for_catalog(&mut view, &mut rx).await;

        let names: Vec<(bool, String)> = view
            .lyric_providers()
            .into_iter()
            .map(|(enabled, p)| (enabled, p.name.clone()))
            .collect();
        // azlyrics ranks above lyrics.com in the default order.
        assert_eq!(
            names,
            vec![
                (true, "azlyrics.com".to_string()),
                (true, "lyrics.com".to_string()),
                (false, "custom.example".to_string()),
            ]
        );
        assert_eq!(view.providers().len(), 4);
        assert!(view.providers()[0].is_enabled());
    }

    #[tokio::test]
    async fn saved_order_is_applied_and_reloadable() {
        let file = catalog_file();
        let mut settings = SettingsStore::in_memory();
        let order = vec!["custom.example".to_string(), "gone.example".to_string()];
        SongInfoSettings::store_search_order(Some(order.as_slice()), &mut settings);

        let (mut view, _tx, mut rx) = SongInfoView::new(
            settings,
            CatalogSource::File(file.path().to_path_buf()),
            Vec::new(),
        );
        wait_for_catalog(&mut view, &mut rx).await;

        let enabled: Vec<String> = view
            .lyric_providers()
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, p)| p.name.clone())
            .collect();
        assert_eq!(enabled, vec!["custom.example"]);

        SongInfoSettings::store_search_order(None, view.settings_mut());
        view.reload_settings();
        let after: Vec<(bool, &str)> = view
            .lyric_providers()
            .into_iter()
            .map(|(enabled, p)| (enabled, p.name.as_str()))
            .collect();
        assert_eq!(
            after,
            vec![(true, "azlyrics.com"), (true, "lyrics.com"), (false, "custom.example")]
        );
    }

    #[tokio::test]
    async fn failed_catalog_still_reconciles() {
        let (mut view, _tx, mut rx) = SongInfoView::new(
            SettingsStore::in_memory(),
            CatalogSource::File("/nonexistent/providers.xml".into()),
            vec![SongInfoProvider::lrclib()],
        );
        wait_for_catalog(&mut view, &mut rx).await;
        assert!(view.lyric_providers().is_empty());
        assert_eq!(view.providers().len(), 1);
    }

    #[tokio::test]
    async fn stale_results_are_ignored() {
        let (mut view, _tx, _rx) =
            SongInfoView::new(SettingsStore::in_memory(), CatalogSource::Bundled, Vec::new());

        let first = view.song_changed(&Song::new("A", "B"));
        let second = view.song_changed(&Song::new("C", "D"));

        view.result_ready(first, FetchResult { info: vec![pane("old")] });
        assert!(view.sections().is_empty());

        view.result_ready(second, FetchResult { info: vec![pane("new"), pane("newer")] });
        assert_eq!(view.sections().len(), 2);
        assert_eq!(view.sections()[0].provider, "new");

        // A repeated delivery replaces rather than appends.
        view.result_ready(second, FetchResult { info: vec![pane("again")] });
        assert_eq!(view.sections().len(), 1);
    }

    #[tokio::test]
    async fn render_wraps_bodies() {
        let (mut view, _tx, _rx) =
            SongInfoView::new(SettingsStore::in_memory(), CatalogSource::Bundled, Vec::new());
        let id = view.song_changed(&Song::new("A", "B"));
        let mut long = pane("site");
        long.body = "one two three four\n\nfive".to_string();
        view.result_ready(id, FetchResult { info: vec![long] });

        let text = view.render(9);
        assert_eq!(text, "== Lyrics (site) ==\none two\nthree\nfour\n\nfive\n\n");
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let (mut view, _tx, _rx) =
            SongInfoView::new(SettingsStore::in_memory(), CatalogSource::Bundled, Vec::new());
        assert!(!view.handle_event(ViewEvent::Shutdown));
    }
}
