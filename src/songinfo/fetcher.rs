//! Dispatches a song lookup to every enabled provider.

use futures_util::future::join_all;
use tokio::sync::mpsc;

use crate::songinfo::event::ViewEvent;
use crate::songinfo::provider::SongInfoProvider;
use crate::songinfo::song::Song;

/// One section of fetched info, e.g. the lyrics from a single site.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoPane {
    pub title: String,
    pub provider: String,
    pub body: String,
    pub relevance: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    pub info: Vec<InfoPane>,
}

pub struct SongInfoFetcher {
    providers: Vec<SongInfoProvider>,
    next_id: u64,
    results_tx: mpsc::Sender<ViewEvent>,
}

impl SongInfoFetcher {
    pub fn new(results_tx: mpsc::Sender<ViewEvent>) -> Self {
        Self {
            providers: Vec::new(),
            next_id: 1,
            results_tx,
        }
    }

    pub fn add_provider(&mut self, provider: SongInfoProvider) {
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[SongInfoProvider] {
        &self.providers
    }

    pub fn providers_mut(&mut self) -> &mut [SongInfoProvider] {
        &mut self.providers
    }

    /// Start a lookup and return its request id. The result arrives later as
    /// `ViewEvent::ResultReady` carrying the same id.
    pub fn fetch_info(&mut self, song: &Song) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let providers: Vec<SongInfoProvider> = self
            .providers
            .iter()
            .filter(|p| p.is_enabled())
            .cloned()
            .collect();
        let song = song.clone();
        let tx = self.results_tx.clone();

        tokio::spawn(async move {
            let result = fetch_all(&providers, &song).await;
            tracing::debug!(id, panes = result.info.len(), "Song info lookup finished");
            let _ = tx.send(ViewEvent::ResultReady(id, result)).await;
        });

        id
    }
}

async fn fetch_all(providers: &[SongInfoProvider], song: &Song) -> FetchResult {
    if !song.is_valid() {
        return FetchResult::default();
    }

    let outcomes = join_all(providers.iter().map(|p| async move { (p.name(), p.fetch(song).await) })).await;

    let mut info = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(Some(pane)) => info.push(pane),
            Ok(None) => {}
            Err(e) => tracing::warn!(provider = name, error = %e, "Provider fetch failed"),
        }
    }
    info.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    FetchResult { info }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::songinfo::ultimate::UltimateLyricsProvider;

    #[tokio::test]
    async fn request_ids_increase() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut fetcher = SongInfoFetcher::new(tx);
        let song = Song::default();
        let first = fetcher.fetch_info(&song);
        let second = fetcher.fetch_info(&song);
        assert!(second > first);

        let mut seen = Vec::new();
        for _ in 0..2 {
            match rx.recv().await {
                Some(ViewEvent::ResultReady(id, result)) => {
                    assert!(result.info.is_empty());
                    seen.push(id);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        seen.sort();
        assert_eq!(seen, vec![first, second]);
    }

    #[tokio::test]
    async fn disabled_providers_are_not_queried() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut fetcher = SongInfoFetcher::new(tx);
        let mut provider = SongInfoProvider::ultimate(UltimateLyricsProvider::new("unreachable"));
        provider.set_enabled(false);
        fetcher.add_provider(provider);

        let id = fetcher.fetch_info(&Song::new("Artist", "Title"));
        match rx.recv().await {
            Some(ViewEvent::ResultReady(got, result)) => {
                assert_eq!(got, id);
                assert!(result.info.is_empty());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
