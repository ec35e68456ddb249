//! A pluggable info source and the variants it can take.

use crate::songinfo::fetcher::InfoPane;
use crate::songinfo::providers::LrclibProvider;
use crate::songinfo::song::Song;
use crate::songinfo::types::SongInfoError;
use crate::songinfo::ultimate::UltimateLyricsProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderKind {
    /// Scraper defined by the lyrics catalog; ranked by user preference.
    UltimateLyrics(UltimateLyricsProvider),
    /// Built-in lrclib.net API client; never ranked.
    Lrclib(LrclibProvider),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongInfoProvider {
    enabled: bool,
    pub kind: ProviderKind,
}

impl SongInfoProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self { enabled: true, kind }
    }

    pub fn ultimate(provider: UltimateLyricsProvider) -> Self {
        Self::new(ProviderKind::UltimateLyrics(provider))
    }

    pub fn lrclib() -> Self {
        Self::new(ProviderKind::Lrclib(LrclibProvider::default()))
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            ProviderKind::UltimateLyrics(p) => &p.name,
            ProviderKind::Lrclib(_) => LrclibProvider::NAME,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn as_ultimate(&self) -> Option<&UltimateLyricsProvider> {
        match &self.kind {
            ProviderKind::UltimateLyrics(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_ultimate_mut(&mut self) -> Option<&mut UltimateLyricsProvider> {
        match &mut self.kind {
            ProviderKind::UltimateLyrics(p) => Some(p),
            _ => None,
        }
    }

    pub async fn fetch(&self, song: &Song) -> Result<Option<InfoPane>, SongInfoError> {
        match &self.kind {
            ProviderKind::UltimateLyrics(p) => p.fetch(song).await,
            ProviderKind::Lrclib(p) => p.fetch(song).await,
        }
    }
}
