//! Ranking of catalog lyric providers from the user's search order.

use std::cmp::Ordering;

use crate::songinfo::provider::SongInfoProvider;
use crate::songinfo::ultimate::UltimateLyricsProvider;

/// Search order used when the user never saved one.
pub const DEFAULT_SEARCH_ORDER: [&str; 20] = [
    "lyrics.wikia.com",
    "lyricstime.com",
    "lyricsreg.com",
    "lyricsmania.com",
    "metrolyrics.com",
    "seeklyrics.com",
    "azlyrics.com",
    "mp3lyrics.org",
    "songlyrics.com",
    "lyricsmode.com",
    "elyrics.net",
    "lyricsdownload.com",
    "lyrics.com",
    "lyricsbay.com",
    "directlyrics.com",
    "loudson.gs",
    "teksty.org",
    "tekstowo.pl (Polish translations)",
    "vagalume.uol.com.br",
    "vagalume.uol.com.br (Portuguese translations)",
];

/// Index of the catalog provider called `name`. Other provider kinds never match.
pub fn provider_by_name(providers: &[SongInfoProvider], name: &str) -> Option<usize> {
    providers
        .iter()
        .position(|p| p.as_ultimate().is_some_and(|u| u.name == name))
}

/// Enable and rank the catalog providers named in `search_order`, disabling
/// the rest. `None` applies [`DEFAULT_SEARCH_ORDER`].
///
/// Unknown names are skipped. The first known name gets relevance equal to
/// the number of known names, the last gets 1. A name listed more than once
/// keeps its first position; later repeats are ignored rather than letting
/// the last occurrence win.
pub fn reconcile(providers: &mut [SongInfoProvider], search_order: Option<&[String]>) {
    let names: Vec<&str> = match search_order {
        Some(order) => order.iter().map(String::as_str).collect(),
        None => DEFAULT_SEARCH_ORDER.to_vec(),
    };

    let mut ordered: Vec<usize> = Vec::with_capacity(names.len());
    for name in names {
        match provider_by_name(providers, name) {
            Some(idx) if !ordered.contains(&idx) => ordered.push(idx),
            Some(_) => {}
            None => tracing::debug!(provider = name, "Ignoring unknown lyrics provider"),
        }
    }

    let mut relevance = ordered.len() as i32;
    for &idx in &ordered {
        let provider = &mut providers[idx];
        provider.set_enabled(true);
        if let Some(lyrics) = provider.as_ultimate_mut() {
            lyrics.set_relevance(relevance);
        }
        relevance -= 1;
    }

    for (idx, provider) in providers.iter_mut().enumerate() {
        if provider.as_ultimate().is_some() && !ordered.contains(&idx) {
            provider.set_enabled(false);
        }
    }

    tracing::debug!(enabled = ordered.len(), "Reloaded lyrics provider order");
}

/// Display order: enabled before disabled, then higher relevance first.
pub fn compare_lyric_providers(
    a: (bool, &UltimateLyricsProvider),
    b: (bool, &UltimateLyricsProvider),
) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| b.1.relevance().cmp(&a.1.relevance()))
}

/// The catalog providers, sorted for display.
pub fn lyric_providers(providers: &[SongInfoProvider]) -> Vec<(bool, &UltimateLyricsProvider)> {
    let mut ret: Vec<_> = providers
        .iter()
        .filter_map(|p| p.as_ultimate().map(|u| (p.is_enabled(), u)))
        .collect();
    ret.sort_by(|a, b| compare_lyric_providers(*a, *b));
    ret
}
