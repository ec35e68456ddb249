use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::songinfo::fetcher::InfoPane;
use crate::songinfo::song::Song;
use crate::songinfo::types::{SongInfoError, http_client};

static LRC_TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,2}):(\d{2})[.](\d{1,2})\]").unwrap());

/// lrclib sits outside the lyrics catalog, so it carries a fixed relevance
/// below any ranked scraper.
const LRCLIB_RELEVANCE: i32 = 0;

#[derive(Deserialize)]
#[allow(non_snake_case)]
struct LrcLibResponse {
    plainLyrics: Option<String>,
    syncedLyrics: Option<String>,
}

/// Built-in provider backed by the lrclib.net JSON API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrclibProvider {
    base_url: String,
}

impl Default for LrclibProvider {
    fn default() -> Self {
        Self {
            base_url: "https://lrclib.net/api/get".to_string(),
        }
    }
}

impl LrclibProvider {
    pub const NAME: &'static str = "lrclib.net";

    /// Fetch plain lyrics from lrclib.net, falling back to the synced text
    /// with its timestamps removed.
    pub async fn fetch(&self, song: &Song) -> Result<Option<InfoPane>, SongInfoError> {
        let url = self.build_url(song);

        let resp = http_client().get(&url).send().await?;

        // 404 means no lyrics found - not an error
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }

        if !resp.status().is_success() {
            return Err(SongInfoError::Api(format!("lrclib: HTTP {}", resp.status())));
        }

        let response: LrcLibResponse = resp.json().await?;
        let body = match (response.plainLyrics, response.syncedLyrics) {
            (Some(plain), _) if !plain.trim().is_empty() => plain,
            (_, Some(synced)) if !synced.trim().is_empty() => strip_timestamps(&synced),
            _ => return Ok(None),
        };

        Ok(Some(InfoPane {
            title: "Lyrics".to_string(),
            provider: Self::NAME.to_string(),
            body: body.trim().to_string(),
            relevance: LRCLIB_RELEVANCE,
        }))
    }

    /// Build lrclib API URL with query parameters.
    fn build_url(&self, song: &Song) -> String {
        let mut params = vec![
            format!("artist_name={}", urlencoding::encode(&song.artist)),
            format!("track_name={}", urlencoding::encode(&song.title)),
        ];

        if !song.album.is_empty() {
            params.push(format!("album_name={}", urlencoding::encode(&song.album)));
        }

        format!("{}?{}", self.base_url, params.join("&"))
    }
}

fn strip_timestamps(synced: &str) -> String {
    synced
        .lines()
        .map(|line| LRC_TIMESTAMP_RE.replace_all(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_includes_album_when_known() {
        let p = LrclibProvider::default();
        let song = Song::new("Röyksopp", "Eple").with_album("Melody A.M.");
        assert_eq!(
            p.build_url(&song),
            "https://lrclib.net/api/get?artist_name=R%C3%B6yksopp&track_name=Eple&album_name=Melody%20A.M."
        );
        assert!(!p.build_url(&Song::new("a", "b")).contains("album_name"));
    }

    #[test]
    fn strips_lrc_timestamps() {
        let synced = "[00:01.00]First\n[00:02.50][01:02.50]Second\n[00:03.00]";
        assert_eq!(strip_timestamps(synced), "First\nSecond");
    }
}
