//! Scraping lyric providers described by the lyrics catalog.
//!
//! Each provider is a URL template plus a set of text rules. The page behind
//! the URL is downloaded, cut down to the lyrics with the extract rules, and
//! cleaned with the exclude rules.
//!
//! # Rule items
//!
//! - `Range { begin, end }`: keep (or drop) the text between two markers
//! - `Tag(open)`: same, with the end marker derived from the tag name, so
//!   `<div class='lyricbox'>` pairs with `</div>`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::songinfo::fetcher::InfoPane;
use crate::songinfo::song::Song;
use crate::songinfo::types::{SongInfoError, http_client};

static TAG_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(\w+).*>").unwrap());
static BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static ANY_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleItem {
    Tag(String),
    Range { begin: String, end: String },
}

pub type Rule = Vec<RuleItem>;

/// Characters in `replace` are each substituted with `with` before a value
/// goes into the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFormat {
    pub replace: String,
    pub with: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UltimateLyricsProvider {
    pub name: String,
    pub title: String,
    pub url: String,
    pub charset: String,
    pub url_formats: Vec<UrlFormat>,
    pub extract_rules: Vec<Rule>,
    pub exclude_rules: Vec<Rule>,
    pub invalid_indicators: Vec<String>,
    relevance: i32,
}

impl Default for UltimateLyricsProvider {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            url: String::new(),
            charset: "utf-8".to_string(),
            url_formats: Vec::new(),
            extract_rules: Vec::new(),
            exclude_rules: Vec::new(),
            invalid_indicators: Vec::new(),
            relevance: 0,
        }
    }
}

impl UltimateLyricsProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn relevance(&self) -> i32 {
        self.relevance
    }

    pub fn set_relevance(&mut self, relevance: i32) {
        self.relevance = relevance;
    }

    /// Fill the URL template with the song's metadata.
    pub fn build_url(&self, song: &Song) -> String {
        let artist_lower = song.artist.to_lowercase();
        let album_lower = song.album.to_lowercase();
        let year = song.year.map(|y| y.to_string()).unwrap_or_default();
        let track = song.track.map(|t| t.to_string()).unwrap_or_default();
        let first_char = song
            .artist
            .chars()
            .next()
            .map(|c| c.to_lowercase().to_string())
            .unwrap_or_default();

        let replacements: [(&str, String); 13] = [
            ("{artist}", artist_lower.clone()),
            ("{artist2}", no_space(&artist_lower)),
            ("{album}", album_lower.clone()),
            ("{album2}", no_space(&album_lower)),
            ("{title}", song.title.to_lowercase()),
            ("{Artist}", song.artist.clone()),
            ("{Album}", song.album.clone()),
            ("{ARTIST}", song.artist.to_uppercase()),
            ("{year}", year),
            ("{Title}", song.title.clone()),
            ("{Title2}", title_case(&song.title)),
            ("{a}", first_char),
            ("{track}", track),
        ];

        let mut url = self.url.clone();
        for (tag, value) in replacements.iter() {
            if url.contains(*tag) {
                url = url.replace(*tag, &self.format_url_value(value));
            }
        }
        url
    }

    /// Characters matched by a url format become its `with` text verbatim;
    /// everything else is percent-encoded.
    fn format_url_value(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut buf = [0u8; 4];
        for c in value.chars() {
            match self.url_formats.iter().find(|f| f.replace.contains(c)) {
                Some(format) => out.push_str(&format.with),
                None => out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf))),
            }
        }
        out
    }

    /// Cut the lyrics out of a downloaded page.
    ///
    /// Returns `None` when the page carries an invalid indicator or no
    /// extract rule matches.
    pub fn extract(&self, page: &str) -> Option<String> {
        if self
            .invalid_indicators
            .iter()
            .any(|indicator| !indicator.is_empty() && page.contains(indicator.as_str()))
        {
            return None;
        }

        let mut lyrics = self
            .extract_rules
            .iter()
            .map(|rule| apply_extract_rule(rule, page))
            .find(|content| !content.is_empty())?;

        for rule in &self.exclude_rules {
            lyrics = apply_exclude_rule(rule, &lyrics);
        }

        let lyrics = lyrics.trim().to_string();
        if lyrics.is_empty() { None } else { Some(lyrics) }
    }

    pub async fn fetch(&self, song: &Song) -> Result<Option<InfoPane>, SongInfoError> {
        let url = self.build_url(song);
        tracing::debug!(provider = %self.name, url = %url, "Fetching lyrics page");

        let resp = http_client().get(&url).send().await?;

        // 404 means no lyrics found - not an error
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }

        if !resp.status().is_success() {
            return Err(SongInfoError::Api(format!(
                "{}: HTTP {}",
                self.name,
                resp.status()
            )));
        }

        let page = resp.text_with_charset(&self.charset).await?;
        Ok(self.extract(&page).map(|lyrics| InfoPane {
            title: "Lyrics".to_string(),
            provider: self.title.clone(),
            body: html_to_text(&lyrics),
            relevance: self.relevance,
        }))
    }
}

fn no_space(text: &str) -> String {
    text.chars().filter(|c| *c != ' ').collect()
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for c in text.chars() {
        if last_was_space {
            out.extend(c.to_uppercase());
            last_was_space = false;
        } else {
            if c.is_whitespace() {
                last_was_space = true;
            }
            out.push(c);
        }
    }
    out
}

/// End marker for a `Tag` item: `<div class='x'>` closes with `</div>`.
fn closing_tag(tag: &str) -> Option<String> {
    TAG_NAME_RE
        .captures(tag)
        .and_then(|cap| cap.get(1))
        .map(|name| format!("</{}>", name.as_str()))
}

fn extract_between(source: &str, begin: &str, end: &str) -> String {
    let Some(begin_idx) = source.find(begin) else {
        return String::new();
    };
    let start = begin_idx + begin.len();
    match source[start..].find(end) {
        Some(len) => source[start..start + len].to_string(),
        None => String::new(),
    }
}

fn exclude_between(source: &str, begin: &str, end: &str) -> String {
    let Some(begin_idx) = source.find(begin) else {
        return source.to_string();
    };
    let after_begin = begin_idx + begin.len();
    match source[after_begin..].find(end) {
        Some(len) => {
            let end_idx = after_begin + len + end.len();
            format!("{}{}", &source[..begin_idx], &source[end_idx..])
        }
        None => source.to_string(),
    }
}

fn apply_extract_rule(rule: &Rule, source: &str) -> String {
    let mut content = source.to_string();
    for item in rule {
        content = match item {
            RuleItem::Tag(tag) => match closing_tag(tag) {
                Some(end) => extract_between(&content, tag, &end),
                None => String::new(),
            },
            RuleItem::Range { begin, end } => extract_between(&content, begin, end),
        };
    }
    content
}

fn apply_exclude_rule(rule: &Rule, source: &str) -> String {
    let mut content = source.to_string();
    for item in rule {
        content = match item {
            RuleItem::Tag(tag) => match closing_tag(tag) {
                Some(end) => exclude_between(&content, tag, &end),
                None => content,
            },
            RuleItem::Range { begin, end } => exclude_between(&content, begin, end),
        };
    }
    content
}

/// Flatten scraped HTML into plain text lines.
pub fn html_to_text(html: &str) -> String {
    let with_breaks = BREAK_RE.replace_all(html, "\n");
    let stripped = ANY_TAG_RE.replace_all(&with_breaks, "");
    let text = stripped
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
