//! Reader for the lyrics provider catalog.
//!
//! The catalog is an XML document listing one `<provider>` per scraper:
//!
//! ```text
//! <lyricproviders>
//!   <provider name="..." title="..." charset="utf-8" url="http://.../{Artist}/{Title}">
//!     <urlFormat replace=" " with="_"/>
//!     <extract><item begin="..." end="..."/></extract>
//!     <exclude><item tag="&lt;div class='ad'&gt;"/></exclude>
//!     <invalidIndicator value="..."/>
//!   </provider>
//! </lyricproviders>
//! ```
//!
//! Parsing is blocking work, so [`spawn_catalog_load`] runs it on tokio's
//! blocking pool and hands the result back through a `JoinHandle`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tokio::task::JoinHandle;

use crate::songinfo::provider::SongInfoProvider;
use crate::songinfo::types::SongInfoError;
use crate::songinfo::ultimate::{Rule, RuleItem, UltimateLyricsProvider, UrlFormat};

/// Catalog shipped with the binary.
pub const BUNDLED_CATALOG: &str = include_str!("../../data/ultimate_providers.xml");

/// Where to read the catalog from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Bundled,
    File(PathBuf),
}

#[derive(Debug, Default)]
pub struct UltimateLyricsReader;

impl UltimateLyricsReader {
    pub fn parse_file(&self, path: &Path) -> Result<Vec<SongInfoProvider>, SongInfoError> {
        let contents = std::fs::read_to_string(path)?;
        self.parse_str(&contents)
    }

    pub fn parse_source(&self, source: &CatalogSource) -> Result<Vec<SongInfoProvider>, SongInfoError> {
        match source {
            CatalogSource::Bundled => self.parse_str(BUNDLED_CATALOG),
            CatalogSource::File(path) => self.parse_file(path),
        }
    }

    pub fn parse_str(&self, xml: &str) -> Result<Vec<SongInfoProvider>, SongInfoError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut providers = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"provider" => {
                    let provider = parse_provider(&mut reader, &e, false)?;
                    push_named(&mut providers, provider);
                }
                Event::Empty(e) if e.name().as_ref() == b"provider" => {
                    let provider = parse_provider(&mut reader, &e, true)?;
                    push_named(&mut providers, provider);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(providers)
    }
}

fn push_named(providers: &mut Vec<SongInfoProvider>, provider: UltimateLyricsProvider) {
    if provider.name.is_empty() {
        tracing::warn!(url = %provider.url, "Skipping lyrics provider without a name");
        return;
    }
    providers.push(SongInfoProvider::ultimate(provider));
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, SongInfoError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            let value: Cow<'_, str> = attr.unescape_value().map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_provider(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<UltimateLyricsProvider, SongInfoError> {
    let mut provider = UltimateLyricsProvider::new(attribute(start, b"name")?.unwrap_or_default());
    provider.title = attribute(start, b"title")?.unwrap_or_default();
    provider.url = attribute(start, b"url")?.unwrap_or_default();
    if let Some(charset) = attribute(start, b"charset")?.filter(|c| !c.is_empty()) {
        provider.charset = charset;
    }
    if empty {
        return Ok(provider);
    }

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"extract" => provider.extract_rules.push(parse_rule(reader, b"extract")?),
                b"exclude" => provider.exclude_rules.push(parse_rule(reader, b"exclude")?),
                b"urlFormat" => {
                    provider.url_formats.push(parse_url_format(&e)?);
                    reader.read_to_end(e.name())?;
                }
                b"invalidIndicator" => {
                    push_indicator(&mut provider, &e)?;
                    reader.read_to_end(e.name())?;
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"urlFormat" => provider.url_formats.push(parse_url_format(&e)?),
                b"invalidIndicator" => push_indicator(&mut provider, &e)?,
                // An empty rule element matches nothing; keep it out.
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"provider" => break,
            Event::Eof => {
                return Err(SongInfoError::Catalog(format!(
                    "unterminated provider '{}'",
                    provider.name
                )));
            }
            _ => {}
        }
    }
    Ok(provider)
}

fn parse_url_format(e: &BytesStart<'_>) -> Result<UrlFormat, SongInfoError> {
    Ok(UrlFormat {
        replace: attribute(e, b"replace")?.unwrap_or_default(),
        with: attribute(e, b"with")?.unwrap_or_default(),
    })
}

fn push_indicator(provider: &mut UltimateLyricsProvider, e: &BytesStart<'_>) -> Result<(), SongInfoError> {
    if let Some(value) = attribute(e, b"value")?.filter(|v| !v.is_empty()) {
        provider.invalid_indicators.push(value);
    }
    Ok(())
}

fn parse_rule_item(e: &BytesStart<'_>) -> Result<Option<RuleItem>, SongInfoError> {
    if let Some(tag) = attribute(e, b"tag")? {
        return Ok(Some(RuleItem::Tag(tag)));
    }
    if let Some(begin) = attribute(e, b"begin")? {
        let end = attribute(e, b"end")?.unwrap_or_default();
        return Ok(Some(RuleItem::Range { begin, end }));
    }
    Ok(None)
}

fn parse_rule(reader: &mut Reader<&[u8]>, element: &[u8]) -> Result<Rule, SongInfoError> {
    let mut rule = Rule::new();
    loop {
        match reader.read_event()? {
            Event::Empty(e) if e.name().as_ref() == b"item" => {
                rule.extend(parse_rule_item(&e)?);
            }
            Event::Start(e) => {
                if e.name().as_ref() == b"item" {
                    rule.extend(parse_rule_item(&e)?);
                }
                reader.read_to_end(e.name())?;
            }
            Event::End(e) if e.name().as_ref() == element => break,
            Event::Eof => {
                return Err(SongInfoError::Catalog("unterminated rule".to_string()));
            }
            _ => {}
        }
    }
    Ok(rule)
}

/// Parse the catalog once on the blocking pool.
pub fn spawn_catalog_load(
    source: CatalogSource,
) -> JoinHandle<Result<Vec<SongInfoProvider>, SongInfoError>> {
    tokio::task::spawn_blocking(move || {
        let providers = UltimateLyricsReader.parse_source(&source)?;
        tracing::info!(providers = providers.len(), "Parsed lyrics catalog");
        Ok(providers)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<lyricproviders>
  <provider name="lyrics.wikia.com" title="LyricWiki" charset="utf-8" url="http://lyrics.wikia.com/{Artist}:{Title}">
    <urlFormat replace=" _@;\&quot;" with="_"/>
    <urlFormat replace="?" with="%3F"/>
    <extract>
      <item tag="&lt;div class='lyricbox'&gt;"/>
    </extract>
    <exclude>
      <item tag="&lt;div class='rtMatcher'&gt;"/>
    </exclude>
    <exclude>
      <item begin="&lt;!--" end="--&gt;"/>
    </exclude>
    <invalidIndicator value="PUTLYRICSHERE"/>
  </provider>
  <provider title="Nameless" url="http://nowhere/{title}"/>
  <provider name="teksty.org" title="teksty.org" charset="iso-8859-2" url="http://teksty.org/{artist},{title},tekst-piosenki">
    <extract>
      <item begin="&lt;div class=&quot;songText&quot;&gt;" end="&lt;/div&gt;"/>
    </extract>
  </provider>
</lyricproviders>
"#;

    #[test]
    fn parses_providers_and_rules() {
        let providers = UltimateLyricsReader.parse_str(SAMPLE).unwrap();
        assert_eq!(providers.len(), 2);

        let wikia = providers[0].as_ultimate().unwrap();
        assert_eq!(wikia.name, "lyrics.wikia.com");
        assert_eq!(wikia.title, "LyricWiki");
        assert_eq!(wikia.url, "http://lyrics.wikia.com/{Artist}:{Title}");
        assert_eq!(wikia.url_formats.len(), 2);
        assert_eq!(wikia.url_formats[0].replace, " _@;\\\"");
        assert_eq!(wikia.url_formats[1].with, "%3F");
        assert_eq!(
            wikia.extract_rules,
            vec![vec![RuleItem::Tag("<div class='lyricbox'>".to_string())]]
        );
        assert_eq!(wikia.exclude_rules.len(), 2);
        assert_eq!(
            wikia.exclude_rules[1],
            vec![RuleItem::Range { begin: "<!--".to_string(), end: "-->".to_string() }]
        );
        assert_eq!(wikia.invalid_indicators, vec!["PUTLYRICSHERE".to_string()]);
        assert!(providers[0].is_enabled());

        let teksty = providers[1].as_ultimate().unwrap();
        assert_eq!(teksty.charset, "iso-8859-2");
        assert_eq!(
            teksty.extract_rules[0],
            vec![RuleItem::Range {
                begin: "<div class=\"songText\">".to_string(),
                end: "</div>".to_string()
            }]
        );
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let err = UltimateLyricsReader
            .parse_str("<lyricproviders><provider name=\"x\"><extract>")
            .unwrap_err();
        assert!(matches!(err, SongInfoError::Catalog(_) | SongInfoError::Xml(_)));
    }

    #[test]
    fn bundled_catalog_covers_default_order() {
        let providers = UltimateLyricsReader.parse_str(BUNDLED_CATALOG).unwrap();
        for name in crate::songinfo::ordering::DEFAULT_SEARCH_ORDER {
            assert!(
                crate::songinfo::ordering::provider_by_name(&providers, name).is_some(),
                "bundled catalog is missing {name}"
            );
        }
    }

    #[tokio::test]
    async fn loads_file_in_background() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let providers = spawn_catalog_load(CatalogSource::File(file.path().to_path_buf()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(providers.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_reports_io_error() {
        let result = spawn_catalog_load(CatalogSource::File(PathBuf::from("/nonexistent/catalog.xml")))
            .await
            .unwrap();
        assert!(matches!(result, Err(SongInfoError::Io(_))));
    }
}
