use once_cell::sync::Lazy;
use reqwest::Client;
use thiserror::Error;

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("songinfo/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_default()
});

#[derive(Error, Debug)]
pub enum SongInfoError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<quick_xml::events::attributes::AttrError> for SongInfoError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        SongInfoError::Xml(e.into())
    }
}

// Re-export HTTP client for providers within the songinfo module
pub(crate) fn http_client() -> &'static Client {
    &HTTP_CLIENT
}
