//! Minimal song metadata used to look up info.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Song {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub year: Option<u32>,
    pub track: Option<u32>,
}

impl Song {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// A lookup needs at least an artist and a title.
    pub fn is_valid(&self) -> bool {
        !self.artist.trim().is_empty() && !self.title.trim().is_empty()
    }
}
