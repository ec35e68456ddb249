//! Song info view, its providers and their ordering.

pub mod catalog;
pub mod event;
pub mod fetcher;
pub mod ordering;
pub mod provider;
pub mod providers;
pub mod settings;
pub mod song;
pub mod types;
pub mod ultimate;
pub mod view;

pub use catalog::CatalogSource;
pub use event::ViewEvent;
pub use provider::SongInfoProvider;
pub use settings::{SettingsStore, SongInfoSettings};
pub use song::Song;
pub use types::SongInfoError;
pub use view::SongInfoView;
