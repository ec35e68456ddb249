use crate::songinfo::fetcher::FetchResult;
use crate::songinfo::provider::SongInfoProvider;
use crate::songinfo::types::SongInfoError;

/// Everything delivered back to the view's event loop.
#[derive(Debug)]
pub enum ViewEvent {
    CatalogParsed(Result<Vec<SongInfoProvider>, SongInfoError>),
    ResultReady(u64, FetchResult),
    Shutdown,
}
