// Paging module.
// Remote mediation over a local cache-of-record, the windowed pager, and the remote-only query source.

pub mod mediator;
pub mod pager;
pub mod query;
pub mod source;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use mediator::RemoteMediator;
pub use pager::Pager;
pub use query::{QueryPage, QuerySource};
pub use source::{FIRST_PAGE, PagedItem, QueryRemoteSource, RemoteSource};
pub use state::{LoadState, LoadStates, LoadType, MediatorResult, PagingSnapshot};
pub use store::{LocalStore, PagingMetadata, Row, StoreSnapshot, StoreTx};
