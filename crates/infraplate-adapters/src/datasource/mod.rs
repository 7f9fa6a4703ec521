//! Data source adapters.

mod http;
mod snapshot;

pub use http::{DEFAULT_TIMEOUT, HttpDataSource};
pub use snapshot::SnapshotDataSource;
