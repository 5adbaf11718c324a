//! Upstream Module
//!
//! Provider request parameters, retry backoff, and the retrying HTTP fetcher.

mod backoff;
mod fetcher;
mod params;

pub use backoff::Backoff;
pub use fetcher::UpstreamFetcher;
pub use params::{Endpoint, FetchParams, Location, Units};
