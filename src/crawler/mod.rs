//! Crawl engine: fetcher, frontier, and orchestration

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::Crawler;
pub use fetcher::{
    classify, AttemptOutcome, Decision, FetchKind, FetchResult, Fetcher, HttpTransport,
    RawResponse, Transport, TransportError, MAX_ATTEMPTS,
};
pub use frontier::{CrawlReport, Frontier};
