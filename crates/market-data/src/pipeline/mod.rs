//! Fetch pipeline: typed outcomes, bounded retry and provider fallback.
//!
//! ```text
//! FallbackChain<K>
//!   for provider in chain:
//!     RetryPolicy::execute(|attempt| K::fetch(provider, pair))
//!       Success   -> return
//!       Retriable -> sleep attempt * step, retry
//!       Fatal     -> next provider (or stop, for request-level errors)
//! ```

mod fallback;
mod outcome;
mod retry;
mod source;

pub use fallback::FallbackChain;
pub use outcome::FetchOutcome;
pub use retry::{RetryPolicy, DEFAULT_BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS};
pub use source::{FeedSource, FetchKind, OrderBook, SpotPrice, Ticker, ValidatedSource};
