//! Consumer-facing feeds.
//!
//! - [`PollingFeed`] keeps one target up to date on a fixed interval and
//!   publishes [`FeedSnapshot`]s over a `watch` channel.
//! - [`SpotPriceFetcher`] answers single ad hoc quotes.
//! - [`FeedFactory`] builds both from [`FeedSettings`](crate::config::FeedSettings).

mod factory;
mod polling;
mod scheduler;
mod snapshot;
mod spot;

pub use factory::{FeedFactory, OrderBookFeed, PriceFeed};
pub use polling::PollingFeed;
pub use scheduler::ScheduledTask;
pub use snapshot::{FeedError, FeedSnapshot};
pub use spot::SpotPriceFetcher;
