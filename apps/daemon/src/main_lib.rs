use pricefeed_market_data::{
    FeedFactory, FeedSnapshot, OrderBookFeed, OrderBookSnapshot, PriceFeed, Quote, TradingPair,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogFormat};

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).init(),
    }
}

/// Feeds running for one pair until [`Daemon::shutdown`].
pub struct Daemon {
    price: PriceFeed,
    book: OrderBookFeed,
    reporters: Vec<JoinHandle<()>>,
}

impl Daemon {
    pub fn start(factory: &FeedFactory, pair: TradingPair) -> Self {
        let price = factory.price_feed();
        let book = factory.order_book_feed();

        let reporters = vec![
            tokio::spawn(report_prices(price.subscribe())),
            tokio::spawn(report_books(book.subscribe())),
        ];

        price.start(pair.clone());
        book.start(pair);

        Self {
            price,
            book,
            reporters,
        }
    }

    pub fn shutdown(self) {
        self.price.stop();
        self.book.stop();
        for reporter in self.reporters {
            reporter.abort();
        }
    }
}

async fn report_prices(mut rx: watch::Receiver<FeedSnapshot<Quote>>) {
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.is_loading {
            continue;
        }
        match (&snapshot.value, &snapshot.error) {
            (Some(quote), None) => info!(
                pair = %quote.pair,
                price = %quote.price,
                source = %quote.source,
                "price"
            ),
            (_, Some(error)) => warn!(
                pair = ?snapshot.target.as_ref().map(|p| p.canonical()),
                price = %snapshot.price_or_sentinel(),
                stale = snapshot.is_stale(),
                kind = %error.kind,
                "price unavailable: {}",
                error.message
            ),
            (None, None) => {}
        }
    }
}

async fn report_books(mut rx: watch::Receiver<FeedSnapshot<OrderBookSnapshot>>) {
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.is_loading {
            continue;
        }
        if let Some(error) = &snapshot.error {
            warn!(kind = %error.kind, stale = snapshot.is_stale(), "order book unavailable: {}", error.message);
            continue;
        }
        let Some(book) = snapshot.book_or_empty() else {
            continue;
        };
        info!(
            pair = %book.pair,
            source = %book.source,
            bids = book.bids.len(),
            asks = book.asks.len(),
            best_bid = ?book.best_bid().map(|l| l.price),
            best_ask = ?book.best_ask().map(|l| l.price),
            spread = ?book.spread(),
            "order book"
        );
    }
}

/// Runs until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let factory = FeedFactory::from_settings(config.feed);
    info!(
        "Starting feeds for {} ({} valid pairs, allow unlisted: {})",
        config.pair,
        factory.validator().valid_pairs().len(),
        factory.validator().allow_unlisted()
    );

    let spot = factory.spot_fetcher()?;
    let max_attempts = factory.settings().max_attempts;
    let allow_unlisted = factory.settings().allow_unlisted;
    match spot.fetch(&config.pair, max_attempts, allow_unlisted).await {
        Some(quote) => info!("Spot {}: {}", quote.pair, serde_json::to_string(&quote)?),
        None => warn!("Spot price for {} unavailable", config.pair),
    }

    let daemon = Daemon::start(&factory, config.pair);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    daemon.shutdown();
    Ok(())
}
