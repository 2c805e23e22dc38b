use serde::Serialize;

/// Kind of market data a provider can serve.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataKind {
    /// Reference spot price (e.g. Coinbase `/prices/{pair}/spot`).
    Spot,
    /// Last traded price on an exchange.
    Ticker,
    /// Level-2 aggregated order book.
    OrderBook,
}

impl DataKind {
    /// Operation name used in logs and `NotSupported` errors.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Spot => "spot_price",
            Self::Ticker => "ticker",
            Self::OrderBook => "order_book",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.operation())
    }
}
