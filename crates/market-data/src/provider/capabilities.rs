//! Provider capabilities.
//!
//! Describes which data kinds a provider can serve so the registry only
//! places it in fallback chains it can contribute to.

use crate::models::DataKind;

/// Describes the capabilities of a market data provider.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Data kinds this provider serves (spot, ticker, order book).
    pub data_kinds: &'static [DataKind],
}

impl ProviderCapabilities {
    pub fn supports(&self, kind: DataKind) -> bool {
        self.data_kinds.contains(&kind)
    }
}
