use std::borrow::Cow;
use std::sync::Arc;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Asset symbol (e.g. "BTC", "USD"), always uppercase
pub type Symbol = Arc<str>;
