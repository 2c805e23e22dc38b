use crate::errors::{MarketDataError, RetryClass};

/// Result of one fetch attempt, classified for retry and fallback decisions.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome<T> {
    /// Fully parsed value.
    Success(T),
    /// Failed, but the same provider may succeed if asked again.
    Retriable(MarketDataError),
    /// Failed for good. Ends retrying for this attempt.
    Fatal(MarketDataError),
}

impl<T> FetchOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error(&self) -> Option<&MarketDataError> {
        match self {
            Self::Success(_) => None,
            Self::Retriable(e) | Self::Fatal(e) => Some(e),
        }
    }

    /// Converts a leftover `Retriable` into `Fatal`.
    pub fn into_terminal(self) -> Self {
        match self {
            Self::Retriable(e) => Self::Fatal(e),
            other => other,
        }
    }

    pub fn into_result(self) -> Result<T, MarketDataError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Retriable(e) | Self::Fatal(e) => Err(e),
        }
    }

    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }
}

impl<T> From<Result<T, MarketDataError>> for FetchOutcome<T> {
    fn from(result: Result<T, MarketDataError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) if e.retry_class() == RetryClass::WithBackoff => Self::Retriable(e),
            Err(e) => Self::Fatal(e),
        }
    }
}
