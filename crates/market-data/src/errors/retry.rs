/// Classification for retry and fallback policy.
///
/// Used by [`RetryPolicy`](crate::pipeline::RetryPolicy) to decide whether to
/// back off and call the same provider again, and by
/// [`FallbackChain`](crate::pipeline::FallbackChain) to decide whether the
/// next provider should be tried.
///
/// # Behavior Summary
///
/// | Class | Retry same provider? | Try next provider? | Circuit breaker penalty? |
/// |-------|----------------------|--------------------|--------------------------|
/// | `WithBackoff` | Yes, until attempts run out | Yes | Yes, once exhausted |
/// | `NextProvider` | No | Yes | No |
/// | `Never` | No | No | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure (timeout, connection reset, 5xx, 429, garbage body).
    /// Back off and call the same provider again.
    WithBackoff,

    /// This provider cannot serve the request (malformed payload, open
    /// circuit, unsupported kind), but another provider might.
    NextProvider,

    /// The request itself is invalid (unknown pair upstream, rejected
    /// locally). Nothing will fix it downstream.
    Never,
}
