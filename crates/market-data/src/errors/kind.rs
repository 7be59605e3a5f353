/// Coarse failure signal reported by a provider call.
///
/// The aggregation layer only needs to know which of these happened to decide
/// between an explicit error response and fallback substitution.
///
/// | Kind | Caller behavior |
/// |------|-----------------|
/// | `NotConfigured` | Fail the request with a configuration error |
/// | `UpstreamUnavailable` | Substitute fallback data, log |
/// | `UpstreamError` | Substitute fallback data, log |
/// | `NoData` | Substitute fallback data (or an empty series) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// No credential configured for the provider.
    NotConfigured,

    /// Network failure, timeout, or non-2xx HTTP status.
    UpstreamUnavailable,

    /// Provider answered with an error payload or an unparseable body.
    UpstreamError,

    /// Provider answered successfully but with an empty or placeholder result.
    NoData,
}

impl FailureKind {
    /// Whether the caller may recover by substituting fallback data.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, FailureKind::NotConfigured)
    }
}
