use std::time::Duration;

use thiserror::Error;

/// Expected lookup outcomes that mean "no usable mail route". Neither variant
/// is a crash condition; the pipeline turns both into a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no mail route for {domain}: {reason}")]
    NoRoute { domain: String, reason: String },
    #[error("MX lookup for {domain} timed out after {timeout:?}")]
    Timeout { domain: String, timeout: Duration },
}

impl ResolutionError {
    pub(crate) fn no_route(domain: &str, reason: impl Into<String>) -> Self {
        Self::NoRoute {
            domain: domain.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn timeout(domain: &str, timeout: Duration) -> Self {
        Self::Timeout {
            domain: domain.to_string(),
            timeout,
        }
    }
}

#[derive(Debug, Error)]
#[error("resolver initialization failed: {source}")]
pub struct ResolverInitError {
    #[source]
    source: std::io::Error,
}

impl ResolverInitError {
    pub(crate) fn system_conf(source: std::io::Error) -> Self {
        Self { source }
    }
}
