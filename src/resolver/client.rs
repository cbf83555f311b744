use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf::read_system_conf,
};

use super::{MailExchanger, ResolutionError, ResolverInitError};

/// Resolves the mail exchangers of a domain. This is the seam the
/// verification pipeline depends on.
#[async_trait]
pub trait ResolveExchangers: Send + Sync {
    /// Returns the exchangers of `ascii_domain`, preferred first. An empty
    /// answer is reported as [`ResolutionError::NoRoute`].
    async fn resolve_exchangers(
        &self,
        ascii_domain: &str,
        timeout: Duration,
    ) -> Result<Vec<MailExchanger>, ResolutionError>;
}

/// MX lookups through the system-configured DNS resolver.
#[derive(Clone)]
pub struct ResolverClient {
    resolver: TokioAsyncResolver,
}

impl ResolverClient {
    /// Builds a client from `/etc/resolv.conf` (or the platform equivalent).
    /// Retries are disabled: one query attempt per lookup.
    pub fn from_system_conf() -> Result<Self, ResolverInitError> {
        let (config, opts) = read_system_conf().map_err(ResolverInitError::system_conf)?;
        Ok(Self::with_config(config, opts))
    }

    pub fn with_config(config: ResolverConfig, mut opts: ResolverOpts) -> Self {
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl ResolveExchangers for ResolverClient {
    async fn resolve_exchangers(
        &self,
        ascii_domain: &str,
        timeout: Duration,
    ) -> Result<Vec<MailExchanger>, ResolutionError> {
        resolve_with(&self.resolver, ascii_domain, timeout).await
    }
}

pub(crate) async fn resolve_with<R>(
    resolver: &R,
    ascii_domain: &str,
    timeout: Duration,
) -> Result<Vec<MailExchanger>, ResolutionError>
where
    R: LookupMx + ?Sized,
{
    debug!(domain = ascii_domain, ?timeout, "MX lookup");
    let lookup = tokio::time::timeout(timeout, resolver.lookup_mx(ascii_domain))
        .await
        .map_err(|_| ResolutionError::timeout(ascii_domain, timeout))?;

    let mut exchangers =
        lookup.map_err(|err| classify_lookup_error(ascii_domain, timeout, &err))?;

    // null MX (RFC 7505) normalises to an empty hostname
    exchangers.retain(|mx| !mx.hostname.is_empty());
    exchangers.sort();
    exchangers.dedup();

    if exchangers.is_empty() {
        return Err(ResolutionError::no_route(ascii_domain, "no MX records"));
    }
    debug!(domain = ascii_domain, count = exchangers.len(), "MX lookup done");
    Ok(exchangers)
}

fn classify_lookup_error(domain: &str, timeout: Duration, err: &ResolveError) -> ResolutionError {
    match err.kind() {
        ResolveErrorKind::Timeout => ResolutionError::timeout(domain, timeout),
        ResolveErrorKind::NoRecordsFound { .. } => {
            ResolutionError::no_route(domain, "no MX records")
        }
        _ => ResolutionError::no_route(domain, err.to_string()),
    }
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

#[async_trait]
pub(crate) trait LookupMx: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, ResolveError>;
}

#[async_trait]
impl LookupMx for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, ResolveError> {
        let lookup = self.mx_lookup(domain).await?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let hostname = normalize_exchange(&mx.exchange().to_utf8());
            records.push(MailExchanger::new(hostname, mx.preference()));
        }
        Ok(records)
    }
}
