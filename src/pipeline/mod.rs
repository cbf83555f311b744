//! Per-address verification: format check, MX resolution, then an SMTP probe
//! of each exchanger in priority order until one gives a definitive answer.
//! With [`VerificationConfig::probe_smtp`] off, the MX lookup alone decides.
//!
//! [`VerificationPipeline::verify`] never fails: every outcome, including
//! resolver and transport trouble, is expressed as a [`VerificationVerdict`].

mod batch;
mod config;
mod types;

pub use config::VerificationConfig;
pub use types::{VerdictReason, VerdictStatus, VerificationVerdict};

use tracing::{Instrument, debug, info, info_span};

use crate::probe::{ProbeResult, Prober, SmtpProber};
use crate::resolver::{ResolveExchangers, ResolverClient, ResolverInitError};
use crate::validator::validate_address;

/// Holds the resolver and prober used for every verification. Carries no
/// per-address state, so one instance serves concurrent calls.
pub struct VerificationPipeline<R = ResolverClient, P = SmtpProber> {
    resolver: R,
    prober: P,
    config: VerificationConfig,
}

impl VerificationPipeline {
    /// Pipeline backed by the system DNS configuration and a real SMTP prober.
    pub fn from_system_conf(config: VerificationConfig) -> Result<Self, ResolverInitError> {
        let resolver = ResolverClient::from_system_conf()?;
        let prober = SmtpProber::new(config.probe_options());
        Ok(Self::new(resolver, prober, config))
    }
}

impl<R, P> VerificationPipeline<R, P>
where
    R: ResolveExchangers,
    P: Prober,
{
    pub fn new(resolver: R, prober: P, config: VerificationConfig) -> Self {
        Self {
            resolver,
            prober,
            config,
        }
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    pub async fn verify(&self, address: &str) -> VerificationVerdict {
        let span = info_span!("verify", address);
        let verdict = self.run(address).instrument(span).await;
        info!(address, status = %verdict.status, reason = %verdict.reason, "verdict");
        verdict
    }

    async fn run(&self, address: &str) -> VerificationVerdict {
        let (local, domain) = match validate_address(address) {
            Ok(parts) => parts,
            Err(err) => {
                debug!(error = %err, "format check failed");
                return VerificationVerdict::invalid_format(address, err);
            }
        };
        let ascii_domain = match domain.to_ascii() {
            Ok(ascii) => ascii,
            Err(err) => return VerificationVerdict::invalid_format(address, err),
        };

        let exchangers = match self
            .resolver
            .resolve_exchangers(&ascii_domain, self.config.resolve_timeout)
            .await
        {
            Ok(exchangers) => exchangers,
            Err(err) => {
                debug!(error = %err, "no mail route");
                return VerificationVerdict::no_mail_route(address, err);
            }
        };

        if !self.config.probe_smtp {
            debug!(count = exchangers.len(), "SMTP probing disabled, MX lookup only");
            // resolve_exchangers never returns an empty list
            let preferred = exchangers.first().map(|mx| mx.hostname.as_str());
            return VerificationVerdict::mx_found(address, preferred.unwrap_or_default());
        }

        let candidate = format!("{local}@{ascii_domain}");
        let mut attempted = 0;
        for exchanger in exchangers.iter().take(self.config.exchanger_limit()) {
            attempted += 1;
            let result = self
                .prober
                .probe(exchanger, &candidate, self.config.probe_timeout)
                .await;
            match result {
                ProbeResult::Accepted => {
                    return VerificationVerdict::reachable(address, &exchanger.hostname);
                }
                ProbeResult::Rejected(code) => {
                    return VerificationVerdict::rejected(address, code, &exchanger.hostname);
                }
                other => {
                    info!(
                        host = %exchanger.hostname,
                        priority = exchanger.priority,
                        result = %other,
                        "no definitive answer, moving on"
                    );
                }
            }
        }

        VerificationVerdict::indeterminate(address, attempted)
    }
}

#[cfg(test)]
mod tests;
