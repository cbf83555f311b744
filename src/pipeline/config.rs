use std::time::Duration;

use crate::probe::ProbeOptions;

/// Caller-supplied knobs for [`VerificationPipeline`](super::VerificationPipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    pub connect_timeout: Duration,
    /// Deadline for the SMTP dialogue with one exchanger.
    pub probe_timeout: Duration,
    pub resolve_timeout: Duration,
    /// Upper bound of verifications in flight in a batch.
    pub max_concurrency: usize,
    /// Probe at most this many exchangers per address; `None` tries them all.
    /// `Some(0)` is read as `Some(1)`.
    pub max_exchangers: Option<usize>,
    /// When `false`, a domain with at least one exchanger is reported
    /// reachable without opening any SMTP session.
    pub probe_smtp: bool,
    pub port: u16,
    pub helo_domain: String,
    pub mail_from: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        let probe = ProbeOptions::default();
        Self {
            connect_timeout: probe.connect_timeout,
            probe_timeout: Duration::from_secs(10),
            resolve_timeout: Duration::from_secs(5),
            max_concurrency: 8,
            max_exchangers: None,
            probe_smtp: true,
            port: probe.port,
            helo_domain: probe.helo_domain,
            mail_from: probe.mail_from,
        }
    }
}

impl VerificationConfig {
    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            port: self.port,
            helo_domain: self.helo_domain.clone(),
            mail_from: self.mail_from.clone(),
            connect_timeout: self.connect_timeout,
            ..ProbeOptions::default()
        }
    }

    pub(crate) fn exchanger_limit(&self) -> usize {
        self.max_exchangers.unwrap_or(usize::MAX).max(1)
    }

    pub(crate) fn concurrency_limit(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
