use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use super::*;
use crate::resolver::{MailExchanger, ResolutionError};

type ResolveFn = dyn Fn(&str) -> Result<Vec<MailExchanger>, ResolutionError> + Send + Sync;
type ProbeFn = dyn Fn(&MailExchanger) -> ProbeResult + Send + Sync;

struct MockResolver {
    calls: AtomicUsize,
    on_resolve: Box<ResolveFn>,
}

impl MockResolver {
    fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<MailExchanger>, ResolutionError> + Send + Sync + 'static,
    {
        Self {
            calls: AtomicUsize::new(0),
            on_resolve: Box::new(f),
        }
    }

    fn exchangers(hosts: &[&'static str]) -> Self {
        let records: Vec<MailExchanger> = hosts
            .iter()
            .enumerate()
            .map(|(i, host)| MailExchanger::new(*host, (i as u16 + 1) * 10))
            .collect();
        Self::new(move |_| Ok(records.clone()))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResolveExchangers for MockResolver {
    async fn resolve_exchangers(
        &self,
        ascii_domain: &str,
        _timeout: Duration,
    ) -> Result<Vec<MailExchanger>, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.on_resolve)(ascii_domain)
    }
}

struct MockProber {
    probed: Mutex<Vec<String>>,
    on_probe: Box<ProbeFn>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProber {
    fn new<F>(f: F) -> Self
    where
        F: Fn(&MailExchanger) -> ProbeResult + Send + Sync + 'static,
    {
        Self {
            probed: Mutex::new(Vec::new()),
            on_probe: Box::new(f),
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn always(result: ProbeResult) -> Self {
        Self::new(move |_| result)
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn probed(&self) -> Vec<String> {
        self.probed.lock().expect("probe log").clone()
    }

    fn calls(&self) -> usize {
        self.probed.lock().expect("probe log").len()
    }
}

#[async_trait]
impl Prober for MockProber {
    async fn probe(
        &self,
        exchanger: &MailExchanger,
        candidate: &str,
        _timeout: Duration,
    ) -> ProbeResult {
        self.probed
            .lock()
            .expect("probe log")
            .push(format!("{}:{candidate}", exchanger.hostname));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.on_probe)(exchanger)
    }
}

fn pipeline(
    resolver: MockResolver,
    prober: MockProber,
) -> VerificationPipeline<MockResolver, MockProber> {
    VerificationPipeline::new(resolver, prober, VerificationConfig::default())
}

#[tokio::test]
async fn malformed_address_is_invalid_format_without_io() {
    let p = pipeline(
        MockResolver::exchangers(&["mx1.example.com"]),
        MockProber::always(ProbeResult::Accepted),
    );

    for address in [
        "not-an-email",
        "a@@example.com",
        "a@b@example.com",
        "user@localhost",
        "us er@example.com",
        "@example.com",
        "",
    ] {
        let verdict = p.verify(address).await;
        assert_eq!(verdict.status, VerdictStatus::Unreachable, "{address}");
        assert_eq!(verdict.reason, VerdictReason::InvalidFormat, "{address}");
        assert_eq!(verdict.address, address);
    }
    assert_eq!(p.resolver.calls(), 0);
    assert_eq!(p.prober.calls(), 0);
}

#[tokio::test]
async fn domain_without_mx_is_no_mail_route() {
    let p = pipeline(
        MockResolver::new(|domain| {
            assert_eq!(domain, "nonexistent-domain.invalid");
            Err(ResolutionError::NoRoute {
                domain: domain.to_string(),
                reason: "no MX records".to_string(),
            })
        }),
        MockProber::always(ProbeResult::Accepted),
    );

    let verdict = p.verify("user@nonexistent-domain.invalid").await;
    assert_eq!(verdict.status, VerdictStatus::Unreachable);
    assert_eq!(verdict.reason, VerdictReason::NoMailRoute);
    assert!(verdict.detail.as_deref().unwrap_or("").contains("no MX records"));
    assert_eq!(p.prober.calls(), 0);
}

#[tokio::test]
async fn resolver_timeout_is_no_mail_route() {
    let p = pipeline(
        MockResolver::new(|domain| {
            Err(ResolutionError::Timeout {
                domain: domain.to_string(),
                timeout: Duration::from_secs(5),
            })
        }),
        MockProber::always(ProbeResult::Accepted),
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Unreachable);
    assert_eq!(verdict.reason, VerdictReason::NoMailRoute);
}

#[tokio::test]
async fn first_accepting_exchanger_wins() {
    let p = pipeline(
        MockResolver::exchangers(&["mx1.example.com", "mx2.example.com"]),
        MockProber::always(ProbeResult::Accepted),
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Reachable);
    assert_eq!(verdict.reason, VerdictReason::Accepted);
    assert_eq!(verdict.exchanger.as_deref(), Some("mx1.example.com"));
    assert_eq!(p.prober.probed(), vec!["mx1.example.com:user@example.com"]);
}

#[tokio::test]
async fn negative_code_is_unreachable_with_code() {
    let p = pipeline(
        MockResolver::exchangers(&["mx1.example.com", "mx2.example.com"]),
        MockProber::always(ProbeResult::Rejected(550)),
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Unreachable);
    assert_eq!(verdict.reason, VerdictReason::Rejected { code: 550 });
    assert_eq!(verdict.rejection_code(), Some(550));
    assert_eq!(p.prober.calls(), 1);
}

#[tokio::test]
async fn transport_failures_fall_through_to_next_exchanger() {
    let p = pipeline(
        MockResolver::exchangers(&["mx1.example.com", "mx2.example.com", "mx3.example.com"]),
        MockProber::new(|mx| match mx.hostname.as_str() {
            "mx1.example.com" => ProbeResult::ConnectionFailed,
            "mx2.example.com" => ProbeResult::ProtocolError,
            _ => ProbeResult::Accepted,
        }),
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Reachable);
    assert_eq!(verdict.exchanger.as_deref(), Some("mx3.example.com"));
    assert_eq!(
        p.prober.probed(),
        vec![
            "mx1.example.com:user@example.com",
            "mx2.example.com:user@example.com",
            "mx3.example.com:user@example.com",
        ]
    );
}

#[tokio::test]
async fn every_exchanger_timing_out_is_indeterminate() {
    let p = pipeline(
        MockResolver::exchangers(&["mx1.example.com", "mx2.example.com"]),
        MockProber::new(|mx| {
            if mx.hostname == "mx1.example.com" {
                ProbeResult::TimedOut
            } else {
                ProbeResult::ConnectionFailed
            }
        }),
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Indeterminate);
    assert_eq!(verdict.reason, VerdictReason::AllExchangersUnreachable);
    assert_eq!(p.prober.calls(), 2);
}

#[tokio::test]
async fn exchanger_limit_caps_attempts() {
    let config = VerificationConfig {
        max_exchangers: Some(1),
        ..VerificationConfig::default()
    };
    let p = VerificationPipeline::new(
        MockResolver::exchangers(&["mx1.example.com", "mx2.example.com"]),
        MockProber::always(ProbeResult::TimedOut),
        config,
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Indeterminate);
    assert_eq!(p.prober.calls(), 1);
}

#[tokio::test]
async fn zero_exchanger_limit_still_probes_one() {
    let config = VerificationConfig {
        max_exchangers: Some(0),
        ..VerificationConfig::default()
    };
    let p = VerificationPipeline::new(
        MockResolver::exchangers(&["mx1.example.com", "mx2.example.com"]),
        MockProber::always(ProbeResult::TimedOut),
        config,
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Indeterminate);
    assert_eq!(p.prober.calls(), 1);
}

#[tokio::test]
async fn mx_only_reports_reachable_without_smtp() {
    let config = VerificationConfig {
        probe_smtp: false,
        ..VerificationConfig::default()
    };
    let p = VerificationPipeline::new(
        MockResolver::new(|_| {
            Ok(vec![
                MailExchanger::new("mx1.example.com", 10),
                MailExchanger::new("mx2.example.com", 20),
            ])
        }),
        MockProber::always(ProbeResult::Rejected(550)),
        config,
    );

    let verdict = p.verify("user@example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Reachable);
    assert_eq!(verdict.reason, VerdictReason::MxFound);
    assert_eq!(verdict.exchanger.as_deref(), Some("mx1.example.com"));
    assert_eq!(p.resolver.calls(), 1);
    assert_eq!(p.prober.calls(), 0);
}

#[tokio::test]
async fn mx_only_keeps_format_and_route_checks() {
    let config = VerificationConfig {
        probe_smtp: false,
        ..VerificationConfig::default()
    };
    let p = VerificationPipeline::new(
        MockResolver::new(|domain| {
            Err(ResolutionError::NoRoute {
                domain: domain.to_string(),
                reason: "NXDOMAIN".to_string(),
            })
        }),
        MockProber::always(ProbeResult::Accepted),
        config,
    );

    let invalid = p.verify("not-an-email").await;
    assert_eq!(invalid.reason, VerdictReason::InvalidFormat);
    let no_route = p.verify("user@nonexistent-domain.invalid").await;
    assert_eq!(no_route.status, VerdictStatus::Unreachable);
    assert_eq!(no_route.reason, VerdictReason::NoMailRoute);
    assert_eq!(p.prober.calls(), 0);
}

#[tokio::test]
async fn idn_domain_is_probed_in_ascii_form() {
    let p = pipeline(
        MockResolver::new(|domain| {
            assert_eq!(domain, "xn--exmple-cua.com");
            Ok(vec![MailExchanger::new("mx.xn--exmple-cua.com", 10)])
        }),
        MockProber::always(ProbeResult::Accepted),
    );

    let verdict = p.verify("user@exämple.com").await;
    assert_eq!(verdict.status, VerdictStatus::Reachable);
    assert_eq!(verdict.address, "user@exämple.com");
    assert_eq!(
        p.prober.probed(),
        vec!["mx.xn--exmple-cua.com:user@xn--exmple-cua.com"]
    );
}

#[tokio::test]
async fn verify_is_idempotent() {
    let p = pipeline(
        MockResolver::exchangers(&["mx1.example.com", "mx2.example.com"]),
        MockProber::new(|mx| {
            if mx.hostname == "mx1.example.com" {
                ProbeResult::TimedOut
            } else {
                ProbeResult::Rejected(551)
            }
        }),
    );

    let first = p.verify("user@example.com").await;
    let second = p.verify("user@example.com").await;
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn batch_respects_concurrency_bound() {
    let config = VerificationConfig {
        max_concurrency: 3,
        ..VerificationConfig::default()
    };
    let p = VerificationPipeline::new(
        MockResolver::exchangers(&["mx1.example.com"]),
        MockProber::always(ProbeResult::Accepted).delayed(Duration::from_millis(100)),
        config,
    );

    let addresses: Vec<String> = (0..10).map(|i| format!("user{i}@example.com")).collect();
    let verdicts: Vec<_> = p.verify_batch(addresses).collect().await;

    assert_eq!(verdicts.len(), 10);
    assert!(verdicts.iter().all(|(_, v)| v.is_reachable()));
    let peak = p.prober.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in flight {peak}");
    assert!(peak >= 2, "batch should run in parallel, peak {peak}");
}

#[tokio::test]
async fn batch_continues_past_failures_and_keeps_order() {
    let p = pipeline(
        MockResolver::new(|domain| match domain {
            "example.com" => Ok(vec![MailExchanger::new("mx1.example.com", 10)]),
            other => Err(ResolutionError::NoRoute {
                domain: other.to_string(),
                reason: "NXDOMAIN".to_string(),
            }),
        }),
        MockProber::new(|_| ProbeResult::Rejected(550)),
    );

    let addresses = vec![
        "not-an-email".to_string(),
        "user@nonexistent-domain.invalid".to_string(),
        "user@example.com".to_string(),
    ];
    let verdicts = p.verify_all(addresses).await;

    let reasons: Vec<_> = verdicts.iter().map(|v| v.reason).collect();
    assert_eq!(
        reasons,
        vec![
            VerdictReason::InvalidFormat,
            VerdictReason::NoMailRoute,
            VerdictReason::Rejected { code: 550 },
        ]
    );
}
