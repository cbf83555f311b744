#![forbid(unsafe_code)]
//! mailprobe: estimates whether an email address is deliverable without
//! sending mail: format check, MX lookup, then an SMTP `RCPT TO` probe.

pub mod pipeline;
pub mod probe;
pub mod resolver;
pub mod validator;

pub use pipeline::{
    VerdictReason, VerdictStatus, VerificationConfig, VerificationPipeline, VerificationVerdict,
};
pub use probe::{ProbeOptions, ProbeResult, Prober, SmtpProber};
pub use resolver::{
    MailExchanger, ResolutionError, ResolveExchangers, ResolverClient, ResolverInitError,
};
pub use validator::{Domain, FormatError, LocalPart, validate_address};
