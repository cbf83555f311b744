use std::time::Duration;

/// Identity and transport settings used by [`SmtpProber`](super::SmtpProber).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    pub helo_domain: String,
    /// Envelope sender for `MAIL FROM`. Must stay a non-deliverable
    /// placeholder: the probe never impersonates a real sender.
    pub mail_from: String,
    pub connect_timeout: Duration,
    /// Upper bound for the `QUIT` exchange once a result is known.
    pub quit_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: "localhost".to_string(),
            mail_from: "probe@mailprobe.invalid".to_string(),
            connect_timeout: Duration::from_secs(5),
            quit_timeout: Duration::from_secs(2),
        }
    }
}

impl ProbeOptions {
    /// Returns the hostname used in the `EHLO` command, `localhost` when unset.
    pub fn helo_domain(&self) -> &str {
        let trimmed = self.helo_domain.trim();
        if trimmed.is_empty() { "localhost" } else { trimmed }
    }
}
