//! SMTP reachability probing.
//!
//! [`SmtpProber`] connects to one mail exchanger, walks the
//! `EHLO` / `MAIL FROM` / `RCPT TO` sequence and classifies the reply to the
//! recipient command into a [`ProbeResult`]. No message is ever transmitted
//! and no transport error escapes: every outcome is a `ProbeResult` variant.

mod options;
mod session;
mod types;

pub use options::ProbeOptions;
pub use types::{ProbeResult, ReplyCategory, SmtpReply};

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::resolver::MailExchanger;
use session::{SessionError, SmtpSession};

/// Probes one exchanger for one candidate address. This is the seam the
/// verification pipeline depends on.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(
        &self,
        exchanger: &MailExchanger,
        candidate: &str,
        timeout: Duration,
    ) -> ProbeResult;
}

#[derive(Debug, Clone, Default)]
pub struct SmtpProber {
    options: ProbeOptions,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }
}

#[async_trait]
impl Prober for SmtpProber {
    /// `timeout` bounds the whole dialogue after the connection is
    /// established; the connection itself is bounded by
    /// [`ProbeOptions::connect_timeout`].
    async fn probe(
        &self,
        exchanger: &MailExchanger,
        candidate: &str,
        timeout: Duration,
    ) -> ProbeResult {
        let host = exchanger.hostname.as_str();
        let connect = SmtpSession::connect(host, self.options.port, self.options.connect_timeout);
        let mut session = match connect.await {
            Ok(session) => session,
            Err(err) => {
                debug!(host, error = %err, "connect failed");
                return classify_error(&err);
            }
        };

        let outcome =
            tokio::time::timeout(timeout, handshake(&mut session, candidate, &self.options)).await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                debug!(host, error = %err, "dialogue failed");
                classify_error(&err)
            }
            Err(_) => {
                debug!(host, ?timeout, "no reply before deadline");
                ProbeResult::TimedOut
            }
        };

        match result {
            // Dropping the session closes the socket without further I/O.
            ProbeResult::TimedOut | ProbeResult::ConnectionFailed => drop(session),
            _ => session.quit(self.options.quit_timeout).await,
        }
        result
    }
}

async fn handshake(
    session: &mut SmtpSession,
    candidate: &str,
    options: &ProbeOptions,
) -> Result<ProbeResult, SessionError> {
    let greeting = session.read_reply().await?;
    if !greeting.is_positive_completion() {
        warn!(code = greeting.code, "unexpected greeting");
        return Ok(ProbeResult::ProtocolError);
    }

    let ehlo = session
        .command(&format!("EHLO {}", options.helo_domain()))
        .await?;
    if !ehlo.is_positive_completion() {
        warn!(code = ehlo.code, "EHLO rejected");
        return Ok(ProbeResult::ProtocolError);
    }

    let mail = session
        .command(&format!("MAIL FROM:<{}>", options.mail_from))
        .await?;
    if !mail.is_positive_completion() {
        warn!(code = mail.code, "MAIL FROM rejected");
        return Ok(ProbeResult::ProtocolError);
    }

    let rcpt = session.command(&format!("RCPT TO:<{candidate}>")).await?;
    Ok(classify_rcpt(&rcpt))
}

pub(crate) fn classify_rcpt(reply: &SmtpReply) -> ProbeResult {
    match reply.category() {
        Some(ReplyCategory::PositiveCompletion) => ProbeResult::Accepted,
        Some(category) if category.is_negative() => ProbeResult::Rejected(reply.code),
        _ => ProbeResult::ProtocolError,
    }
}

fn classify_error(err: &SessionError) -> ProbeResult {
    match err {
        SessionError::ConnectTimeout { .. } => ProbeResult::TimedOut,
        SessionError::Connect { .. } | SessionError::Io(_) | SessionError::Closed => {
            ProbeResult::ConnectionFailed
        }
        SessionError::Reply(_) => ProbeResult::ProtocolError,
    }
}
