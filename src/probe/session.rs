use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::debug;

use super::types::SmtpReply;

/// Replies longer than this are treated as a protocol violation.
const MAX_REPLY_LINES: usize = 128;

/// Cap on one reply line, CRLF included (RFC 5321 allows 512 octets).
pub(crate) const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("connection to {host}:{port} timed out")]
    ConnectTimeout { host: String, port: u16 },
    #[error("connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed while reading reply")]
    Closed,
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ReplyError {
    #[error("invalid SMTP reply: '{0}'")]
    TooShort(String),
    #[error("invalid SMTP status code: '{0}'")]
    InvalidCode(String),
    #[error("SMTP reply exceeds {MAX_REPLY_LINES} lines")]
    TooManyLines,
    #[error("SMTP reply line exceeds {MAX_LINE_LEN} bytes")]
    LineTooLong,
}

/// One physical line of a (possibly multiline) reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReplyLine {
    pub code: u16,
    pub last: bool,
    pub text: String,
}

pub(crate) fn parse_reply_line(raw: &str) -> Result<ReplyLine, ReplyError> {
    let raw = raw.trim_end_matches(['\r', '\n']);
    if raw.len() < 3 || !raw.is_char_boundary(3) {
        return Err(ReplyError::TooShort(raw.to_string()));
    }
    let code_part = &raw[..3];
    if !code_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReplyError::InvalidCode(code_part.to_string()));
    }
    let code = code_part
        .parse::<u16>()
        .map_err(|_| ReplyError::InvalidCode(code_part.to_string()))?;
    let last = raw.as_bytes().get(3).copied() != Some(b'-');
    let text = raw.get(4..).unwrap_or_default().to_string();
    Ok(ReplyLine { code, last, text })
}

/// A plain-text SMTP connection to one exchanger. Dropping the session
/// closes the socket.
pub(crate) struct SmtpSession {
    host: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl SmtpSession {
    pub(crate) async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| SessionError::ConnectTimeout {
                host: host.to_string(),
                port,
            })?
            .map_err(|source| SessionError::Connect {
                host: host.to_string(),
                port,
                source,
            })?;
        if let Ok(peer) = stream.peer_addr() {
            debug!(host, %peer, "connected");
        }
        let (read, writer) = stream.into_split();
        Ok(Self {
            host: host.to_string(),
            reader: BufReader::new(read),
            writer,
        })
    }

    /// Sends `command` and waits for the complete reply.
    pub(crate) async fn command(&mut self, command: &str) -> Result<SmtpReply, SessionError> {
        self.send_command(command).await?;
        self.read_reply().await
    }

    pub(crate) async fn send_command(&mut self, command: &str) -> Result<(), SessionError> {
        debug!(host = %self.host, "C: {command}");
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Reads one reply. Only the first line's status code is kept: a
    /// continuation line carrying a different code does not override it.
    pub(crate) async fn read_reply(&mut self) -> Result<SmtpReply, SessionError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            if message_lines.len() >= MAX_REPLY_LINES {
                return Err(ReplyError::TooManyLines.into());
            }
            let mut raw = Vec::new();
            let bytes = (&mut self.reader)
                .take(MAX_LINE_LEN as u64)
                .read_until(b'\n', &mut raw)
                .await?;
            if bytes == 0 {
                return Err(SessionError::Closed);
            }
            if bytes == MAX_LINE_LEN && raw.last() != Some(&b'\n') {
                return Err(ReplyError::LineTooLong.into());
            }
            let raw = String::from_utf8_lossy(&raw);
            debug!(host = %self.host, "S: {}", raw.trim_end());

            let line = parse_reply_line(&raw)?;
            match code {
                None => code = Some(line.code),
                Some(first) if first != line.code => {
                    debug!(host = %self.host, first, other = line.code, "inconsistent reply codes");
                }
                Some(_) => {}
            }
            message_lines.push(line.text);
            if line.last {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.unwrap_or_default(),
            message: message_lines.join("\n"),
        })
    }

    /// Best-effort `QUIT` followed by a TCP shutdown, bounded by `grace`.
    pub(crate) async fn quit(mut self, grace: Duration) {
        let exchange = async {
            self.send_command("QUIT").await?;
            self.read_reply().await?;
            Ok::<_, SessionError>(())
        };
        match tokio::time::timeout(grace, exchange).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => debug!(host = %self.host, error = %err, "QUIT failed"),
            Err(_) => debug!(host = %self.host, "QUIT timed out"),
        }
        let _ = self.writer.shutdown().await;
    }
}
