use std::fmt;

/// Reply family, taken from the first digit of an SMTP status code
/// (RFC 5321 §4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCategory {
    PositiveCompletion,
    PositiveIntermediate,
    TransientNegative,
    PermanentNegative,
}

impl ReplyCategory {
    pub fn from_code(code: u16) -> Option<Self> {
        match code / 100 {
            2 => Some(Self::PositiveCompletion),
            3 => Some(Self::PositiveIntermediate),
            4 => Some(Self::TransientNegative),
            5 => Some(Self::PermanentNegative),
            _ => None,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Self::TransientNegative | Self::PermanentNegative)
    }
}

/// A raw SMTP reply. `code` is the status of the first line; `message`
/// joins the text of every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn category(&self) -> Option<ReplyCategory> {
        ReplyCategory::from_code(self.code)
    }

    pub fn is_positive_completion(&self) -> bool {
        self.category() == Some(ReplyCategory::PositiveCompletion)
    }
}

/// Outcome of probing one exchanger for one candidate address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The recipient command got a 2xx reply.
    Accepted,
    /// The recipient command got a 4xx or 5xx reply.
    Rejected(u16),
    TimedOut,
    ConnectionFailed,
    /// The server answered with something that is not a usable reply, or
    /// refused the session before the recipient command.
    ProtocolError,
}

impl ProbeResult {
    /// `Accepted` and `Rejected` settle the address; every other outcome
    /// only says something about this exchanger.
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected(_))
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected(code) => write!(f, "rejected ({code})"),
            Self::TimedOut => f.write_str("timed out"),
            Self::ConnectionFailed => f.write_str("connection failed"),
            Self::ProtocolError => f.write_str("protocol error"),
        }
    }
}
