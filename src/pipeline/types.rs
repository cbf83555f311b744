use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Reachable,
    /// Definitive negative signal: bad format, no route, or explicit rejection.
    Unreachable,
    /// No exchanger gave a definitive answer. Not the same as `Unreachable`.
    Indeterminate,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => f.write_str("reachable"),
            Self::Unreachable => f.write_str("unreachable"),
            Self::Indeterminate => f.write_str("indeterminate"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictReason {
    Accepted,
    /// Only the MX lookup was performed, and it returned exchangers.
    MxFound,
    InvalidFormat,
    NoMailRoute,
    Rejected { code: u16 },
    AllExchangersUnreachable,
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::MxFound => f.write_str("MX found"),
            Self::InvalidFormat => f.write_str("invalid format"),
            Self::NoMailRoute => f.write_str("no mail route"),
            Self::Rejected { code } => write!(f, "rejected ({code})"),
            Self::AllExchangersUnreachable => f.write_str("all exchangers unreachable"),
        }
    }
}

/// Final decision for one address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationVerdict {
    pub address: String,
    pub status: VerdictStatus,
    pub reason: VerdictReason,
    /// Exchanger that produced the definitive answer, if any.
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub exchanger: Option<String>,
    /// Human-readable context (format error, resolver message, attempts).
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub detail: Option<String>,
}

impl VerificationVerdict {
    fn new(address: &str, status: VerdictStatus, reason: VerdictReason) -> Self {
        Self {
            address: address.to_string(),
            status,
            reason,
            exchanger: None,
            detail: None,
        }
    }

    pub(crate) fn reachable(address: &str, exchanger: &str) -> Self {
        Self {
            exchanger: Some(exchanger.to_string()),
            ..Self::new(address, VerdictStatus::Reachable, VerdictReason::Accepted)
        }
    }

    pub(crate) fn mx_found(address: &str, exchanger: &str) -> Self {
        Self {
            exchanger: Some(exchanger.to_string()),
            ..Self::new(address, VerdictStatus::Reachable, VerdictReason::MxFound)
        }
    }

    pub(crate) fn rejected(address: &str, code: u16, exchanger: &str) -> Self {
        Self {
            exchanger: Some(exchanger.to_string()),
            ..Self::new(
                address,
                VerdictStatus::Unreachable,
                VerdictReason::Rejected { code },
            )
        }
    }

    pub(crate) fn invalid_format(address: &str, detail: impl fmt::Display) -> Self {
        Self {
            detail: Some(detail.to_string()),
            ..Self::new(
                address,
                VerdictStatus::Unreachable,
                VerdictReason::InvalidFormat,
            )
        }
    }

    pub(crate) fn no_mail_route(address: &str, detail: impl fmt::Display) -> Self {
        Self {
            detail: Some(detail.to_string()),
            ..Self::new(address, VerdictStatus::Unreachable, VerdictReason::NoMailRoute)
        }
    }

    pub(crate) fn indeterminate(address: &str, attempted: usize) -> Self {
        Self {
            detail: Some(format!("{attempted} exchanger(s) tried without a definitive answer")),
            ..Self::new(
                address,
                VerdictStatus::Indeterminate,
                VerdictReason::AllExchangersUnreachable,
            )
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.status == VerdictStatus::Reachable
    }

    /// Rejection code when the verdict comes from an explicit RCPT refusal.
    pub fn rejection_code(&self) -> Option<u16> {
        match self.reason {
            VerdictReason::Rejected { code } => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.address, self.status, self.reason)
    }
}
