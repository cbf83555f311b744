use std::fmt;

use thiserror::Error;

/// Part of an address before the `@`, kept verbatim.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalPart(String);

impl LocalPart {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Part of an address after the `@`. Guaranteed to hold at least one dot
/// and no empty label once produced by [`validate_address`](super::validate_address).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// IDNA (punycode) form of the domain, lowercased, suitable for a DNS query.
    pub fn to_ascii(&self) -> Result<String, FormatError> {
        idna::domain_to_ascii(&self.0).map_err(|_| FormatError::Idna {
            domain: self.0.clone(),
        })
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("address is empty")]
    Empty,
    #[error("address contains whitespace")]
    Whitespace,
    #[error("must contain exactly one '@' (found {found})")]
    AtCount { found: usize },
    #[error("total length {len} > 254")]
    TooLong { len: usize },
    #[error("local part is empty")]
    EmptyLocalPart,
    #[error("local part length {len} > 64")]
    LocalPartTooLong { len: usize },
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain '{domain}' must contain at least one dot")]
    UndottedDomain { domain: String },
    #[error("domain '{domain}' has an empty label")]
    EmptyLabel { domain: String },
    #[error("domain label '{label}' length {len} > 63")]
    LabelTooLong { label: String, len: usize },
    #[error("domain '{domain}' punycode conversion failed")]
    Idna { domain: String },
}
