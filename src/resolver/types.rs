/// One MX target for a domain. Ordering is by priority first, so a sorted
/// `Vec<MailExchanger>` lists preferred hosts first.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MailExchanger {
    pub priority: u16,
    pub hostname: String,
}

impl MailExchanger {
    pub fn new(hostname: impl Into<String>, priority: u16) -> Self {
        Self {
            priority,
            hostname: hostname.into(),
        }
    }
}
