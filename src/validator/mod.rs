//! Syntactic gate applied before any network I/O.

mod domain;
mod local;
mod types;

pub use types::{Domain, FormatError, LocalPart};

use domain::check_domain;
use local::check_local;

/// Maximum total length (RFC 5321: 254, '@' included).
const MAX_ADDRESS_LEN: usize = 254;

/// Splits `address` into its local part and domain, rejecting anything that
/// lacks exactly one `@`, a non-empty local part, a dotted domain, or that
/// contains whitespace. Pure and deterministic.
pub fn validate_address(address: &str) -> Result<(LocalPart, Domain), FormatError> {
    if address.is_empty() {
        return Err(FormatError::Empty);
    }
    if address.chars().any(char::is_whitespace) {
        return Err(FormatError::Whitespace);
    }
    if address.len() > MAX_ADDRESS_LEN {
        return Err(FormatError::TooLong {
            len: address.len(),
        });
    }

    let found = address.matches('@').count();
    let Some((local, domain)) = address.split_once('@').filter(|_| found == 1) else {
        return Err(FormatError::AtCount { found });
    };

    check_local(local)?;
    check_domain(domain)?;

    Ok((LocalPart::new(local), Domain::new(domain)))
}
