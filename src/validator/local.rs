use super::types::FormatError;

/// Maximum local part length (RFC 5321 §4.5.3.1.1).
const MAX_LOCAL_LEN: usize = 64;

pub(crate) fn check_local(local: &str) -> Result<(), FormatError> {
    if local.is_empty() {
        return Err(FormatError::EmptyLocalPart);
    }
    if local.len() > MAX_LOCAL_LEN {
        return Err(FormatError::LocalPartTooLong { len: local.len() });
    }
    Ok(())
}
