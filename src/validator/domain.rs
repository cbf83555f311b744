use super::types::FormatError;

const MAX_LABEL_LEN: usize = 63;

/// Checks the dotted structure of the domain. Character repertoire is left to
/// the resolver: internationalized names only get basic parsing here.
pub(crate) fn check_domain(domain: &str) -> Result<(), FormatError> {
    if domain.is_empty() {
        return Err(FormatError::EmptyDomain);
    }

    // at least one dot
    if !domain.contains('.') {
        return Err(FormatError::UndottedDomain {
            domain: domain.to_string(),
        });
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(FormatError::EmptyLabel {
                domain: domain.to_string(),
            });
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(FormatError::LabelTooLong {
                label: label.to_string(),
                len: label.len(),
            });
        }
    }
    Ok(())
}
