//! Deterministic artifact naming.
//!
//! Names derive from the record's human-meaningful business key rather than
//! its surrogate UUID, so downstream consumers can predict them and a
//! resubmission overwrites the previous artifacts instead of accumulating
//! orphans.

use crate::error::NamingError;
use crate::kind::ArtifactKind;

/// Characters that may never appear in a business key.
///
/// Path separators would let a key escape its container; NUL and other
/// control characters are rejected wholesale.
const RESERVED: [char; 2] = ['/', '\\'];

fn check_key(business_key: &str) -> Result<(), NamingError> {
    if business_key.is_empty() {
        return Err(NamingError::EmptyBusinessKey);
    }
    if let Some(character) = business_key
        .chars()
        .find(|c| c.is_control() || RESERVED.contains(c))
    {
        return Err(NamingError::ReservedCharacter {
            key: business_key.to_string(),
            character,
        });
    }
    Ok(())
}

/// Resolves the name stem for an artifact of the given kind.
///
/// Pure and deterministic: identical inputs always yield the same name.
/// The caller appends the artifact's extension.
pub fn resolve(business_key: &str, kind: ArtifactKind) -> Result<String, NamingError> {
    check_key(business_key)?;
    Ok(format!("{business_key}_{}", kind.suffix()))
}

/// Resolves the name stem of the best-effort derived file produced after a
/// successful commit.
pub fn derived_name(business_key: &str) -> Result<String, NamingError> {
    check_key(business_key)?;
    Ok(format!("{business_key}_extracted"))
}
