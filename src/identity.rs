//! Caller identity handed in by the external identity provider.

use std::fmt;

use serde::Serialize;

use crate::error::ConsultError;

/// Opaque owner key (the provider's primary e-mail or subject id).
///
/// Constructed only through [`OwnerIdentity::resolve`], so a value of this
/// type is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OwnerIdentity(String);

impl OwnerIdentity {
    /// Resolve the identity from the authenticated context. Absent or blank
    /// identities are `Unauthenticated`.
    pub fn resolve(raw: Option<&str>) -> Result<Self, ConsultError> {
        match raw.map(str::trim) {
            Some(id) if !id.is_empty() => Ok(Self(id.to_string())),
            _ => Err(ConsultError::Unauthenticated),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
