//! OTP code format validation.

use serde::{Deserialize, Serialize};

use bureau_core::DomainError;

/// Operator-entered one-time code.
///
/// The only validation performed client-side is the format gate: exactly six
/// ASCII digits. Whether the code matches is decided solely by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    pub const LENGTH: usize = 6;

    /// Validate the raw input against the `^\d{6}$` format.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.len() != Self::LENGTH || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(
                "le code doit contenir exactement 6 chiffres",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
