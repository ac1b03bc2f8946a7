//! The per-installation proxy access secret.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;

/// Raw byte length of a generated secret.
pub const SECRET_BYTES: usize = 16;

/// Hex length of a generated secret.
pub const SECRET_HEX_LEN: usize = SECRET_BYTES * 2;

/// Proxy access secret as persisted: 32 lowercase hex characters for secrets
/// generated here, or an operator-provided value kept verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Generate 16 cryptographically random bytes.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse persisted content; only the standard 32-hex form is accepted.
    pub fn parse(content: &str) -> Option<Self> {
        let value = content.trim();
        if is_standard_hex(value) { Some(Self(value.to_ascii_lowercase())) } else { None }
    }

    /// Wrap a secret of arbitrary shape (e.g. imported from another tool).
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_standard(&self) -> bool {
        is_standard_hex(&self.0)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

fn is_standard_hex(value: &str) -> bool {
    value.len() == SECRET_HEX_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}
