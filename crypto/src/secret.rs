//! Secret material read from configuration at startup.
//!
//! Neither type implements `Debug`, `Clone` or `Serialize`. Raw bytes are
//! zeroized on drop.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Fixed HMAC key used only to bring both sides of a secret comparison to
/// equal-length tags; it is not itself secret.
const GUARD_DOMAIN: &[u8] = b"tally/admin-guard/v1";

/// The server-side salt mixed into every audit chain digest.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AuditSalt(Vec<u8>);

impl AuditSalt {
    /// Returns `None` for an empty salt.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A pre-shared secret checked in constant time.
///
/// Only the HMAC tag of the configured secret is kept. A presented value is
/// tagged the same way and compared with [`Mac::verify_slice`], so the
/// comparison time does not depend on where the first differing byte is.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    tag: [u8; 32],
}

impl SharedSecret {
    /// Returns `None` for an empty secret.
    pub fn new(secret: &[u8]) -> Option<Self> {
        if secret.is_empty() {
            return None;
        }
        Some(Self {
            tag: tag_of(secret).into_bytes().into(),
        })
    }

    /// Whether `presented` equals the configured secret.
    pub fn matches(&self, presented: &[u8]) -> bool {
        let mut mac = guard_mac();
        mac.update(presented);
        mac.verify_slice(&self.tag).is_ok()
    }
}

fn guard_mac() -> HmacSha256 {
    // HMAC accepts keys of any length, so this cannot fail.
    match HmacSha256::new_from_slice(GUARD_DOMAIN) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    }
}

fn tag_of(data: &[u8]) -> hmac::digest::CtOutput<HmacSha256> {
    let mut mac = guard_mac();
    mac.update(data);
    mac.finalize()
}
