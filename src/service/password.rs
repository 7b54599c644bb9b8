//! Salted PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored form is `"<salt_hex>:<derived_hex>"`. The hex salt string itself is
//! the PBKDF2 salt input and the round count is fixed at 1000, matching the
//! rows already stored by the site's earlier seed tooling.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use std::sync::LazyLock;

pub const PBKDF2_ROUNDS: u32 = 1_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 64;

/// A real hash generated once, used as a timing decoy so that logins for
/// unknown usernames cost the same as logins with a wrong password.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| hash_password("dummy-never-matches"));

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);
    let derived = derive_key(password, &salt_hex);

    format!("{}:{}", salt_hex, hex::encode(derived))
}

/// Never fails: a malformed stored form simply does not verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, derived_hex)) = stored.split_once(':') else {
        return false;
    };
    if salt_hex.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(derived_hex) else {
        return false;
    };
    if expected.len() != KEY_LEN {
        return false;
    }

    let derived = derive_key(password, salt_hex);
    constant_time_eq(&derived, &expected)
}

pub fn dummy_verify(password: &str) {
    let _ = verify_password(password, &DUMMY_HASH);
}

fn derive_key(password: &str, salt_hex: &str) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt_hex.as_bytes(), PBKDF2_ROUNDS, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
