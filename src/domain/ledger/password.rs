//! Salted password digests for user credentials.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt hex>$<digest hex>`.
//! The iteration count is embedded so it can be raised without invalidating
//! existing rows.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SCHEME: &str = "pbkdf2-sha256";
const ITERATIONS: u32 = 120_000;
const SALT_LEN: usize = 16;

/// Derive a fresh salted digest for `password`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let digest = pbkdf2_sha256(password.as_bytes(), &salt, ITERATIONS);
    format!(
        "{}${}${}${}",
        SCHEME,
        ITERATIONS,
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Check `password` against a stored digest string.
/// Malformed digests verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != SCHEME {
        return false;
    }
    let Ok(iterations) = parts[1].parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(parts[2]), hex::decode(parts[3])) else {
        return false;
    };

    let digest = pbkdf2_sha256(password.as_bytes(), &salt, iterations);
    constant_time_eq(&digest, &expected)
}

/// PBKDF2 with a single HMAC-SHA256 block (32-byte output).
fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    // U1 = PRF(password, salt || INT_32_BE(1))
    let mut mac = HmacSha256::new_from_slice(password).expect("HMAC can take key of any size");
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut u: [u8; 32] = mac.finalize().into_bytes().into();
    let mut block = u;

    for _ in 1..iterations {
        let mut mac =
            HmacSha256::new_from_slice(password).expect("HMAC can take key of any size");
        mac.update(&u);
        u = mac.finalize().into_bytes().into();
        block = xor(&block, &u);
    }

    block
}

fn xor(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, o) in out.iter_mut().enumerate() {
        *o = a[i] ^ b[i];
    }
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let digest = hash_password("barn-door-42");
        assert!(verify_password("barn-door-42", &digest));
        assert!(!verify_password("barn-door-43", &digest));
    }

    #[test]
    fn two_digests_of_same_password_differ() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn malformed_digest_verifies_false() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "plaintext"));
        assert!(!verify_password("pw", "pbkdf2-sha256$notanumber$aa$bb"));
        assert!(!verify_password("pw", "md5$1$aa$bb"));
    }

    #[test]
    fn digest_embeds_scheme_and_iterations() {
        let digest = hash_password("pw");
        let parts: Vec<&str> = digest.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2-sha256");
        assert_eq!(parts[1], "120000");
        assert_eq!(parts[2].len(), SALT_LEN * 2);
        assert_eq!(parts[3].len(), 64);
    }
}
