//! Salted, iterated SHA-256 password and secret hashing.
//!
//! # Invariants
//! - Encoded form is `sha256$<iterations>$<salt hex>$<digest hex>`.
//! - Verification compares digests in constant time.
//! - Malformed encodings never verify.

use sha2::{Digest, Sha256};

const ALGORITHM: &str = "sha256";
pub const DEFAULT_ITERATIONS: u32 = 20_000;
const SALT_LEN: usize = 16;

/// Hashes `secret` with a fresh random salt.
pub fn hash_password(secret: &str) -> String {
    hash_with_iterations(secret, DEFAULT_ITERATIONS)
}

pub fn hash_with_iterations(secret: &str, iterations: u32) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let iterations = iterations.max(1);
    let digest = derive(secret.as_bytes(), &salt, iterations);
    format!(
        "{ALGORITHM}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Checks `secret` against an encoded hash produced by [`hash_password`].
pub fn verify_password(secret: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if algorithm != ALGORITHM {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = derive(secret.as_bytes(), &salt, iterations);
    constant_time_eq(&actual, &expected)
}

fn derive(secret: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::new().chain_update(salt).chain_update(secret).finalize());
    for _ in 1..iterations {
        let next = Sha256::new()
            .chain_update(digest)
            .chain_update(secret)
            .finalize();
        digest.copy_from_slice(&next);
    }
    digest
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}

#[cfg(test)]
mod tests {
    use super::{hash_with_iterations, verify_password};

    #[test]
    fn hash_verifies_only_the_original_secret() {
        let encoded = hash_with_iterations("testuser", 10);
        assert!(encoded.starts_with("sha256$10$"));
        assert!(verify_password("testuser", &encoded));
        assert!(!verify_password("testuser2", &encoded));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(
            hash_with_iterations("same", 5),
            hash_with_iterations("same", 5)
        );
    }

    #[test]
    fn malformed_encodings_never_verify() {
        for encoded in ["", "sha256$10$zz$00", "md5$10$00$00", "sha256$0$00$00", "a$b$c$d$e"] {
            assert!(!verify_password("secret", encoded), "{encoded}");
        }
    }
}
