//! Room password hashing.
//!
//! Passwords are hashed as `sha256("<roomId>:<password>")` and stored as
//! lowercase hex. Salting with the room id means two rooms with the same
//! password store different hashes.

use sha2::{Digest, Sha256};

pub fn hash_password(room_id: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(room_id.as_bytes())
        .chain_update(b":")
        .chain_update(password.as_bytes())
        .finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn verify_password(room_id: &str, password: &str, hash: &str) -> bool {
    hash_password(room_id, password) == hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_is_hex_sha256() {
        let h = hash_password("r1", "secret");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_password_is_salted_by_room() {
        assert_ne!(hash_password("r1", "pw"), hash_password("r2", "pw"));
    }

    #[test]
    fn test_verify_password() {
        let h = hash_password("r1", "pw");
        assert!(verify_password("r1", "pw", &h));
        assert!(!verify_password("r1", "PW", &h));
        assert!(!verify_password("r2", "pw", &h));
    }
}
