use sha2::{Digest, Sha256};

/// Directory name for a user's records: the hex SHA-256 of the user id, so
/// arbitrary ids never reach the filesystem path.
pub fn owner_key(user_id: &str) -> String {
    hex::encode(Sha256::digest(user_id.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_key_is_stable_hex() {
        let key = owner_key("user-1");
        assert_eq!(key.len(), 64);
        assert_eq!(key, owner_key("user-1"));
        assert_ne!(key, owner_key("user-2"));
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn path_like_ids_become_plain_names() {
        let key = owner_key("../../etc");
        assert!(!key.contains('/'));
        assert!(!key.contains('.'));
    }
}
