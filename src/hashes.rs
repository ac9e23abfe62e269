use sha2::{Digest, Sha256};

/// SHA-256 of SHA-256, the hash used for redeem-script hashing and the
/// ECDSA sighash variant.
pub fn double_sha256(bytes: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(bytes);
    let second = Sha256::digest(first);
    second.into()
}

/// BLAKE3 hash keyed by a 32-byte domain-separation key, used for
/// transaction id computation and `OP_BLAKE3` script hashing.
pub fn blake3_keyed(key: &[u8; 32], bytes: &[u8]) -> [u8; 32] {
    blake3::keyed_hash(key, bytes).into()
}

/// Unkeyed BLAKE3, used wherever no domain separation is required (e.g.
/// the `OP_BLAKE3` redeem-script-hash opcode itself).
pub fn blake3(bytes: &[u8]) -> [u8; 32] {
    blake3::hash(bytes).into()
}

/// A single BIP-340-style tagged SHA-256 hash:
/// `SHA256(SHA256(tag) || SHA256(tag) || msg)`.
///
/// Used by the Schnorr sighash entry point, which (per spec) is
/// single-SHA-256 with domain-separated tagging rather than
/// double-SHA-256.
pub fn tagged_hash(tag: &str, msg: &[u8]) -> [u8; 32] {
    let tag_hash = Sha256::digest(tag.as_bytes());
    let mut hasher = Sha256::new();
    hasher.update(tag_hash);
    hasher.update(tag_hash);
    hasher.update(msg);
    hasher.finalize().into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_double_sha256_is_32_bytes() {
        assert_eq!(double_sha256(b"").len(), 32);
    }

    #[test]
    fn test_double_sha256_is_deterministic() {
        assert_eq!(double_sha256(b"hello"), double_sha256(b"hello"));
        assert_ne!(double_sha256(b"hello"), double_sha256(b"world"));
    }

    #[test]
    fn test_blake3_keyed_differs_by_key() {
        let k1 = [1u8; 32];
        let k2 = [2u8; 32];
        assert_ne!(blake3_keyed(&k1, b"data"), blake3_keyed(&k2, b"data"));
    }

    #[test]
    fn test_tagged_hash_deterministic_and_tag_sensitive() {
        let a = tagged_hash("TransactionSigningHash", b"msg");
        let b = tagged_hash("TransactionSigningHash", b"msg");
        let c = tagged_hash("OtherTag", b"msg");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
