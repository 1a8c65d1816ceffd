//! Content hashing utilities.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

/// Compute a content hash for arbitrary bytes
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Hash the canonical JSON serialization of a model object.
///
/// Two objects with equal serialized form hash equally, which is what the
/// slice distributor relies on to find an array member again.
pub fn object_hash<T: Serialize + ?Sized>(value: &T) -> u64 {
    serde_json::to_vec(value).map_or(0, |bytes| xxh3_64(&bytes))
}

/// Hash a node id (JSON path string).
pub fn id_hash(id: &str) -> u64 {
    xxh3_64(id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        let data = b"hello world";
        let hash = content_hash(data);
        assert_ne!(hash, 0);

        // Same input should produce same hash
        assert_eq!(hash, content_hash(data));

        // Different input should produce different hash
        assert_ne!(hash, content_hash(b"hello world!"));
    }

    #[test]
    fn test_object_hash_follows_serialized_form() {
        let a = serde_json::json!({"url": "https://a.example.com"});
        let b = serde_json::json!({"url": "https://a.example.com"});
        let c = serde_json::json!({"url": "https://b.example.com"});
        assert_eq!(object_hash(&a), object_hash(&b));
        assert_ne!(object_hash(&a), object_hash(&c));
    }

    #[test]
    fn test_id_hash_is_stable() {
        assert_eq!(id_hash("$.info"), id_hash("$.info"));
        assert_ne!(id_hash("$.info"), id_hash("$.info.contact"));
    }
}
