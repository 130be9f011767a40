use sha2::{Digest, Sha256};

/// Longest payload prefix folded into a fingerprint.
pub const FINGERPRINT_PAYLOAD_PREFIX: usize = 100;

/// Derives the dedup key for one logical operation.
///
/// The key combines the operation target, a bounded payload prefix, and a
/// coarse timestamp bucket (the dedup window), so retriggers of the same
/// submission inside one window collapse onto one fingerprint. Fingerprints
/// are never stored long-term.
pub fn operation_fingerprint(
    target: &str,
    payload: &[u8],
    now_ms: u64,
    window_ms: u64,
) -> String {
    let prefix_len = payload.len().min(FINGERPRINT_PAYLOAD_PREFIX);
    let bucket = now_ms / window_ms.max(1);
    let mut hasher = Sha256::new();
    hasher.update(target.as_bytes());
    hasher.update([0u8]);
    hasher.update(&payload[..prefix_len]);
    hasher.update([0u8]);
    hasher.update(bucket.to_be_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        encoded.push_str(&format!("{byte:02x}"));
    }
    encoded
}
