//! FNV-1a 64-bit hashing.
//!
//! This is the engine's determinism primitive (§6): every feature generator
//! seeds its random stream from `fnv1a_64(location_id)`. The algorithm is
//! fixed by the specification, not by convenience — any correct
//! implementation in any language must produce the same digest for the same
//! bytes, so this is hand-rolled rather than taken from a hashing crate whose
//! output is not contractually FNV-1a.

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Hash `bytes` with the 64-bit FNV-1a algorithm.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash a location id's UTF-8 bytes, as required by the determinism contract.
pub fn hash_location_id(location_id: &str) -> u64 {
    fnv1a_64(location_id.as_bytes())
}
