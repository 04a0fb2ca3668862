//! Murmur3 x86 32-bit, seed 0.
//!
//! Bucket partitioning depends on these hashes being byte-stable across
//! implementations and platforms, so the algorithm is written out here
//! rather than taken from a hashing crate that might change behaviour
//! between versions.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

fn mix_k1(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2)
}

fn fmix(mut h: u32, length: u32) -> u32 {
    h ^= length;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Hash a byte string with seed 0.
pub(crate) fn hash_bytes(data: &[u8]) -> i32 {
    let mut h1: u32 = 0;
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let k1 = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k1: u32 = 0;
        for (i, byte) in tail.iter().enumerate() {
            k1 |= u32::from(*byte) << (8 * i);
        }
        h1 ^= mix_k1(k1);
    }
    fmix(h1, data.len() as u32) as i32
}

/// Hash the 8 little-endian bytes of a 64-bit value.
pub(crate) fn hash_long(value: i64) -> i32 {
    hash_bytes(&value.to_le_bytes())
}

/// Hash a double through its raw bits. Bucket partitioning does not accept
/// floating point sources; this exists to pin the byte layout for tests.
#[allow(dead_code)]
pub(crate) fn hash_double(value: f64) -> i32 {
    hash_bytes(&value.to_bits().to_le_bytes())
}
