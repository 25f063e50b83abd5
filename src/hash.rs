//! Hash-function contract: mixes a few bytes at a position into a table
//! index.
//!
//! Ported from zstd's `ZSTD_hashPtr` / `ZSTD_hashPtrSalted` family
//! (`lib/compress/zstd_compress_internal.h`): a constant-multiply, shift-down
//! mixer over the next `mls` bytes at a position. Downstream index tables
//! only depend on the mixer being pure and consistent between insertion and
//! lookup.

/// 8-byte prime used to mix 5-, 6-, 7-, and 8-byte hashes (`ZSTD_prime8bytes`).
const PRIME_8: u64 = 0xCF1B_BCDC_B7A5_6463;
/// 4-byte prime used to mix 4-byte hashes (`ZSTD_prime4bytes`).
const PRIME_4: u32 = 2_654_435_761;

/// Read `n` bytes (`n <= 8`) at `src[0..n)` into a little-endian `u64`.
///
/// `src` must have at least `n` readable bytes; callers hold that invariant
/// via the window's readable-span contract.
#[inline(always)]
fn read_le(src: &[u8], n: usize) -> u64 {
    debug_assert!(n <= 8 && src.len() >= n);
    let mut buf = [0u8; 8];
    buf[..n].copy_from_slice(&src[..n]);
    u64::from_le_bytes(buf)
}

/// `hashPtr(p, hashLog, mls)` — digest the next `mls ∈ {4,5,6}` bytes at `p`
/// into a `hashLog`-bit value.
///
/// Equivalent to `ZSTD_hashPtr`. Pure; requires `mls <= 8` readable bytes at
/// `p`.
#[inline]
pub fn hash_ptr(p: &[u8], hash_log: u32, mls: u32) -> u32 {
    debug_assert!((4..=6).contains(&mls) || mls == 7 || mls == 8);
    debug_assert!(p.len() >= mls as usize);
    match mls {
        4 => {
            let v = u32::from_le_bytes(p[..4].try_into().unwrap());
            v.wrapping_mul(PRIME_4) >> (32 - hash_log)
        }
        _ => {
            let v = read_le(p, mls as usize);
            (v.wrapping_mul(PRIME_8) >> (64 - hash_log)) as u32
        }
    }
}

/// Row-hash variant: returns the full `hashLog`-bit value; callers split it
/// into a row selector (high bits) and an 8-bit tag (low bits).
#[inline]
pub fn row_hash(p: &[u8], hash_log: u32, mls: u32) -> u32 {
    hash_ptr(p, hash_log, mls)
}
