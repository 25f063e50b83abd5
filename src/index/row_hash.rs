//! Tag-accelerated row-hash index.
//!
//! Ported from zstd's `ZSTD_RowFindBestMatch` / `ZSTD_row_getMatchMask`
//! (`lib/compress/zstd_lazy.c`). A hash table partitioned into rows of 16 or
//! 32 entries; each row has a parallel 1-byte tag per slot plus a 1-byte
//! write-cursor ("head"). A SIMD (or portable scalar) byte-compare narrows
//! candidates before any full comparison runs.

use crate::hash::row_hash;
use crate::index::MatchCandidate;
use crate::matchlen::match_length;
use crate::params::{CParams, PREFETCH_NB};
use crate::window::Window;

/// One row's worth of tag bytes plus the write-cursor byte: `R` tags and
/// one head byte.
struct RowLayout {
    r: usize,
}

impl RowLayout {
    #[inline]
    fn stride(&self) -> usize {
        self.r + 1
    }
}

pub struct RowHashIndex {
    /// `num_rows * r` position slots.
    positions: Vec<u32>,
    /// `num_rows * (r + 1)` bytes: `tags[row*(r+1)]` is the head cursor,
    /// `tags[row*(r+1) + 1 + slot]` is that slot's tag.
    tags: Vec<u8>,
    layout: RowLayout,
    num_rows: usize,
    /// log2(num_rows); combined with an 8-bit tag this forms the row-hash's
    /// total bit width.
    hash_log: u32,
    mls: u32,
    /// 8-entry ring of precomputed next-position hashes. Purely a prefetch
    /// hint — `shouldPrefetch` in the reference is unused here; this cache
    /// does not change any observable result.
    hash_cache: [u32; PREFETCH_NB],
    hash_cache_base: u32,
    pub next_to_update: u32,
}

impl RowHashIndex {
    pub fn new(cparams: &CParams) -> Self {
        let r = 1usize << cparams.row_log;
        let num_rows = 1usize << cparams.hash_log;
        RowHashIndex {
            positions: vec![0u32; num_rows * r],
            tags: vec![0u8; num_rows * (r + 1)],
            layout: RowLayout { r },
            num_rows,
            hash_log: cparams.hash_log,
            mls: cparams.hash_mls(),
            hash_cache: [0; PREFETCH_NB],
            hash_cache_base: 0,
            next_to_update: 0,
        }
    }

    #[inline]
    fn row_mask(&self) -> usize {
        self.layout.r - 1
    }

    /// Row index and tag byte for the `mls` bytes at a logical position.
    /// The high `hash_log` bits of a `(hash_log + 8)`-bit hash select the
    /// row; the low 8 bits are the tag.
    #[inline]
    fn row_and_tag(&self, bytes: &[u8]) -> (usize, u8) {
        let h = row_hash(bytes, self.hash_log + 8, self.mls);
        let row = ((h >> 8) as usize) & (self.num_rows - 1);
        let tag = (h & 0xFF) as u8;
        (row, tag)
    }

    #[inline]
    fn row_base(&self, row: usize) -> usize {
        row * self.layout.stride()
    }

    #[inline]
    fn head(&self, row: usize) -> u8 {
        self.tags[self.row_base(row)]
    }

    #[inline]
    fn tag_row(&self, row: usize) -> &[u8] {
        let base = self.row_base(row) + 1;
        &self.tags[base..base + self.layout.r]
    }

    #[inline]
    fn pos_slot(&self, row: usize, slot: usize) -> u32 {
        self.positions[row * self.layout.r + slot]
    }

    /// Insert one position into its row, advancing the head backward.
    fn insert_one(&mut self, row: usize, tag: u8, pos: u32) {
        let mask = self.row_mask() as u8;
        let base = self.row_base(row);
        let new_head = self.tags[base].wrapping_sub(1) & mask;
        self.tags[base] = new_head;
        self.tags[base + 1 + new_head as usize] = tag;
        self.positions[row * self.layout.r + new_head as usize] = pos;
    }

    /// Refresh the hash cache starting at `from`. Purely advisory; does not
    /// affect `find_best_match`'s result.
    fn refresh_cache(&mut self, window: &Window, from: u32) {
        self.hash_cache_base = from;
        for (i, slot) in self.hash_cache.iter_mut().enumerate() {
            *slot = match window.peek(from + i as u32, self.mls as usize) {
                Some(bytes) => row_hash(bytes, self.hash_log + 8, self.mls),
                None => 0,
            };
        }
    }

    /// `rowUpdate(ip)`: insert every position in `[next_to_update, target)`.
    pub fn row_update(&mut self, window: &Window, target: u32) {
        let mut idx = self.next_to_update.max(window.low_limit);
        while idx < target {
            if let Some(bytes) = window.peek(idx, self.mls as usize) {
                let (row, tag) = self.row_and_tag(bytes);
                self.insert_one(row, tag, idx);
            }
            idx += 1;
        }
        self.next_to_update = target.max(self.next_to_update);
        self.refresh_cache(window, target);
    }

    /// `findBestMatch(ip)`: gather tag-matching candidates in the row, then
    /// compare each in turn.
    pub fn find_best_match(
        &mut self,
        window: &Window,
        ip: u32,
        cparams: &CParams,
        i_limit: u32,
    ) -> MatchCandidate {
        self.row_update(window, ip);

        let bytes = match window.peek(ip, self.mls as usize) {
            Some(b) => b,
            None => return MatchCandidate::NONE,
        };
        let (row, tag) = self.row_and_tag(bytes);
        let head = self.head(row) as usize;
        let r = self.layout.r;
        let bitmap = tag_compare(self.tag_row(row), tag, r).rotate_right(head as u32);

        let lowest = window.lowest_match_index(ip, cparams.window_log);
        let max_attempts = 1u32 << cparams.search_log;

        // Gather up to max_attempts candidate positions, newest first.
        let mut candidates = Vec::with_capacity(max_attempts.min(r as u32) as usize);
        let mut bits = bitmap;
        let mut attempts = 0u32;
        while bits != 0 && attempts < max_attempts {
            let k = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            attempts += 1;
            let slot = (head + k) & self.row_mask();
            let match_index = self.pos_slot(row, slot);
            if match_index < lowest {
                break;
            }
            candidates.push(match_index);
        }

        // Speed opt: insert curr now so the next call's row_update doesn't
        // have to.
        self.insert_one(row, tag, ip);

        let mut best = MatchCandidate::NONE;
        for match_index in candidates {
            if best.length > 0 {
                let ip_byte = window.span_from(ip).get(best.length as usize).copied();
                let cand_byte = window
                    .span_from(match_index)
                    .get(best.length as usize)
                    .copied();
                if ip_byte != cand_byte {
                    continue;
                }
            }
            let len = match_length(window, ip, match_index);
            if len > best.length {
                best = MatchCandidate {
                    length: len,
                    offset: ip - match_index,
                };
                if ip + len >= i_limit {
                    break;
                }
            }
        }
        best
    }

    /// Dictionary-augmented search for `DictMatchState`/`DedicatedDictSearch`:
    /// a bounded scan over the dictionary's own row-hash table, rebasing
    /// offsets by `dict_limit - dict_size`.
    pub fn find_best_match_dict_augmented(
        &mut self,
        window: &Window,
        ip: u32,
        cparams: &CParams,
        i_limit: u32,
        dict_index: &RowHashIndex,
        dict_window: &Window,
    ) -> MatchCandidate {
        let mut best = self.find_best_match(window, ip, cparams, i_limit);

        let bytes = match window.peek(ip, dict_index.mls as usize) {
            Some(b) => b,
            None => return best,
        };
        let (row, tag) = dict_index.row_and_tag(bytes);
        let head = dict_index.head(row) as usize;
        let r = dict_index.layout.r;
        let bitmap = tag_compare(dict_index.tag_row(row), tag, r).rotate_right(head as u32);

        let rebase = window.low_limit as i64 - dict_window.next_src() as i64;
        let max_attempts = 1u32 << cparams.search_log;
        let mut bits = bitmap;
        let mut attempts = 0u32;
        while bits != 0 && attempts < max_attempts {
            let k = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            attempts += 1;
            let slot = (head + k) & dict_index.row_mask();
            let match_index = dict_index.pos_slot(row, slot);
            if match_index < dict_window.low_limit {
                break;
            }
            let a = window.span_from(ip);
            let b = dict_window.span_from(match_index);
            let len = crate::matchlen::count(a, b) as u32;
            if len > best.length {
                let rebased = (match_index as i64 + rebase) as u32;
                if ip > rebased {
                    best = MatchCandidate {
                        length: len,
                        offset: ip - rebased,
                    };
                }
            }
        }
        best
    }
}

/// `tagCompare(row, tag) -> bitmap`: bit `i` is set iff `row[i] == tag`.
/// SIMD-accelerated on `x86_64` when `sse2` is available (always true on
/// that target per the Rust baseline); the scalar fallback produces the
/// identical bitmap on every other target.
#[inline]
fn tag_compare(row: &[u8], tag: u8, r: usize) -> u32 {
    debug_assert_eq!(row.len(), r);
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse2") {
            return unsafe { tag_compare_sse2(row, tag, r) };
        }
    }
    tag_compare_scalar(row, tag)
}

#[inline]
fn tag_compare_scalar(row: &[u8], tag: u8) -> u32 {
    let mut bitmap = 0u32;
    for (i, &b) in row.iter().enumerate() {
        if b == tag {
            bitmap |= 1 << i;
        }
    }
    bitmap
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn tag_compare_sse2(row: &[u8], tag: u8, r: usize) -> u32 {
    use core::arch::x86_64::{_mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8};

    let needle = _mm_set1_epi8(tag as i8);
    let lo = _mm_loadu_si128(row.as_ptr() as *const core::arch::x86_64::__m128i);
    let eq_lo = _mm_cmpeq_epi8(lo, needle);
    let mut bitmap = _mm_movemask_epi8(eq_lo) as u32;

    if r == 32 {
        let hi = _mm_loadu_si128(row.as_ptr().add(16) as *const core::arch::x86_64::__m128i);
        let eq_hi = _mm_cmpeq_epi8(hi, needle);
        bitmap |= (_mm_movemask_epi8(eq_hi) as u32) << 16;
    }
    bitmap
}
