//! Dedicated-dictionary-search (DDSS) layout.
//!
//! Ported from zstd's `ZSTD_dedicatedDictSearch_lazy_loadDictionary` /
//! `ZSTD_dedicatedDictSearch_lazy_search` (`lib/compress/zstd_lazy.c`). Built
//! once, read-only afterward: each hash bucket caches the most recent
//! `(1 << DDSS_BUCKET_LOG) - 1` positions directly, and a single packed
//! pointer per bucket resumes a natural hash-chain walk for anything older.
//!
//! Simplification versus the reference: the reference additionally bounds
//! how many *non-cached* positions are reachable from beyond a `minChain`
//! cutoff to keep worst-case lookup cost flat; this port caches the nearest
//! `slots` positions per bucket and always defers the remainder to the
//! attempt budget (`search_log`) instead, which bounds lookup cost the same
//! way without a separate cutoff parameter.

use crate::hash::hash_ptr;
use crate::index::MatchCandidate;
use crate::params::{CParams, DDSS_BUCKET_LOG};
use crate::window::Window;

pub struct DedicatedDictIndex {
    /// `num_buckets * slots` cached positions, newest first per bucket.
    cache: Vec<u32>,
    /// Per-bucket continuation: the next position (if any) to resume a
    /// natural chain walk from, once the cache is exhausted.
    continue_ptr: Vec<u32>,
    /// Natural hash-chain built once over the whole dictionary, used only to
    /// continue past `continue_ptr`.
    chain_table: Vec<u32>,
    hash_log: u32,
    chain_mask: u32,
    mls: u32,
    slots: usize,
}

impl DedicatedDictIndex {
    /// Build the layout from a finished (read-only) dictionary window.
    /// Equivalent to `ZSTD_dedicatedDictSearch_lazy_loadDictionary`.
    pub fn build(dict_window: &Window, cparams: &CParams) -> Self {
        let bucket_size = 1usize << DDSS_BUCKET_LOG;
        let slots = bucket_size - 1;
        let num_buckets = 1usize << cparams.hash_log;
        let mls = cparams.hash_mls();
        let chain_mask = (1u32 << cparams.chain_log) - 1;

        // Pass 1: build the natural (unbucketed) hash chain, exactly as
        // `HashChainIndex::insert` does.
        let mut hash_table = vec![0u32; num_buckets];
        let mut chain_table = vec![0u32; 1usize << cparams.chain_log];
        let mut idx = dict_window.low_limit;
        let end = dict_window.next_src();
        while idx < end {
            if let Some(bytes) = dict_window.peek(idx, mls as usize) {
                let h = hash_ptr(bytes, cparams.hash_log, mls) as usize;
                let ci = (idx & chain_mask) as usize;
                chain_table[ci] = hash_table[h];
                hash_table[h] = idx;
            }
            idx += 1;
        }

        // Pass 2: for each bucket, peel the first `slots` positions off its
        // natural chain into the cache; remember where the chain continues.
        let mut cache = vec![0u32; num_buckets * slots];
        let mut continue_ptr = vec![0u32; num_buckets];
        for h in 0..num_buckets {
            let mut pos = hash_table[h];
            let mut n = 0usize;
            while pos != 0 && n < slots {
                cache[h * slots + n] = pos;
                pos = chain_table[(pos & chain_mask) as usize];
                n += 1;
            }
            continue_ptr[h] = pos;
        }

        DedicatedDictIndex {
            cache,
            continue_ptr,
            chain_table,
            hash_log: cparams.hash_log,
            chain_mask,
            mls,
            slots,
        }
    }

    #[inline]
    fn chain_idx(&self, idx: u32) -> usize {
        (idx & self.chain_mask) as usize
    }

    /// `findBestMatch` against the dictionary only, rebasing offsets by
    /// `window.low_limit - dict_window.next_src()`, the same rebasing rule
    /// HC/BT/Row dict-augmented search applies. Callers combine this with
    /// their own prefix-side search; this method never touches
    /// `window.prefix`.
    pub fn find_best_match(
        &self,
        window: &Window,
        ip: u32,
        cparams: &CParams,
        dict_window: &Window,
    ) -> MatchCandidate {
        let bytes = match window.peek(ip, self.mls as usize) {
            Some(b) => b,
            None => return MatchCandidate::NONE,
        };
        let h = hash_ptr(bytes, self.hash_log, self.mls) as usize;
        let rebase = window.low_limit as i64 - dict_window.next_src() as i64;
        let max_attempts = 1u32 << cparams.search_log;
        let mut attempts = 0u32;
        let mut best = MatchCandidate::NONE;
        let ip_span = window.span_from(ip);

        for &match_index in &self.cache[h * self.slots..h * self.slots + self.slots] {
            if match_index == 0 || attempts >= max_attempts {
                break;
            }
            attempts += 1;
            let cand_span = dict_window.span_from(match_index);
            let len = crate::matchlen::count(ip_span, cand_span) as u32;
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

        let mut pos = self.continue_ptr[h];
        while pos != 0 && attempts < max_attempts {
            attempts += 1;
            let cand_span = dict_window.span_from(pos);
            let len = crate::matchlen::count(ip_span, cand_span) as u32;
            if len > best.length {
                let rebased = (pos as i64 + rebase) as u32;
                if ip > rebased {
                    best = MatchCandidate {
                        length: len,
                        offset: ip - rebased,
                    };
                }
            }
            pos = self.chain_table[self.chain_idx(pos)];
        }
        best
    }
}
