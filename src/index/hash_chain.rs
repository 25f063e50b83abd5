//! Hash-chain index.
//!
//! Ported from zstd's `ZSTD_HcFindBestMatch` / `ZSTD_insertAndFindFirstIndex`
//! family (`lib/compress/zstd_lazy.c`). A hash table mapping each bucket to
//! the most recently inserted position with that hash, chained backward
//! through `chainTable[idx & chainMask] -> previous index in the same
//! bucket`.
//!
//! `ExtDict` addressing needs no special casing here: the window already
//! resolves a chained position into the dict or prefix slice transparently.
//! Only [`DictMode::DictMatchState`] needs a second table —
//! [`HashChainIndex::find_best_match_dict_augmented`] — because the
//! dictionary owns its own independently built index.

use crate::hash::hash_ptr;
use crate::index::MatchCandidate;
use crate::matchlen::match_length;
use crate::params::CParams;
use crate::window::Window;

/// Sentinel for "no entry in this bucket/chain slot yet". Logical position
/// `0` is a perfectly valid indexed position (the very first byte of a
/// block), so it cannot double as the empty marker — that would make the
/// first position unreachable as a match candidate the moment it collided
/// with an empty bucket. `u32::MAX` is never a real logical position at the
/// window sizes this crate supports, so it is used instead.
const NOT_FOUND: u32 = u32::MAX;

/// A hash table of most-recent positions plus a singly linked chain per
/// bucket.
pub struct HashChainIndex {
    hash_table: Vec<u32>,
    chain_table: Vec<u32>,
    hash_log: u32,
    chain_mask: u32,
    mls: u32,
    /// Monotone counter: positions `< next_to_update` are already indexed.
    pub next_to_update: u32,
}

impl HashChainIndex {
    pub fn new(cparams: &CParams) -> Self {
        HashChainIndex {
            hash_table: vec![NOT_FOUND; 1 << cparams.hash_log],
            chain_table: vec![NOT_FOUND; 1 << cparams.chain_log],
            hash_log: cparams.hash_log,
            chain_mask: (1u32 << cparams.chain_log) - 1,
            mls: cparams.hash_mls(),
            next_to_update: 0,
        }
    }

    #[inline]
    fn chain_idx(&self, idx: u32) -> usize {
        (idx & self.chain_mask) as usize
    }

    /// Insert every position in `[next_to_update, target)` into the hash and
    /// chain tables. Equivalent to the insertion half of
    /// `ZSTD_HcFindBestMatch`'s `ZSTD_insertAndFindFirstIndex` call.
    pub fn insert(&mut self, window: &Window, target: u32) {
        let mut idx = self.next_to_update.max(window.low_limit);
        while idx < target {
            if let Some(bytes) = window.peek(idx, self.mls as usize) {
                let h = hash_ptr(bytes, self.hash_log, self.mls) as usize;
                let ci = self.chain_idx(idx);
                self.chain_table[ci] = self.hash_table[h];
                self.hash_table[h] = idx;
            }
            idx += 1;
        }
        self.next_to_update = target.max(self.next_to_update);
    }

    /// `findBestMatch(ip)`: insert up to `ip`, then walk the chain for the
    /// longest match.
    ///
    /// `i_limit` is the absolute index one past the last byte the caller
    /// will ever try to match against (`iend - LASTLITERALS`-equivalent);
    /// reaching it triggers an early exit once a match already spans it.
    pub fn find_best_match(
        &mut self,
        window: &Window,
        ip: u32,
        cparams: &CParams,
        i_limit: u32,
    ) -> MatchCandidate {
        self.insert(window, ip);
        let start = match window.peek(ip, self.mls as usize) {
            Some(bytes) => self.hash_table[hash_ptr(bytes, self.hash_log, self.mls) as usize],
            None => return MatchCandidate::NONE,
        };
        self.search_chain(window, ip, cparams, i_limit, start)
    }

    /// Internal chain walk shared by [`Self::find_best_match`] and
    /// [`Self::find_best_match_dict_augmented`].
    fn search_chain(
        &self,
        window: &Window,
        ip: u32,
        cparams: &CParams,
        i_limit: u32,
        start: u32,
    ) -> MatchCandidate {
        let lowest = window.lowest_match_index(ip, cparams.window_log);
        let chain_floor = ip.saturating_sub(1u32 << cparams.chain_log);
        let max_attempts = 1u32 << cparams.search_log;
        let mut attempts = 0u32;
        let mut match_index = start;
        let mut best = MatchCandidate::NONE;

        while match_index != NOT_FOUND
            && match_index >= lowest
            && match_index >= chain_floor
            && attempts < max_attempts
        {
            attempts += 1;
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
            match_index = self.chain_table[self.chain_idx(match_index)];
        }
        best
    }

    /// Dictionary-augmented search for [`crate::params::DictMode::DictMatchState`]:
    /// after the usual chain walk in `window`, also walk `dict_index`'s chain
    /// (built over `dict_window`), rebasing offsets found there by
    /// `window.low_limit - dict_window.next_src()`. HC, BT, and Row all apply
    /// this same rebasing rule.
    pub fn find_best_match_dict_augmented(
        &mut self,
        window: &Window,
        ip: u32,
        cparams: &CParams,
        i_limit: u32,
        dict_index: &HashChainIndex,
        dict_window: &Window,
    ) -> MatchCandidate {
        let mut best = self.find_best_match(window, ip, cparams, i_limit);

        let bytes = match window.peek(ip, self.mls as usize) {
            Some(b) => b,
            None => return best,
        };
        let h = hash_ptr(bytes, dict_index.hash_log, dict_index.mls) as usize;
        let dict_start = dict_index.hash_table[h];
        if dict_start == NOT_FOUND {
            return best;
        }
        let rebase = window.low_limit as i64 - dict_window.next_src() as i64;
        let lowest = dict_window.low_limit;
        let chain_floor = dict_window
            .next_src()
            .saturating_sub(1u32 << cparams.chain_log);
        let max_attempts = 1u32 << cparams.search_log;
        let mut attempts = 0u32;
        let mut match_index = dict_start;

        while match_index != NOT_FOUND
            && match_index >= lowest
            && match_index >= chain_floor
            && attempts < max_attempts
        {
            attempts += 1;
            let ip_span = window.span_from(ip);
            let cand_span = dict_window.span_from(match_index);
            let len = crate::matchlen::count(ip_span, cand_span) as u32;
            if len > best.length {
                let rebased_index = (match_index as i64 + rebase) as u32;
                if ip > rebased_index {
                    best = MatchCandidate {
                        length: len,
                        offset: ip - rebased_index,
                    };
                }
            }
            match_index = dict_index.chain_table[dict_index.chain_idx(match_index)];
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Strategy;

    fn cparams() -> CParams {
        CParams {
            hash_log: 10,
            chain_log: 10,
            search_log: 6,
            window_log: 20,
            min_match: 4,
            row_log: 4,
            strategy: Strategy::Greedy,
        }
    }

    #[test]
    fn finds_repeated_pattern() {
        let data = b"abcdabcdabcd";
        let w = Window::no_dict(data);
        let cp = cparams();
        let mut idx = HashChainIndex::new(&cp);
        let cand = idx.find_best_match(&w, 8, &cp, data.len() as u32);
        assert!(cand.length >= 4);
        assert_eq!(cand.offset, 4);
    }

    #[test]
    fn no_match_on_unique_bytes() {
        let data = b"abcdefgh";
        let w = Window::no_dict(data);
        let cp = cparams();
        let mut idx = HashChainIndex::new(&cp);
        let cand = idx.find_best_match(&w, 4, &cp, data.len() as u32);
        assert!(cand.is_none());
    }
}
