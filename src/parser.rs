//! Lazy parser.
//!
//! Ported from zstd's `ZSTD_compressBlock_lazy_generic`
//! (`lib/compress/zstd_lazy.c`), the single parameterised loop that drives
//! `greedy`/`lazy`/`lazy2`/`btlazy2` alike — only the search method and the
//! look-ahead depth change. The dispatch over `(dictMode, searchMethod)`
//! happens inside [`crate::matchstate::MatchState`] itself (its `index`
//! field is already the right variant, picked at construction time), so
//! this loop stays free of branches on those parameters.

use crate::matchstate::{DictContext, MatchState};
use crate::params::{MATCH_SAFEGUARD_DISTANCE, REP_MOVE, SEARCH_STRENGTH};
use crate::repcode::RepState;
use crate::seqstore::SeqStore;
use crate::window::Window;

/// Raw match length below which a candidate is not worth emitting: the
/// minimum emittable `matchLen` is 4. Distinct from
/// [`crate::params::MINMATCH`], which is the constant *subtracted* from an
/// accepted match length before it is stored.
const MIN_EMIT_LEN: u32 = 4;

#[inline]
fn highbit32(v: u32) -> i64 {
    if v == 0 {
        0
    } else {
        (31 - v.leading_zeros()) as i64
    }
}

/// Quick 4-byte gate followed by a full [`crate::matchlen::match_length`]
/// call, used for both the repeat-code probes and the immediate-rep chain.
/// Returns `None` if `rep_offset` is the disabled sentinel, the candidate
/// falls outside the window, or the full match comes in under
/// [`MIN_EMIT_LEN`].
#[inline]
fn quick_rep_check(window: &Window, pos: u32, rep_offset: u32) -> Option<u32> {
    if rep_offset == 0 {
        return None;
    }
    let match_index = pos.checked_sub(rep_offset)?;
    if match_index < window.low_limit {
        return None;
    }
    let a = window.span_from(pos);
    let b = window.span_from(match_index);
    if a.len() < 4 || b.len() < 4 || a[..4] != b[..4] {
        return None;
    }
    let len = crate::matchlen::match_length(window, pos, match_index);
    if len >= MIN_EMIT_LEN {
        Some(len)
    } else {
        None
    }
}

#[inline]
fn search(
    ms: &mut MatchState,
    window: &Window,
    ip: u32,
    i_limit: u32,
    dict: Option<&DictContext>,
) -> crate::index::MatchCandidate {
    match dict {
        Some(d) => ms.find_best_match_with_dict(window, ip, i_limit, d),
        None => ms.find_best_match(window, ip, i_limit),
    }
}

/// `compressBlock(ms, seqStore, rep, src, srcSize) -> litRemaining`.
/// `window` must already cover `[block_start, block_end)` in its prefix (or,
/// for `ExtDict`, split across `dict`/`prefix` per [`Window`]'s own
/// addressing). `dict` must be `Some` iff `ms.dict_mode` is `DictMatchState`
/// or `DedicatedDictSearch`.
pub fn compress_block(
    ms: &mut MatchState,
    seq_store: &mut SeqStore,
    rep: &mut RepState,
    window: &Window,
    block_start: u32,
    block_end: u32,
    dict: Option<&DictContext>,
) -> u32 {
    debug_assert!(block_end >= block_start);
    if block_end - block_start <= MATCH_SAFEGUARD_DISTANCE as u32 {
        return block_end - block_start;
    }
    let i_limit = block_end - MATCH_SAFEGUARD_DISTANCE as u32;
    let depth = ms.cparams.strategy.depth();

    let mut anchor = block_start;
    let mut ip = block_start;
    // No history yet: the first byte of the very first block can never be a
    // match.
    if block_start == window.low_limit && window.loaded_dict_end == 0 {
        ip += 1;
    }

    // Defensive drop: a repeat offset inherited from a prior session that
    // no longer fits the current window is disabled for the block and
    // restored at the end if nothing replaced it.
    let window_size = window.next_src().saturating_sub(window.low_limit);
    let saved_rep0 = if rep.rep0 > window_size {
        let saved = rep.rep0;
        rep.rep0 = 0;
        Some(saved)
    } else {
        None
    };

    while ip < i_limit {
        let mut cur_len;
        let mut cur_offset = 0u32; // 0 sentinel == "rep0"; else rawOffset + REP_MOVE.
        let mut cur_start;
        let mut emit_now = false;

        match quick_rep_check(window, ip + 1, rep.rep0) {
            Some(len) => {
                cur_len = len;
                cur_start = ip + 1;
                if depth == 0 {
                    emit_now = true;
                }
            }
            None => {
                cur_len = 0;
                cur_start = ip + 1;
            }
        }

        if !emit_now {
            let primary = search(ms, window, ip, i_limit, dict);
            if primary.length >= MIN_EMIT_LEN && primary.length > cur_len {
                cur_len = primary.length;
                cur_offset = primary.offset + REP_MOVE;
                cur_start = ip;
            }

            if cur_len < MIN_EMIT_LEN {
                ip += ((ip - anchor) >> SEARCH_STRENGTH) + 1;
                continue;
            }

            if depth >= 1 {
                'lookahead: while ip < i_limit {
                    ip += 1;

                    if let Some(ml_rep) = quick_rep_check(window, ip, rep.rep0) {
                        let gain2 = ml_rep as i64 * 3;
                        let gain1 = cur_len as i64 * 3 - highbit32(cur_offset + 1) + 1;
                        if gain2 > gain1 {
                            cur_len = ml_rep;
                            cur_offset = 0;
                            cur_start = ip;
                        }
                    }

                    let cand = search(ms, window, ip, i_limit, dict);
                    if cand.length >= MIN_EMIT_LEN {
                        let new_offset = cand.offset + REP_MOVE;
                        let gain2 = cand.length as i64 * 4 - highbit32(new_offset + 1);
                        let gain1 = cur_len as i64 * 4 - highbit32(cur_offset + 1) + 4;
                        if gain2 > gain1 {
                            cur_len = cand.length;
                            cur_offset = new_offset;
                            cur_start = ip;
                            continue 'lookahead;
                        }
                    }

                    if depth == 2 && ip < i_limit {
                        ip += 1;

                        if let Some(ml_rep) = quick_rep_check(window, ip, rep.rep0) {
                            let gain2 = ml_rep as i64 * 4;
                            let gain1 = cur_len as i64 * 4 - highbit32(cur_offset + 1) + 1;
                            if gain2 > gain1 {
                                cur_len = ml_rep;
                                cur_offset = 0;
                                cur_start = ip;
                            }
                        }

                        let cand2 = search(ms, window, ip, i_limit, dict);
                        if cand2.length >= MIN_EMIT_LEN {
                            let new_offset = cand2.offset + REP_MOVE;
                            let gain2 = cand2.length as i64 * 4 - highbit32(new_offset + 1);
                            let gain1 = cur_len as i64 * 4 - highbit32(cur_offset + 1) + 7;
                            if gain2 > gain1 {
                                cur_len = cand2.length;
                                cur_offset = new_offset;
                                cur_start = ip;
                                continue 'lookahead;
                            }
                        }
                    }
                    break;
                }
            }
        }

        // Catch-up: extend the match backward into the pending literals.
        let raw_offset = if cur_offset == 0 {
            rep.rep0
        } else {
            cur_offset - REP_MOVE
        };
        let mut start = cur_start;
        let mut match_len = cur_len;
        while start > anchor {
            let match_index = match start.checked_sub(raw_offset) {
                Some(v) if v > window.low_limit => v,
                _ => break,
            };
            let a = window.span_from(start - 1).first().copied();
            let b = window.span_from(match_index - 1).first().copied();
            match (a, b) {
                (Some(x), Some(y)) if x == y => {
                    start -= 1;
                    match_len += 1;
                }
                _ => break,
            }
        }

        // Emit.
        let lit_len = (start - anchor) as usize;
        let literals = &window.span_from(anchor)[..lit_len];
        let offset_code = if cur_offset == 0 { 1 } else { cur_offset };
        seq_store.store_seq(literals, offset_code, match_len - crate::params::MINMATCH);
        if offset_code == 1 {
            rep.push_rep0();
        } else {
            rep.push_normal(offset_code - REP_MOVE);
        }
        anchor = start + match_len;
        ip = anchor;

        // Immediate repeat chain.
        while ip < i_limit {
            match quick_rep_check(window, ip, rep.rep1) {
                Some(len) => {
                    rep.push_rep1();
                    seq_store.store_seq(&[], 1, len - crate::params::MINMATCH);
                    ip += len;
                    anchor = ip;
                }
                None => break,
            }
        }
    }

    if let Some(saved) = saved_rep0 {
        if rep.rep0 == 0 {
            rep.rep0 = saved;
        }
    }

    block_end - anchor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{CParams, DictMode, SearchMethod, Strategy};

    fn cparams(strategy: Strategy) -> CParams {
        CParams {
            hash_log: 12,
            chain_log: 12,
            search_log: 6,
            window_log: 20,
            min_match: 4,
            row_log: 4,
            strategy,
        }
    }

    fn run(data: &[u8], strategy: Strategy, method: SearchMethod) -> (SeqStore, u32) {
        let mut ms = MatchState::new(cparams(strategy), method, DictMode::None).unwrap();
        let mut seq_store = SeqStore::new();
        let mut rep = RepState::new(1, 4);
        let window = Window::no_dict(data);
        let lit_remaining =
            compress_block(&mut ms, &mut seq_store, &mut rep, &window, 0, data.len() as u32, None);
        (seq_store, lit_remaining)
    }

    #[test]
    fn greedy_repeated_run_emits_one_match() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let (store, lit_remaining) = run(data, Strategy::Greedy, SearchMethod::HashChain);
        assert!(!store.is_empty());
        assert_eq!(
            store.total_match_bytes() + store.literals().len() as u64 + lit_remaining as u64,
            data.len() as u64
        );
    }

    #[test]
    fn lazy_finds_periodic_pattern() {
        let data = b"abcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabc";
        let (store, _lit_remaining) = run(data, Strategy::Lazy, SearchMethod::HashChain);
        assert!(!store.is_empty());
        assert!(store.sequences().iter().any(|s| s.offset_code >= crate::params::REP_MOVE));
    }

    #[test]
    fn immediate_rep_chain_fires_on_xy_cycle() {
        let data = b"XXYZXYXYZXYXYZXYXYZXYXYZXYXYZXYXYZXYXYZXYXYZXYXYZXY";
        let (store, _lit_remaining) = run(data, Strategy::Lazy2, SearchMethod::HashChain);
        let rep_seqs = store.sequences().iter().filter(|s| s.offset_code == 1).count();
        assert!(rep_seqs >= 2);
    }

    #[test]
    fn unique_bytes_leave_everything_as_literals() {
        let data = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let (store, lit_remaining) = run(data, Strategy::Lazy2, SearchMethod::RowHash);
        assert!(store.is_empty());
        assert_eq!(lit_remaining, data.len() as u32);
    }
}
