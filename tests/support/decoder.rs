//! Minimal reference decoder for the sequence stream this crate emits.
//!
//! Test scaffolding only — entropy coding and framing are out of scope for
//! this crate's production surface: turns `(litLen, offsetCode, matchLen)`
//! records back into bytes so the round-trip law can be asserted directly
//! against the parser's output.

use lazy_matchfinder::params::MINMATCH;
use lazy_matchfinder::repcode::{RepKind, RepState};
use lazy_matchfinder::seqstore::Sequence;

/// Reconstruct the original block from `sequences` + their literal bytes +
/// any trailing literal bytes, given the same initial repeat-offset state
/// the encoder started with and the same dictionary bytes (empty if none).
pub fn decode(
    sequences: &[Sequence],
    literals: &[u8],
    trailing_literals: &[u8],
    mut rep: RepState,
    dict: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut lit_cursor = 0usize;

    for seq in sequences {
        let lit_end = lit_cursor + seq.lit_len as usize;
        out.extend_from_slice(&literals[lit_cursor..lit_end]);
        lit_cursor = lit_end;

        let (raw_offset, kind) = rep.resolve(seq.offset_code);
        match kind {
            RepKind::Rep0 => rep.push_rep0(),
            RepKind::Rep1 => rep.push_rep1(),
            RepKind::Rep0Minus1 | RepKind::Normal => rep.push_normal(raw_offset),
        }

        let match_len = seq.match_len_minus_min + MINMATCH;
        let stream_len_before = dict.len() + out.len();
        let mut src_pos = stream_len_before as i64 - raw_offset as i64;
        for _ in 0..match_len {
            let byte = if (src_pos as usize) < dict.len() {
                dict[src_pos as usize]
            } else {
                out[src_pos as usize - dict.len()]
            };
            out.push(byte);
            src_pos += 1;
        }
    }

    out.extend_from_slice(trailing_literals);
    out
}
