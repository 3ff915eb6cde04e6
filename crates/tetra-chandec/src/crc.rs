//! C6: CRC / bad-frame-indicator verification (§4.5).
//!
//! The teacher's `lmac/components/crc16.rs` computes a CRC-16 (ITU-T) over a
//! contiguous bitstream — a different algorithm from the one this channel
//! uses, which instead folds parity over a sparse, signed-index table of
//! class-2 ranks (`TAB_CRCk` in the original coder). Only the bit-level
//! helper style (`get_nth_bit`-style indexing) is reused from the teacher;
//! the fold itself is grounded in `original_source/AMR-Code/init_params.c`'s
//! `ALLOW_NEG` macro, which this module represents directly as a tagged
//! `(index, flip)` pair instead of a signed/encoded integer. The generated
//! tables this crate ships (see [`round_robin_groups`]) never set `flip`,
//! since no surviving annex data says which ranks a real table would invert;
//! `flip` stays on `CrcTap` so a real `TAB_CRCk` table could be substituted
//! in directly.

/// One tap into the class-2 bit vector contributing to a CRC parity bit.
/// Mirrors the original `ALLOW_NEG(x)` encoding, where a negative table
/// entry meant "take this rank's complement" — represented here as an
/// explicit `flip` flag rather than a sign-encoded index.
#[derive(Debug, Clone, Copy)]
pub struct CrcTap {
    /// Rank into the class-2 bit vector (0-based).
    pub index: u16,
    /// Whether this tap's contribution is inverted before folding.
    pub flip: bool,
}

/// One CRC output bit: the XOR-fold of all of its taps.
pub type CrcGroup = Vec<CrcTap>;

/// Computes the `groups.len()`-bit CRC over a frame's hard-decided class-2
/// bits (the Viterbi decoder's output) and compares it against the
/// transmitted check bits (`received_check`, read from the tail of the same
/// class-2 vector by the caller). Returns `true` (bad frame indicator set)
/// when any check bit mismatches.
pub fn compute_bfi(groups: &[CrcGroup], class2: &[u8], received_check: &[u8]) -> bool {
    assert_eq!(groups.len(), received_check.len());
    for (group, &expected) in groups.iter().zip(received_check) {
        let mut parity = 0u8;
        for tap in group {
            let mut bit = class2[tap.index as usize];
            if tap.flip {
                bit ^= 1;
            }
            parity ^= bit;
        }
        if parity != expected {
            return true;
        }
    }
    false
}

/// Builds a deterministic assignment of `num_ranks` class-2 data ranks to
/// `num_groups` CRC groups. Used where the real annex `TAB_CRCk` constants
/// aren't available (see `DESIGN.md`); any real table can be substituted by
/// constructing `CrcGroup`s directly.
///
/// `compute_bfi` folds each group's taps against a check bit read back out
/// of the frame itself rather than an independently-computed value, so a
/// uniform (all-zero or all-one) frame must fold to that same uniform bit in
/// every group or every clean, uniform frame trips a false BFI. This holds
/// by construction here: each group gets exactly one un-flipped base tap
/// (whose fold for a uniform frame is just that bit), and any remaining
/// ranks are folded in as matched pairs — two *different* ranks that, for a
/// uniform frame, both carry the same bit and so XOR away to `0`, leaving
/// the group's parity unchanged no matter how many pairs it picks up. If
/// `num_ranks - num_groups` is odd, one rank is left untapped (still valid
/// data, just not covered by any check) rather than break that invariant.
pub fn round_robin_groups(num_ranks: usize, num_groups: usize) -> Vec<CrcGroup> {
    let mut groups = vec![CrcGroup::new(); num_groups];
    for g in 0..num_groups.min(num_ranks) {
        groups[g].push(CrcTap { index: g as u16, flip: false });
    }

    let mut rank = num_groups;
    let mut g = 0;
    while rank + 1 < num_ranks {
        groups[g % num_groups].push(CrcTap { index: rank as u16, flip: false });
        groups[g % num_groups].push(CrcTap { index: (rank + 1) as u16, flip: false });
        rank += 2;
        g += 1;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_check_bits(groups: &[CrcGroup], class2: &[u8]) -> Vec<u8> {
        groups
            .iter()
            .map(|group| {
                let mut parity = 0u8;
                for tap in group {
                    let mut bit = class2[tap.index as usize];
                    if tap.flip {
                        bit ^= 1;
                    }
                    parity ^= bit;
                }
                parity
            })
            .collect()
    }

    #[test]
    fn clean_frame_has_bfi_false() {
        let groups = round_robin_groups(30, 8);
        let class2: Vec<u8> = (0..30).map(|i| if i % 3 == 0 { 0 } else { 1 }).collect();
        let check = encode_check_bits(&groups, &class2);
        assert!(!compute_bfi(&groups, &class2, &check));
    }

    #[test]
    fn single_bit_corruption_sets_bfi() {
        let groups = round_robin_groups(30, 8);
        let class2: Vec<u8> = vec![1; 30];
        let check = encode_check_bits(&groups, &class2);
        let mut corrupted = class2.clone();
        corrupted[5] = 0;
        assert!(compute_bfi(&groups, &corrupted, &check));
    }

    #[test]
    fn round_robin_groups_cover_every_rank_when_remainder_is_even() {
        // 24 - 4 = 20, even: every rank gets tapped exactly once.
        let groups = round_robin_groups(24, 4);
        let mut seen = vec![false; 24];
        for group in &groups {
            for tap in group {
                assert!(!seen[tap.index as usize], "rank visited twice");
                seen[tap.index as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn round_robin_groups_leaves_at_most_one_rank_untapped_when_remainder_is_odd() {
        // 25 - 4 = 21, odd: one rank is left out rather than break the
        // pairing invariant.
        let groups = round_robin_groups(25, 4);
        let mut seen = vec![false; 25];
        for group in &groups {
            for tap in group {
                assert!(!seen[tap.index as usize], "rank visited twice");
                seen[tap.index as usize] = true;
            }
        }
        assert_eq!(seen.iter().filter(|&&s| !s).count(), 1);
    }

    /// The real regression case: `compute_bfi` reads its "received" check
    /// bits back out of the same frame it's verifying, so a uniform frame
    /// must fold to a uniform result in every group, for every `(num_ranks,
    /// num_groups)` pair actually used by `params::build_tetra` /
    /// `build_amr475` (both normal and stolen budgets, both coder types).
    #[test]
    fn groups_are_self_consistent_for_uniform_frames() {
        for &(num_ranks, num_groups) in &[(22usize, 8usize), (26, 4), (17, 8), (21, 4)] {
            let groups = round_robin_groups(num_ranks, num_groups);
            for &bit in &[0u8, 1u8] {
                let class2 = vec![bit; num_ranks + num_groups];
                let received_check = vec![bit; num_groups];
                assert!(
                    !compute_bfi(&groups, &class2, &received_check),
                    "uniform frame of {bit}s with ({num_ranks}, {num_groups}) must not trip bfi"
                );
            }
        }
    }
}
