//! C3: block de-interleaving of a radio slot (§4.2).
//!
//! Grounded on the teacher's `lmac/components/interleaver.rs`, which already
//! implements the ETSI block-interleaving permutation used for TETRA's
//! control-plane channels (`errorcontrol.rs`'s `block_interleave`/
//! `block_deinterleave`). Generalized here from `u8` bit arrays to
//! [`SoftSample`] slots, since the speech path interleaves soft samples, not
//! hard bits.

use crate::soft::SoftSample;

/// `i`-th (1-indexed) output position of a `k`-point block interleaver with
/// multiplier `a`. `a` must be coprime with `k` for this to be a bijection.
pub const fn block_interl_func(k: u32, a: u32, i: u32) -> u32 {
    1 + ((a.wrapping_mul(i)) % k)
}

/// Inverts `block_interl_func`: writes `output[i] = input[perm(i)]` for
/// `i in 0..k`, i.e. undoes a block interleaving that used multiplier `a`.
pub fn block_deinterleave(k: usize, a: usize, input: &[SoftSample], output: &mut [SoftSample]) {
    assert!(input.len() >= k && output.len() >= k);
    for i in 1..=k {
        let j = block_interl_func(k as u32, a as u32, i as u32) as usize;
        output[i - 1] = input[j - 1];
    }
}

/// Which deinterleaving variant to apply to a slot (§4.2).
#[derive(Debug, Clone, Copy)]
pub struct InterleaveParams {
    /// Multiplier for the full-slot (432-sample) speech deinterleaver.
    pub speech_a: usize,
    /// Multiplier for the half-slot (216-sample) signalling deinterleaver,
    /// applied to the surviving half when frame-stealing is active.
    pub signalling_a: usize,
}

/// Speech variant (§4.2): deinterleaves the whole 432-sample slot in place.
pub fn deinterleave_speech(params: &InterleaveParams, slot: &[SoftSample], out: &mut [SoftSample]) {
    block_deinterleave(slot.len(), params.speech_a, slot, out);
}

/// Signalling variant (§4.2): deinterleaves only the second half-slot
/// (216 samples); the caller is responsible for copying the first half
/// verbatim, since it carries stolen signalling the speech path never decodes.
pub fn deinterleave_signalling_half(params: &InterleaveParams, half_slot: &[SoftSample], out: &mut [SoftSample]) {
    block_deinterleave(half_slot.len(), params.signalling_a, half_slot, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_interleave(k: usize, a: usize, input: &[SoftSample], output: &mut [SoftSample]) {
        assert!(input.len() >= k && output.len() >= k);
        for i in 1..=k {
            let j = block_interl_func(k as u32, a as u32, i as u32) as usize;
            output[j - 1] = input[i - 1];
        }
    }

    #[test]
    fn block_deinterleave_roundtrip() {
        let k = 10;
        let a = 3;
        let data: Vec<SoftSample> = (0..k as i16).collect();
        let mut interleaved = vec![0; k];
        let mut recovered = vec![0; k];

        block_interleave(k, a, &data, &mut interleaved);
        block_deinterleave(k, a, &interleaved, &mut recovered);
        assert_eq!(data, recovered);
    }

    #[test]
    fn full_slot_roundtrip_with_real_constants() {
        // speech_a = 103 is the real ETSI multiplier for a 432-bit block
        // (reused from the teacher's SCH_F channel parameters).
        let k = 432;
        let a = 103;
        let data: Vec<SoftSample> = (0..k as i16).map(|i| i - 200).collect();
        let mut interleaved = vec![0; k];
        block_interleave(k, a, &data, &mut interleaved);
        let mut recovered = vec![0; k];
        block_deinterleave(k, a, &interleaved, &mut recovered);
        assert_eq!(data, recovered);
    }

    #[test]
    fn half_slot_roundtrip_with_real_constants() {
        // signalling_a = 101 is the real ETSI multiplier for a 216-bit block
        // (reused from the teacher's SCH_HD channel parameters).
        let k = 216;
        let a = 101;
        let data: Vec<SoftSample> = (0..k as i16).collect();
        let mut interleaved = vec![0; k];
        block_interleave(k, a, &data, &mut interleaved);
        let mut recovered = vec![0; k];
        block_deinterleave(k, a, &interleaved, &mut recovered);
        assert_eq!(data, recovered);
    }
}
