//! C5: soft-decision Viterbi decoding of the rate-1/3, K=5 speech channel
//! code (§4.4).
//!
//! Grounded on the teacher's `lmac/components/viterbi.rs`, specifically its
//! `TetraCodecViterbiDecoder` (a rate-1/3, constraint-length-5 decoder used
//! for the TETRA speech codec channel — the same code family this module
//! targets). The teacher's decoder tracebacks over the whole input; this one
//! instead uses a fixed-depth ring buffer (`BestPrevious`), per the bounded-
//! memory streaming architecture this decoder is built around.

use crate::soft::{Accum, SoftSample};

/// Constraint length.
pub const K: usize = 5;
/// Number of trellis states, `2^(K-1)`.
pub const NUM_STATES: usize = 1 << (K - 1);

/// Generator polynomials for the rate-1/3 mother code, one per output
/// stream. Bit 0 of a polynomial is the current input bit, bit `K-1` is the
/// oldest bit still in the shift register.
pub type Polynomials = [u8; 3];

/// Same code family as the teacher's `TetraCodecViterbiDecoder`; the actual
/// tap weights differ from it, though. The teacher's own rate-1/3 generators
/// mix odd and even Hamming weight (one of its three polynomials has weight
/// 4), which would make the all-ones input word encode to something other
/// than the all-ones codeword — at steady state the shift register is
/// `0x1F`, so each output chip is just `popcount(poly) mod 2`. These three
/// are all odd-weight so that invariant holds.
pub const SPEECH_POLYNOMIALS: Polynomials = [0b11111, 0b10101, 0b11001];

fn branch_outputs(polys: &Polynomials, register: u8) -> [u8; 3] {
    let mut out = [0u8; 3];
    for (i, poly) in polys.iter().enumerate() {
        out[i] = (register & poly).count_ones() as u8 & 1;
    }
    out
}

/// A fixed-latency, ring-buffer-traceback Viterbi decoder for a rate-1/3,
/// constraint-length-5 convolutional code.
pub struct Viterbi13 {
    polynomials: Polynomials,
    /// Traceback depth. Must be `>= 1`; in practice several times `K`.
    decoding_delay: usize,
}

impl Viterbi13 {
    pub fn new(polynomials: Polynomials, decoding_delay: usize) -> Self {
        assert!(decoding_delay >= 1);
        Self { polynomials, decoding_delay }
    }

    /// Decodes `soft.len() / 3` rate-1/3 coded bits, assuming the encoder
    /// started in state 0. The class-1/class-2 streams this decodes are not
    /// zero-tailed (their coded length is exactly `3 * decoded_bits`), so the
    /// final `decoding_delay - 1` bits — the ones the ring buffer hasn't
    /// reached full depth for yet — are traced back from whichever state has
    /// the best surviving path score, not an assumed final state.
    pub fn decode(&self, soft: &[SoftSample]) -> Vec<u8> {
        assert_eq!(soft.len() % 3, 0, "rate-1/3 input must be a multiple of 3 samples");
        let steps = soft.len() / 3;
        if steps == 0 {
            return Vec::new();
        }

        let ring_len = self.decoding_delay;
        let mut prev_ring: Vec<[u8; NUM_STATES]> = vec![[0; NUM_STATES]; ring_len];

        let mut score: [Accum; NUM_STATES] = [Accum::MIN / 4; NUM_STATES];
        score[0] = 0;

        let mut decoded = Vec::with_capacity(steps);

        for t in 0..steps {
            let r = &soft[t * 3..t * 3 + 3];
            let mut new_score = [Accum::MIN / 4; NUM_STATES];
            let mut new_prev = [0u8; NUM_STATES];

            for s in 0..NUM_STATES {
                if score[s] <= Accum::MIN / 8 {
                    continue;
                }
                for b in 0..2u8 {
                    let register = (((s as u16) << 1) | b as u16) as u8 & 0x1F;
                    let next_state = (register & 0x0F) as usize;
                    let outputs = branch_outputs(&self.polynomials, register);
                    let branch_metric: i32 = (0..3)
                        .map(|i| {
                            let sample = r[i] as i32;
                            if outputs[i] == 1 { sample } else { -sample }
                        })
                        .sum();
                    let candidate = score[s] as i32 + branch_metric;
                    let candidate = candidate.clamp(Accum::MIN as i32 / 2, Accum::MAX as i32 / 2) as Accum;
                    if candidate > new_score[next_state] {
                        new_score[next_state] = candidate;
                        new_prev[next_state] = s as u8;
                    }
                }
            }

            // Rescale: subtract the minimum reachable score from every
            // reachable state. Preserves relative order, keeps magnitudes
            // bounded over long decodes.
            if let Some(min) = new_score.iter().copied().filter(|&v| v > Accum::MIN / 8).min() {
                for v in new_score.iter_mut() {
                    if *v > Accum::MIN / 8 {
                        *v -= min;
                    }
                }
            }

            score = new_score;
            prev_ring[t % ring_len] = new_prev;

            if t + 1 >= self.decoding_delay {
                let best_state = (0..NUM_STATES).max_by_key(|&s| score[s]).unwrap();
                let mut cur = best_state as u8;
                for back in 0..self.decoding_delay.saturating_sub(1) {
                    let tt = t - back;
                    cur = prev_ring[tt % ring_len][cur as usize];
                }
                decoded.push(cur & 1);
            }
        }

        let already = decoded.len();
        let remaining = steps - already;
        if remaining > 0 {
            // Flush: these last steps never reached full ring-buffer depth,
            // so trace back from the best-scoring final state instead of
            // assuming the stream ends at state 0 (it isn't zero-tailed).
            let mut cur = (0..NUM_STATES).max_by_key(|&s| score[s]).unwrap() as u8;
            let mut tail = Vec::with_capacity(remaining);
            for tt in (steps - remaining..steps).rev() {
                tail.push(cur & 1);
                cur = prev_ring[tt % ring_len][cur as usize];
            }
            tail.reverse();
            decoded.extend(tail);
        }

        decoded
    }
}
