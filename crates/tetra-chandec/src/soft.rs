//! Soft-decision sample type shared by every decoder stage.

/// A signed soft-decision sample. `+127` is a strong `1`, `-127` a strong `0`,
/// `0` is an erasure (injected by depuncturing, or simply "unknown").
///
/// Arithmetic on these widens to [`Accum`] internally; [`SoftSample`] itself
/// stays within `i16` so it matches the wire format (one sample per 16-bit
/// word) exactly.
pub type SoftSample = i16;

/// Accumulator type for path metrics and branch-metric sums. Matches the
/// decoder's own `i16` saturation contract (see [`crate::viterbi`]).
pub type Accum = i16;

/// One radio time-slot: 432 soft samples, first half-slot `0..216`, second `216..432`.
pub const SLOT_LEN: usize = 432;
pub const HALF_SLOT_LEN: usize = SLOT_LEN / 2;

/// A single TDMA slot of soft samples, always exactly [`SLOT_LEN`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot(pub [SoftSample; SLOT_LEN]);

impl Slot {
    pub fn from_slice(samples: &[SoftSample]) -> Self {
        assert_eq!(samples.len(), SLOT_LEN, "slot must carry exactly {SLOT_LEN} samples");
        let mut arr = [0 as SoftSample; SLOT_LEN];
        arr.copy_from_slice(samples);
        Self(arr)
    }

    pub fn first_half(&self) -> &[SoftSample] {
        &self.0[..HALF_SLOT_LEN]
    }

    pub fn second_half(&self) -> &[SoftSample] {
        &self.0[HALF_SLOT_LEN..]
    }
}
