//! C2: reads one TDMA slot at a time from a raw little-endian `i16` stream
//! (§4.1).
//!
//! Grounded on `tetra_core`'s general I/O-adapter style (thin wrapper over a
//! `std::io::Read`, no internal buffering or reframing). No analogue exists
//! in the teacher for "read a fixed-size frame of samples", so the adapter
//! itself is new; the error taxonomy it returns is [`DecoderError`], shared
//! with the rest of the crate's non-CORE collaborators.

use std::io::{ErrorKind, Read};

use crate::error::DecoderError;
use crate::soft::{Slot, SoftSample, SLOT_LEN};

/// Reads one [`Slot`] (432 little-endian `i16` samples) at a time from `R`.
/// Does no reframing: the caller is responsible for aligning the stream to
/// slot boundaries (§4.1 — "no reframing logic").
pub struct BurstReader<R> {
    inner: R,
}

impl<R: Read> BurstReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads the next slot. Returns `Err(DecoderError::EndOfStream)` if the
    /// stream ended cleanly on a slot boundary (zero bytes read), or
    /// `Err(DecoderError::ShortRead { .. })` if it ended partway through a
    /// slot.
    pub fn read_slot(&mut self) -> Result<Slot, DecoderError> {
        let mut bytes = [0u8; SLOT_LEN * 2];
        let mut filled = 0;

        loop {
            match self.inner.read(&mut bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecoderError::IoError(e)),
            }
            if filled == bytes.len() {
                break;
            }
        }

        if filled == 0 {
            return Err(DecoderError::EndOfStream);
        }
        if filled != bytes.len() {
            return Err(DecoderError::ShortRead { expected: SLOT_LEN, got: filled / 2 });
        }

        let mut samples = [0 as SoftSample; SLOT_LEN];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = i16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]);
        }
        Ok(Slot(samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn reads_one_full_slot() {
        let samples: Vec<i16> = (0..SLOT_LEN as i16).collect();
        let bytes = slot_bytes(&samples);
        let mut reader = BurstReader::new(&bytes[..]);
        let slot = reader.read_slot().unwrap();
        assert_eq!(&slot.0[..], &samples[..]);
    }

    #[test]
    fn reads_multiple_slots_back_to_back() {
        let a: Vec<i16> = vec![1; SLOT_LEN];
        let b: Vec<i16> = vec![-1; SLOT_LEN];
        let mut bytes = slot_bytes(&a);
        bytes.extend(slot_bytes(&b));
        let mut reader = BurstReader::new(&bytes[..]);
        assert_eq!(reader.read_slot().unwrap().0[0], 1);
        assert_eq!(reader.read_slot().unwrap().0[0], -1);
        assert!(matches!(reader.read_slot(), Err(DecoderError::EndOfStream)));
    }

    #[test]
    fn clean_eof_on_slot_boundary() {
        let bytes: Vec<u8> = Vec::new();
        let mut reader = BurstReader::new(&bytes[..]);
        assert!(matches!(reader.read_slot(), Err(DecoderError::EndOfStream)));
    }

    #[test]
    fn short_read_mid_slot_is_an_error() {
        let samples: Vec<i16> = vec![0; SLOT_LEN];
        let bytes = slot_bytes(&samples);
        let mut reader = BurstReader::new(&bytes[..bytes.len() - 3]);
        match reader.read_slot() {
            Err(DecoderError::ShortRead { expected, got }) => {
                assert_eq!(expected, SLOT_LEN);
                assert!(got < SLOT_LEN);
            }
            other => panic!("expected ShortRead, got {other:?}"),
        }
    }
}
