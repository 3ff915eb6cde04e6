//! Error kinds for the decoder's external collaborators (CLI, burst reader, writer).
//!
//! The CORE pipeline itself (C3-C8) never returns an error: a malformed or
//! corrupted slot is still decoded and the CRC verifier is the only mechanism
//! that flags it, via BFI. See `DecodeError does not exist by design` below.

/// Errors surfaced by components outside the CORE pipeline: argument parsing
/// and file I/O. Deliberately does not implement `std::error::Error` or carry
/// a `thiserror`/`anyhow` dependency, matching `tetra_core`'s own
/// `PduParseErr` style.
#[derive(Debug)]
pub enum DecoderError {
    /// Bad argument count or an out-of-range `CoderType`.
    UsageError(String),
    /// I/O error while opening or writing a file.
    IoError(std::io::Error),
    /// Clean end of input: the burst reader could not read a full slot
    /// because the input stream has been exhausted exactly at a slot boundary.
    EndOfStream,
    /// A short read: fewer than a full slot's worth of samples remained,
    /// which means the input file is truncated mid-slot.
    ShortRead { expected: usize, got: usize },
}

impl std::fmt::Display for DecoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderError::UsageError(msg) => write!(f, "usage error: {msg}"),
            DecoderError::IoError(e) => write!(f, "I/O error: {e}"),
            DecoderError::EndOfStream => write!(f, "end of stream"),
            DecoderError::ShortRead { expected, got } => {
                write!(f, "short read: expected {expected} samples, got {got}")
            }
        }
    }
}

impl From<std::io::Error> for DecoderError {
    fn from(e: std::io::Error) -> Self {
        DecoderError::IoError(e)
    }
}
