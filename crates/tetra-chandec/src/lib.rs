//! TETRA/AMR475 traffic-channel decoder CORE.
//!
//! Pipeline: [`burst_reader`] → [`interleaver`] → [`depuncture`] →
//! [`viterbi`] → [`crc`] → [`reorder`], driven per-slot by
//! [`frame_controller`] using a [`params::ParamSet`] built once from a
//! [`coder_type::CoderType`].

pub mod burst_reader;
pub mod coder_type;
pub mod crc;
pub mod depuncture;
pub mod error;
pub mod frame_controller;
pub mod interleaver;
pub mod params;
pub mod reorder;
pub mod soft;
pub mod viterbi;

pub use burst_reader::BurstReader;
pub use coder_type::CoderType;
pub use error::DecoderError;
pub use frame_controller::{default_frame_stealing_schedule, FrameController, FrameResult, SlotResult};
pub use params::ParamSet;
pub use soft::{Slot, SoftSample, HALF_SLOT_LEN, SLOT_LEN};
