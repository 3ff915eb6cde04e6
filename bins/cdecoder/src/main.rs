use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;

use tetra_chandec::coder_type::CoderType;
use tetra_chandec::error::DecoderError;
use tetra_chandec::frame_controller::{default_frame_stealing_schedule, FrameController};
use tetra_chandec::soft::SLOT_LEN;
use tetra_chandec::BurstReader;
use tetra_core::debug;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "TETRA/AMR475 channel decoder",
    long_about = "Decodes a raw soft-sample channel capture into framed speech-codec output"
)]
struct Args {
    /// Raw little-endian i16 soft-sample input, 432 samples per slot
    input_file: String,
    /// Framed decoder output
    output_file: String,
    /// 0 = TETRA (default), 1 = AMR475
    coder_type: Option<i32>,
    /// Literal "S" enables the simulation frame-stealing schedule
    stealing_flag: Option<String>,
}

fn usage_exit(msg: String) -> ExitCode {
    eprintln!("usage error: {msg}");
    ExitCode::from(1)
}

fn main() -> ExitCode {
    let _log_guard = debug::setup_logging_default(None);

    // clap's own `Args::parse()` exits with code 2 on a bad invocation; the
    // original `cdecoder`'s usage-error contract is exit code 1, so parse
    // errors are handled here instead. `--help`/`--version` still exit 0
    // through clap's normal path.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e)
            if matches!(e.kind(), clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion) =>
        {
            e.exit()
        }
        Err(e) => return usage_exit(e.to_string()),
    };

    let coder_type = match args.coder_type {
        None => CoderType::Tetra,
        Some(code) => match CoderType::from_code(code) {
            Some(ct) => ct,
            None => return usage_exit(format!("unknown CoderType {code}, expected 0 (TETRA) or 1 (AMR475)")),
        },
    };

    let stealing_enabled = matches!(args.stealing_flag.as_deref(), Some("S"));

    let input = match File::open(&args.input_file) {
        Ok(f) => f,
        Err(e) => return usage_exit(format!("cannot open input {}: {e}", args.input_file)),
    };
    let output = match File::create(&args.output_file) {
        Ok(f) => f,
        Err(e) => return usage_exit(format!("cannot open output {}: {e}", args.output_file)),
    };

    let mut reader = BurstReader::new(input);
    let mut writer = BufWriter::new(output);

    let params = coder_type.build_params();
    let sp_frms_per_tdm = params.sp_frms_per_tdm;
    let length_vocoder_frame = params.length_vocoder_frame;

    // Traceback depth: several times the constraint length, same rule of
    // thumb the teacher's own decoders use.
    let decoding_delay = 32;
    let frame_stealing = move |slot_index: u64| stealing_enabled && default_frame_stealing_schedule(slot_index);
    let mut controller = FrameController::new(params, decoding_delay, frame_stealing);

    let mut slots_processed: u64 = 0;

    loop {
        let slot = match reader.read_slot() {
            Ok(slot) => slot,
            Err(DecoderError::EndOfStream) => break,
            Err(DecoderError::ShortRead { expected, got }) => {
                eprintln!("short read: expected {expected} samples per slot, got {got}");
                break;
            }
            Err(DecoderError::IoError(e)) => {
                eprintln!("I/O error reading slot {slots_processed}: {e}");
                return ExitCode::from(1);
            }
            Err(DecoderError::UsageError(_)) => unreachable!("burst reader never returns UsageError"),
        };
        debug_assert_eq!(slot.0.len(), SLOT_LEN);

        let result = controller.decode_slot(&slot.0);

        if result.frame_stealing {
            tracing::info!("Frame Nb {} was stolen", result.slot_index);
        }
        for (offset, frame) in result.frames.iter().enumerate() {
            if frame.bfi {
                tracing::info!("Frame Nb {} Bfi active", result.slot_index * sp_frms_per_tdm as u64 + offset as u64);
            }
        }

        if let Err(e) = write_slot(&mut writer, coder_type, &result, length_vocoder_frame) {
            eprintln!("I/O error writing slot {}: {e}", result.slot_index);
            break;
        }

        slots_processed += 1;
    }

    if let Err(e) = writer.flush() {
        eprintln!("I/O error flushing output: {e}");
    }

    let speech_frames = slots_processed * sp_frms_per_tdm as u64;
    println!("{slots_processed} Channel Frames processed");
    println!("ie {speech_frames} Speech Frames");

    ExitCode::SUCCESS
}

/// Writes one slot's worth of frames in the wire layout from §6: TETRA packs
/// `<bfi><frame[Lvf]>` pairs back-to-back; AMR475 pads every speech frame out
/// to a fixed 250-sample record carrying a bfi3 flag and a mode word.
fn write_slot<W: Write>(
    writer: &mut W,
    coder_type: CoderType,
    result: &tetra_chandec::SlotResult,
    length_vocoder_frame: usize,
) -> std::io::Result<()> {
    match coder_type {
        CoderType::Tetra => {
            for frame in &result.frames {
                write_sample(writer, frame.bfi as i16)?;
                for &bit in &frame.bits {
                    write_sample(writer, bit as i16)?;
                }
            }
        }
        CoderType::Amr475 => {
            let mode = coder_type.mode_word();
            for frame in &result.frames {
                let bfi3 = if frame.bfi { 3 } else { 0 };
                write_sample(writer, bfi3)?;
                for &bit in &frame.bits {
                    write_sample(writer, bit as i16)?;
                }
                for _ in 0..(244 - length_vocoder_frame) {
                    write_sample(writer, 0)?;
                }
                write_sample(writer, mode)?;
                for _ in 0..4 {
                    write_sample(writer, 0)?;
                }
            }
        }
    }
    Ok(())
}

fn write_sample<W: Write>(writer: &mut W, sample: i16) -> std::io::Result<()> {
    writer.write_all(&sample.to_le_bytes())
}
