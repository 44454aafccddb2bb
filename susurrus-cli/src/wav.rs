// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `wav` module loads and stores waveforms as WAV files.
//!
//! Input files may use any sample rate, bit depth, and channel count;
//! channels are downmixed to mono by arithmetic averaging. Output is
//! 16-bit PCM mono.

use std::io;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use susurrus_core::errors::{decode_error, Error, Result};

fn wav_error(err: hound::Error) -> Error {
    match err {
        hound::Error::IoError(err) => Error::IoError(err),
        other => Error::IoError(io::Error::new(io::ErrorKind::InvalidData, other.to_string())),
    }
}

/// Load a WAV file as a mono float stream, returning it with its sample rate.
pub fn read_mono<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let mut reader = WavReader::open(path).map_err(wav_error)?;
    let spec = reader.spec();

    let channels = usize::from(spec.channels);
    if channels == 0 {
        return decode_error("wav has no channels");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => {
            reader.samples::<f32>().collect::<hound::Result<_>>().map_err(wav_error)?
        }
        SampleFormat::Int => {
            // Scale integer PCM to [-1, +1] by its own full-scale value.
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;

            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<hound::Result<_>>()
                .map_err(wav_error)?
        }
    };

    let mono = interleaved
        .chunks_exact(channels)
        .map(|chans| chans.iter().sum::<f32>() / channels as f32)
        .collect();

    Ok((mono, spec.sample_rate))
}

/// Store a mono float stream as a 16-bit PCM WAV file.
pub fn write_mono<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_error)?;

    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(quantized).map_err(wav_error)?;
    }

    writer.finalize().map_err(wav_error)
}
