// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use susurrus_core::errors::{config_error, Result};
use susurrus_core::frame;

/// The transmit sample rate in Hertz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// A symbol must span at least this many samples for the detector to
/// discriminate the two tones reliably.
pub const MIN_SAMPLES_PER_BIT: usize = 40;

/// The preamble is never shorter than this many bits.
pub const MIN_PREAMBLE_BITS: usize = 32;

/// Modulation and synchronization parameters.
///
/// Transmitter and receiver must agree on `freq0`, `freq1`, `bit_duration`,
/// `preamble_seconds`, and `repetition`; the remaining fields are local
/// policy and may differ between the two ends.
#[derive(Clone, Debug)]
pub struct ModemParams {
    /// Tone frequency for bit 0, in Hertz.
    pub freq0: f64,
    /// Tone frequency for bit 1, in Hertz.
    pub freq1: f64,
    /// Duration of one symbol, in seconds.
    pub bit_duration: f64,
    /// Duration of the alternating preamble, in seconds.
    pub preamble_seconds: f64,
    /// Symbols transmitted per data bit. Odd, so majority votes cannot tie.
    pub repetition: usize,
    /// Base amplitude of the synthesized tones.
    pub amplitude: f32,
    /// Scale applied to the signal when mixing over a cover waveform.
    pub stego_strength: f32,
    /// Scale applied to the cover waveform when mixing.
    pub cover_gain: f32,
    /// How far into the capture the coarse search scans, in seconds.
    pub search_seconds: f64,
    /// The coarse scan advances by `spb / coarse_step_frac` samples.
    pub coarse_step_frac: usize,
    /// Refinement probes `2 * refine_steps` positions across one symbol.
    pub refine_steps: usize,
    /// The coarse scan stops early once a candidate scores this fraction of
    /// the preamble bits.
    pub early_stop_ratio: f64,
    /// The largest payload length accepted by the receiver.
    pub len_max: u32,
    /// Target RMS for capture normalization.
    pub rms_target: f32,
    /// High-pass cutoff of the capture bandpass, in Hertz.
    pub highpass_hz: f64,
    /// Low-pass cutoff of the capture bandpass, in Hertz.
    pub lowpass_hz: f64,
    /// Quality factor of both bandpass sections.
    pub filter_q: f64,
}

impl Default for ModemParams {
    fn default() -> Self {
        ModemParams {
            freq0: 1200.0,
            freq1: 2200.0,
            bit_duration: 0.015,
            preamble_seconds: 1.5,
            repetition: 3,
            amplitude: 0.87,
            stego_strength: 0.2,
            cover_gain: 0.3,
            search_seconds: 3.0,
            coarse_step_frac: 6,
            refine_steps: 24,
            early_stop_ratio: 0.93,
            len_max: frame::LEN_MAX,
            rms_target: 0.25,
            highpass_hz: 700.0,
            lowpass_hz: 2600.0,
            filter_q: std::f64::consts::FRAC_1_SQRT_2,
        }
    }
}

impl ModemParams {
    /// Check the parameter set for values the modem cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.repetition % 2 == 0 {
            return config_error("repetition count must be odd");
        }
        Ok(())
    }

    /// Samples per symbol at the given sample rate.
    pub fn samples_per_bit(&self, sample_rate: u32) -> Result<usize> {
        let spb = (f64::from(sample_rate) * self.bit_duration).round() as usize;
        if spb < MIN_SAMPLES_PER_BIT {
            return config_error("bit duration too short for the sample rate");
        }
        Ok(spb)
    }

    /// Number of bits in the preamble, clamped to the protocol minimum.
    pub fn preamble_bits(&self) -> usize {
        let bits = (self.preamble_seconds / self.bit_duration).round() as usize;
        bits.max(MIN_PREAMBLE_BITS)
    }
}
