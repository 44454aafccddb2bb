// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `detector` module discriminates BFSK symbols by non-coherent I/Q
//! energy comparison.
//!
//! Each decision is a one-point DFT of the symbol window at the two tone
//! frequencies. Energy is phase-insensitive, so sample-level phase offsets
//! between the two ends of the link do not bias the decision.

use std::f64::consts::PI;

use susurrus_core::errors::Result;

use crate::common::ModemParams;

/// Quadrature reference pair for one tone, precomputed over a symbol window.
struct Reference {
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl Reference {
    fn new(freq: f64, sample_rate: u32, spb: usize) -> Reference {
        let w = 2.0 * PI * freq / f64::from(sample_rate);

        Reference {
            cos: (0..spb).map(|n| (w * n as f64).cos()).collect(),
            sin: (0..spb).map(|n| (w * n as f64).sin()).collect(),
        }
    }

    /// Correlation energy of a window against this reference.
    fn energy(&self, window: &[f32]) -> f64 {
        let mut i = 0.0f64;
        let mut q = 0.0f64;

        for (n, &x) in window.iter().enumerate() {
            let x = f64::from(x);
            i += x * self.cos[n];
            q += x * self.sin[n];
        }

        i * i + q * q
    }
}

/// Symbol detector over one conditioned capture buffer.
pub struct Detector<'a> {
    samples: &'a [f32],
    spb: usize,
    rep: usize,
    ref0: Reference,
    ref1: Reference,
}

impl<'a> Detector<'a> {
    pub fn new(samples: &'a [f32], sample_rate: u32, params: &ModemParams) -> Result<Detector<'a>> {
        params.validate()?;
        let spb = params.samples_per_bit(sample_rate)?;

        Ok(Detector {
            samples,
            spb,
            rep: params.repetition,
            ref0: Reference::new(params.freq0, sample_rate, spb),
            ref1: Reference::new(params.freq1, sample_rate, spb),
        })
    }

    /// Total number of samples in the capture.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples per symbol.
    pub fn samples_per_symbol(&self) -> usize {
        self.spb
    }

    /// Samples consumed by one repetition-coded byte.
    pub fn coded_byte_len(&self) -> usize {
        8 * self.rep * self.spb
    }

    /// Detect the symbol starting at `pos`. A window truncated by the end of
    /// the capture integrates over the samples that remain.
    pub fn symbol(&self, pos: usize, invert: bool) -> bool {
        let start = pos.min(self.samples.len());
        let end = (pos + self.spb).min(self.samples.len());
        let window = &self.samples[start..end];

        let e0 = self.ref0.energy(window);
        let e1 = self.ref1.energy(window);

        (e1 > e0) != invert
    }

    /// Decode one repetition-coded data bit starting at `pos`.
    pub fn coded_bit(&self, pos: usize, invert: bool) -> bool {
        let ones = (0..self.rep).filter(|&r| self.symbol(pos + r * self.spb, invert)).count();
        ones > self.rep / 2
    }

    /// Decode one byte, MSB first, advancing `pos` by the coded byte length.
    pub fn read_byte(&self, pos: &mut usize, invert: bool) -> u8 {
        let mut value = 0u8;

        for _ in 0..8 {
            let bit = self.coded_bit(*pos, invert);
            value = (value << 1) | u8::from(bit);
            *pos += self.rep * self.spb;
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::Detector;
    use crate::common::ModemParams;
    use crate::modulator::Modulator;

    fn tone(freq: f64, sample_rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(sample_rate);
                (2.0 * std::f64::consts::PI * freq * t).sin() as f32
            })
            .collect()
    }

    #[test]
    fn verify_single_tones_detected() {
        let params = ModemParams::default();
        let spb = params.samples_per_bit(44100).unwrap();

        let low = tone(params.freq0, 44100, spb);
        let det = Detector::new(&low, 44100, &params).unwrap();
        assert!(!det.symbol(0, false));

        let high = tone(params.freq1, 44100, spb);
        let det = Detector::new(&high, 44100, &params).unwrap();
        assert!(det.symbol(0, false));
    }

    #[test]
    fn verify_invert_flips_decision() {
        let params = ModemParams::default();
        let spb = params.samples_per_bit(44100).unwrap();

        let high = tone(params.freq1, 44100, spb);
        let det = Detector::new(&high, 44100, &params).unwrap();

        assert!(det.symbol(0, false));
        assert!(!det.symbol(0, true));
    }

    #[test]
    fn verify_detection_is_phase_insensitive() {
        let params = ModemParams::default();
        let spb = params.samples_per_bit(44100).unwrap();

        // A quarter-period phase offset must not change the decision.
        let shifted: Vec<f32> = (0..spb)
            .map(|i| {
                let t = i as f64 / 44100.0;
                (2.0 * std::f64::consts::PI * params.freq1 * t + 1.57).sin() as f32
            })
            .collect();

        let det = Detector::new(&shifted, 44100, &params).unwrap();
        assert!(det.symbol(0, false));
    }

    #[test]
    fn verify_modulated_bytes_read_back() {
        let params = ModemParams::default();
        let pre_bits = params.preamble_bits();
        let spb = params.samples_per_bit(44100).unwrap();

        let frame = [0x53u8, 0x54, 0x45, 0x47];
        let modulator = Modulator::new(44100, params.clone()).unwrap();
        let samples = modulator.modulate(&frame).unwrap();

        let det = Detector::new(&samples, 44100, &params).unwrap();

        let mut pos = pre_bits * spb;
        for &expected in &frame {
            assert_eq!(det.read_byte(&mut pos, false), expected);
        }
        assert_eq!(pos, samples.len());
    }

    #[test]
    fn verify_majority_vote_overrides_one_bad_symbol() {
        let params = ModemParams::default();
        let spb = params.samples_per_bit(44100).unwrap();

        // Two high symbols and one low symbol: majority says 1.
        let mut samples = tone(params.freq1, 44100, 2 * spb);
        samples.extend(tone(params.freq0, 44100, spb));

        let det = Detector::new(&samples, 44100, &params).unwrap();
        assert!(det.coded_bit(0, false));
    }
}
