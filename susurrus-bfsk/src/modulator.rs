// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `modulator` module renders a byte frame into a BFSK waveform.

use std::f64::consts::PI;

use log::debug;

use susurrus_core::errors::Result;

use crate::common::ModemParams;

/// Hann window over an `n`-sample symbol, evaluated at sample `s`.
///
/// Windowing each symbol reduces spectral splatter at symbol boundaries,
/// which keeps the signal inside the voice band after lossy transport.
fn hann(s: usize, n: usize) -> f32 {
    if n <= 1 {
        return 1.0;
    }
    0.5 - 0.5 * (2.0 * PI as f32 * s as f32 / (n - 1) as f32).cos()
}

/// BFSK waveform synthesizer.
///
/// Emits the alternating preamble followed by the frame bytes, MSB first,
/// each data bit repeated `repetition` times as separate symbols. The sine
/// phase is indexed by the global output sample counter, so phase is
/// continuous across symbol boundaries.
pub struct Modulator {
    params: ModemParams,
    sample_rate: u32,
}

impl Modulator {
    pub fn new(sample_rate: u32, params: ModemParams) -> Result<Modulator> {
        params.validate()?;
        // Reject unusable symbol lengths before any synthesis happens.
        params.samples_per_bit(sample_rate)?;

        Ok(Modulator { params, sample_rate })
    }

    /// Render a frame as pure BFSK.
    pub fn modulate(&self, frame: &[u8]) -> Result<Vec<f32>> {
        self.render(frame, None)
    }

    /// Render a frame superimposed on a cover waveform.
    ///
    /// The cover is tiled by modulo indexing when it is shorter than the
    /// signal, and the mixed sample is clipped to [-1, +1]. An empty cover
    /// falls back to pure BFSK.
    pub fn modulate_over(&self, frame: &[u8], cover: &[f32]) -> Result<Vec<f32>> {
        if cover.is_empty() {
            return self.render(frame, None);
        }
        self.render(frame, Some(cover))
    }

    fn render(&self, frame: &[u8], cover: Option<&[f32]>) -> Result<Vec<f32>> {
        let spb = self.params.samples_per_bit(self.sample_rate)?;
        let pre_bits = self.params.preamble_bits();
        let rep = self.params.repetition;

        let n_symbols = pre_bits + 8 * rep * frame.len();
        let mut out = Vec::with_capacity(n_symbols * spb);

        // Preamble: 0101..., one symbol per bit, no repetition coding.
        for b in 0..pre_bits {
            self.push_symbol(&mut out, b % 2 == 1, spb, cover);
        }

        // Frame bytes, MSB first, each bit repeated as `rep` symbols.
        for &byte in frame {
            for bitpos in (0..8).rev() {
                let bit = (byte >> bitpos) & 1 == 1;
                for _ in 0..rep {
                    self.push_symbol(&mut out, bit, spb, cover);
                }
            }
        }

        debug!(
            "modulated {} frame bytes as {} symbols ({} samples at {} Hz)",
            frame.len(),
            n_symbols,
            out.len(),
            self.sample_rate
        );

        Ok(out)
    }

    fn push_symbol(&self, out: &mut Vec<f32>, bit: bool, spb: usize, cover: Option<&[f32]>) {
        let freq = if bit { self.params.freq1 } else { self.params.freq0 };

        for s in 0..spb {
            // Phase runs off the global sample index, not the symbol start.
            let si = out.len();
            let t = si as f64 / f64::from(self.sample_rate);
            let tone = (2.0 * PI * freq * t).sin() as f32;
            let sig = self.params.amplitude * hann(s, spb) * tone;

            let y = match cover {
                Some(cover) => {
                    let base = cover[si % cover.len()];
                    self.params.cover_gain * base + self.params.stego_strength * sig
                }
                None => sig,
            };

            out.push(y.clamp(-1.0, 1.0));
        }
    }
}
