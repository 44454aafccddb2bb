// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `biquad` module implements a second-order IIR filter section.
//!
//! Coefficients follow the Robert Bristow-Johnson cookbook formulas,
//! normalized by `a0`. The recurrence is the Transposed Direct Form II:
//!
//! ```text
//! y[n]  = b0*x[n] + z1[n-1]
//! z1[n] = b1*x[n] - a1*y[n] + z2[n-1]
//! z2[n] = b2*x[n] - a2*y[n]
//! ```

use std::f64::consts::PI;

/// A single biquad section with its two-sample delay line.
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    /// Instantiate a low-pass section with cutoff `f0` in Hertz.
    pub fn lowpass(sample_rate: u32, f0: f64, q: f64) -> Biquad {
        let w0 = 2.0 * PI * f0 / f64::from(sample_rate);
        let alpha = w0.sin() / (2.0 * q);
        let c = w0.cos();

        let b0 = (1.0 - c) / 2.0;
        let b1 = 1.0 - c;
        let b2 = (1.0 - c) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * c;
        let a2 = 1.0 - alpha;

        Biquad::from_unnormalized(b0, b1, b2, a0, a1, a2)
    }

    /// Instantiate a high-pass section with cutoff `f0` in Hertz.
    pub fn highpass(sample_rate: u32, f0: f64, q: f64) -> Biquad {
        let w0 = 2.0 * PI * f0 / f64::from(sample_rate);
        let alpha = w0.sin() / (2.0 * q);
        let c = w0.cos();

        let b0 = (1.0 + c) / 2.0;
        let b1 = -(1.0 + c);
        let b2 = (1.0 + c) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * c;
        let a2 = 1.0 - alpha;

        Biquad::from_unnormalized(b0, b1, b2, a0, a1, a2)
    }

    fn from_unnormalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Biquad {
        Biquad {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Filter a buffer in place.
    pub fn process(&mut self, buf: &mut [f32]) {
        let mut z1 = self.z1;
        let mut z2 = self.z2;

        for sample in buf.iter_mut() {
            let x = f64::from(*sample);
            let y = self.b0 * x + z1;

            z1 = self.b1 * x - self.a1 * y + z2;
            z2 = self.b2 * x - self.a2 * y;

            *sample = y as f32;
        }

        self.z1 = z1;
        self.z2 = z2;
    }
}
