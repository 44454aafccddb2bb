// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `filter` module conditions a captured waveform before detection.

use susurrus_core::dsp::biquad::Biquad;

use crate::common::ModemParams;

/// Below this RMS the capture is treated as silence and left unscaled.
const RMS_SILENCE: f32 = 1e-6;

fn rms(buf: &[f32]) -> f32 {
    if buf.is_empty() {
        return 0.0;
    }

    let sum: f64 = buf.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (sum / buf.len() as f64).sqrt() as f32
}

fn remove_dc(buf: &mut [f32]) {
    if buf.is_empty() {
        return;
    }

    let mean: f64 = buf.iter().map(|&x| f64::from(x)).sum::<f64>() / buf.len() as f64;
    for x in buf.iter_mut() {
        *x = (f64::from(*x) - mean) as f32;
    }
}

fn normalize_rms(buf: &mut [f32], target: f32) {
    let r = rms(buf);
    if r < RMS_SILENCE {
        return;
    }

    let gain = target / r;
    for x in buf.iter_mut() {
        *x *= gain;
    }
}

/// Condition a capture in place: remove DC, normalize RMS, then band-limit
/// to the modem's tone range with a high-pass/low-pass biquad cascade.
///
/// Filter state lives and dies inside this call; repeated decodes of the
/// same buffer see identical output.
pub fn condition(buf: &mut [f32], sample_rate: u32, params: &ModemParams) {
    remove_dc(buf);
    normalize_rms(buf, params.rms_target);

    Biquad::highpass(sample_rate, params.highpass_hz, params.filter_q).process(buf);
    Biquad::lowpass(sample_rate, params.lowpass_hz, params.filter_q).process(buf);
}
