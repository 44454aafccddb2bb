// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `sync` module locates the frame inside a captured waveform.
//!
//! Synchronization runs in two stages. The coarse search scans candidate
//! offsets for the alternating preamble, scoring both polarities, and locks
//! timing to within half a symbol. Refinement then slides across one symbol
//! around the expected data start and speculatively decodes four bytes until
//! they spell the frame magic, which pins the frame boundary.

use log::debug;

use susurrus_core::errors::{magic_not_found_error, sync_not_found_error, Result};
use susurrus_core::frame::MAGIC;

use crate::common::ModemParams;
use crate::detector::Detector;

/// Result of the coarse preamble search.
#[derive(Clone, Copy, Debug)]
pub struct CoarseSync {
    /// Offset in samples from the start of the capture to the first preamble
    /// symbol.
    pub offset: usize,
    /// Whether detected bits must be flipped globally.
    pub invert: bool,
    /// Number of preamble bits that matched at this offset.
    pub score: usize,
}

/// Sample-accurate frame timing produced by magic-aided refinement.
#[derive(Clone, Copy, Debug)]
pub struct FrameSync {
    /// Sample index of the first symbol of the first frame byte.
    pub position: usize,
    /// Polarity confirmed against the decoded magic.
    pub invert: bool,
}

/// Count how many preamble bits at `offset` match the alternating pattern.
fn score_preamble(det: &Detector<'_>, offset: usize, pre_bits: usize, invert: bool) -> usize {
    let spb = det.samples_per_symbol();
    let mut score = 0;

    for b in 0..pre_bits {
        let pos = offset + b * spb;
        if pos + spb >= det.len() {
            break;
        }

        let expected = b % 2 == 1;
        if det.symbol(pos, invert) == expected {
            score += 1;
        }
    }

    score
}

/// Scan the head of the capture for the preamble.
///
/// Candidate offsets advance by `spb / coarse_step_frac` samples and both
/// polarities are scored at each. The best-scoring candidate wins, first
/// seen winning ties, and the scan stops early once a candidate reaches
/// the early-stop fraction of the preamble bits.
pub fn coarse_search(det: &Detector<'_>, sample_rate: u32, params: &ModemParams) -> Result<CoarseSync> {
    let spb = det.samples_per_symbol();
    let pre_bits = params.preamble_bits();

    let search_max =
        ((params.search_seconds * f64::from(sample_rate)).round() as usize).min(det.len());
    let step = (spb / params.coarse_step_frac).max(1);
    let early_stop = (params.early_stop_ratio * pre_bits as f64).ceil() as usize;

    let mut best: Option<CoarseSync> = None;

    let mut offset = 0;
    while offset < search_max {
        for invert in [false, true] {
            let score = score_preamble(det, offset, pre_bits, invert);
            if best.map_or(true, |b| score > b.score) {
                best = Some(CoarseSync { offset, invert, score });
            }
        }

        if best.map_or(false, |b| b.score >= early_stop) {
            break;
        }

        offset += step;
    }

    match best {
        Some(sync) => {
            debug!(
                "coarse sync: offset={} invert={} score={}/{}",
                sync.offset, sync.invert, sync.score, pre_bits
            );
            Ok(sync)
        }
        None => sync_not_found_error(),
    }
}

/// Refine coarse timing by hunting for the frame magic.
///
/// Probes `delta` in `[-spb, +spb]` around the expected data start, trying
/// the coarse polarity before its opposite, and accepts the first position
/// whose four speculatively decoded bytes equal the magic.
pub fn refine(det: &Detector<'_>, coarse: &CoarseSync, params: &ModemParams) -> Result<FrameSync> {
    let spb = det.samples_per_symbol();
    let pre_bits = params.preamble_bits();

    let base = (coarse.offset + pre_bits * spb) as isize;
    let step = ((spb / params.refine_steps).max(1)) as isize;
    let polarities = [coarse.invert, !coarse.invert];

    let mut delta = -(spb as isize);
    while delta <= spb as isize {
        for &invert in &polarities {
            let position = base + delta;
            if position < 0 {
                continue;
            }

            let position = position as usize;
            // Skip candidates whose speculative read would run off the end.
            if position + MAGIC.len() * det.coded_byte_len() > det.len() {
                continue;
            }

            let mut cursor = position;
            let mut magic = [0u8; 4];
            for byte in magic.iter_mut() {
                *byte = det.read_byte(&mut cursor, invert);
            }

            if magic == MAGIC {
                debug!("refined sync: position={} invert={} delta={}", position, invert, delta);
                return Ok(FrameSync { position, invert });
            }
        }

        delta += step;
    }

    magic_not_found_error(coarse.score as u32, pre_bits as u32)
}

#[cfg(test)]
mod tests {
    use super::{coarse_search, refine, score_preamble};
    use crate::common::ModemParams;
    use crate::detector::Detector;
    use crate::modulator::Modulator;

    use susurrus_core::errors::Error;
    use susurrus_core::frame;

    fn modulated_frame(params: &ModemParams) -> Vec<f32> {
        let frame = frame::build(b"ciphertext").unwrap();
        Modulator::new(44100, params.clone()).unwrap().modulate(&frame).unwrap()
    }

    #[test]
    fn verify_clean_preamble_scores_full() {
        let params = ModemParams::default();
        let samples = modulated_frame(&params);
        let det = Detector::new(&samples, 44100, &params).unwrap();

        let pre_bits = params.preamble_bits();
        assert_eq!(score_preamble(&det, 0, pre_bits, false), pre_bits);
    }

    #[test]
    fn verify_coarse_search_locks_clean_signal() {
        let params = ModemParams::default();
        let samples = modulated_frame(&params);
        let det = Detector::new(&samples, 44100, &params).unwrap();

        let sync = coarse_search(&det, 44100, &params).unwrap();

        // A noise-free signal starting at zero scores every preamble bit at
        // the true offset, which the early-stop path finds immediately.
        assert_eq!(sync.offset, 0);
        assert!(!sync.invert);
        assert_eq!(sync.score, params.preamble_bits());
    }

    #[test]
    fn verify_refine_locates_magic() {
        let params = ModemParams::default();
        let samples = modulated_frame(&params);
        let det = Detector::new(&samples, 44100, &params).unwrap();

        let coarse = coarse_search(&det, 44100, &params).unwrap();
        let sync = refine(&det, &coarse, &params).unwrap();

        // The data region begins right after the preamble. Refinement
        // accepts the first probe-grid position whose speculative decode
        // spells the magic, so the lock may sit a fraction of a symbol
        // early, but never more than one symbol away.
        let expected = params.preamble_bits() * params.samples_per_bit(44100).unwrap();
        let residue = sync.position.abs_diff(expected);
        assert!(residue <= params.samples_per_bit(44100).unwrap(), "residue {}", residue);
        assert!(!sync.invert);
    }

    #[test]
    fn verify_empty_capture_fails_sync() {
        let params = ModemParams::default();

        // An empty capture admits no candidate offset at all.
        let det = Detector::new(&[], 44100, &params).unwrap();

        assert!(matches!(coarse_search(&det, 44100, &params), Err(Error::SyncNotFound)));
    }

    #[test]
    fn verify_silence_locks_weakly_then_fails_refine() {
        let params = ModemParams::default();

        // Half a second of silence: every offset is scored against truncated
        // preamble windows, so the coarse stage returns a weak lock and the
        // decode can only die at refinement.
        let samples = vec![0.0f32; 22050];
        let det = Detector::new(&samples, 44100, &params).unwrap();

        let coarse = coarse_search(&det, 44100, &params).unwrap();
        assert!(coarse.score < params.preamble_bits() / 2, "score {}", coarse.score);

        assert!(matches!(
            refine(&det, &coarse, &params),
            Err(Error::MagicNotFound { .. })
        ));
    }

    #[test]
    fn verify_data_without_magic_fails_refine() {
        let params = ModemParams::default();

        // Preamble followed by bytes that are not the magic.
        let samples =
            Modulator::new(44100, params.clone()).unwrap().modulate(&[0u8; 16]).unwrap();
        let det = Detector::new(&samples, 44100, &params).unwrap();

        let coarse = coarse_search(&det, 44100, &params).unwrap();
        assert!(matches!(
            refine(&det, &coarse, &params),
            Err(Error::MagicNotFound { .. })
        ));
    }
}
