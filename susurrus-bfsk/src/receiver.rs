// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `receiver` module drives a complete decode pass.

use log::{debug, info, warn};

use susurrus_core::crypt::Cipher;
use susurrus_core::errors::{end_of_stream_error, magic_not_found_error, Result};
use susurrus_core::frame;

use crate::common::ModemParams;
use crate::detector::Detector;
use crate::filter::condition;
use crate::sync::{coarse_search, refine, CoarseSync, FrameSync};

/// A successfully decoded message with its synchronization diagnostics.
pub struct Decoded {
    /// The decrypted payload.
    pub plaintext: Vec<u8>,
    /// Where the coarse search locked, and how confidently.
    pub coarse: CoarseSync,
    /// The refined frame timing used for the decode.
    pub sync: FrameSync,
}

/// Receiver driver.
///
/// One `decode` call owns its buffers end to end: conditioning state,
/// detector tables, and the assembled frame all live and die inside the
/// call. There are no retries; every terminal failure surfaces as an error.
pub struct Receiver {
    params: ModemParams,
    cipher: Cipher,
}

impl Receiver {
    pub fn new(params: ModemParams, cipher: Cipher) -> Receiver {
        Receiver { params, cipher }
    }

    /// Decode one captured waveform into its plaintext payload.
    pub fn decode(&self, mut samples: Vec<f32>, sample_rate: u32) -> Result<Decoded> {
        self.params.validate()?;
        self.params.samples_per_bit(sample_rate)?;

        condition(&mut samples, sample_rate, &self.params);

        let det = Detector::new(&samples, sample_rate, &self.params)?;

        let coarse = coarse_search(&det, sample_rate, &self.params)?;
        let sync = refine(&det, &coarse, &self.params)?;

        info!(
            "synchronized: coarse offset={} score={}/{}, frame position={} invert={}",
            coarse.offset,
            coarse.score,
            self.params.preamble_bits(),
            sync.position,
            sync.invert
        );

        let mut cursor = sync.position;

        // Header: magic and payload length.
        let mut frame_bytes = Vec::with_capacity(frame::HEADER_LEN);
        for _ in 0..frame::HEADER_LEN {
            frame_bytes.push(self.read_byte(&det, &mut cursor, sync.invert)?);
        }

        // Refinement just matched the magic here; a mismatch means the
        // capture changed under us.
        if frame_bytes[0..4] != frame::MAGIC {
            return magic_not_found_error(coarse.score as u32, self.params.preamble_bits() as u32);
        }

        let len = u32::from_be_bytes([frame_bytes[4], frame_bytes[5], frame_bytes[6], frame_bytes[7]]);
        frame::validate_len(len, self.params.len_max)?;

        debug!("payload length: {} bytes", len);

        // Body.
        frame_bytes.reserve(len as usize);
        for _ in 0..len {
            frame_bytes.push(self.read_byte(&det, &mut cursor, sync.invert)?);
        }

        // Trailing CRC.
        let mut crc_bytes = [0u8; frame::CRC_LEN];
        for byte in crc_bytes.iter_mut() {
            *byte = self.read_byte(&det, &mut cursor, sync.invert)?;
        }
        let received = u32::from_be_bytes(crc_bytes);

        if let Err(err) = frame::verify_crc(&frame_bytes, received) {
            warn!("frame failed crc verification: {}", err);
            return Err(err);
        }

        let plaintext = self.cipher.decrypt(&frame_bytes[frame::HEADER_LEN..])?;

        Ok(Decoded { plaintext, coarse, sync })
    }

    fn read_byte(&self, det: &Detector<'_>, cursor: &mut usize, invert: bool) -> Result<u8> {
        if *cursor + det.coded_byte_len() > det.len() {
            return end_of_stream_error();
        }
        Ok(det.read_byte(cursor, invert))
    }
}

#[cfg(test)]
mod tests {
    use super::Receiver;
    use crate::common::{ModemParams, DEFAULT_SAMPLE_RATE};
    use crate::modulator::Modulator;

    use susurrus_core::crypt::Cipher;
    use susurrus_core::errors::Error;
    use susurrus_core::frame;

    fn encode(message: &[u8]) -> Vec<f32> {
        let ciphertext = Cipher::default().encrypt(message).unwrap();
        let frame = frame::build(&ciphertext).unwrap();

        Modulator::new(DEFAULT_SAMPLE_RATE, ModemParams::default())
            .unwrap()
            .modulate(&frame)
            .unwrap()
    }

    fn receiver() -> Receiver {
        Receiver::new(ModemParams::default(), Cipher::default())
    }

    #[test]
    fn verify_round_trip_single_byte() {
        let samples = encode(b"A");
        let decoded = receiver().decode(samples, DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(decoded.plaintext, b"A");
    }

    #[test]
    fn verify_round_trip_hello() {
        let samples = encode(b"hello");

        // Preamble plus 8 * (4 + 4 + 5 + 4) * 3 coded symbols.
        let duration = samples.len() as f64 / f64::from(DEFAULT_SAMPLE_RATE);
        assert!(duration >= 2.265, "duration {}", duration);

        let decoded = receiver().decode(samples, DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(decoded.plaintext, b"hello");
    }

    #[test]
    fn verify_polarity_inversion_tolerated() {
        let mut samples = encode(b"hello");
        for s in samples.iter_mut() {
            *s = -*s;
        }

        let decoded = receiver().decode(samples, DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(decoded.plaintext, b"hello");
    }

    #[test]
    fn verify_leading_silence_tolerated() {
        // Half a second of dead air before the transmission.
        let mut samples = vec![0.0f32; 22050];
        samples.extend(encode(b"hello"));

        let decoded = receiver().decode(samples, DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(decoded.plaintext, b"hello");
    }

    #[test]
    fn verify_corrupted_slice_never_silently_wrong() {
        let params = ModemParams::default();
        let spb = params.samples_per_bit(DEFAULT_SAMPLE_RATE).unwrap();
        let pre_bits = params.preamble_bits();

        let mut samples = encode(b"hello");

        // Negate ten samples in the middle of one ciphertext symbol. The
        // repetition vote may absorb the hit or the CRC must catch it;
        // silent corruption is the one outcome that must not happen.
        let target = (pre_bits + 8 * 3 * 10) * spb + spb / 2;
        for s in &mut samples[target..target + 10] {
            *s = -*s;
        }

        match receiver().decode(samples, DEFAULT_SAMPLE_RATE) {
            Ok(decoded) => assert_eq!(decoded.plaintext, b"hello"),
            Err(Error::CrcMismatch { .. }) => (),
            Err(err) => panic!("unexpected failure: {}", err),
        }
    }

    #[test]
    fn verify_round_trip_large_payload() {
        let message: Vec<u8> = (0..1025u32).map(|i| (i % 251) as u8).collect();

        let samples = encode(&message);
        let decoded = receiver().decode(samples, DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(decoded.plaintext, message);
    }

    #[test]
    fn verify_silence_fails_cleanly() {
        // Silence gives the coarse search nothing better than a weak lock on
        // truncated windows, and refinement then finds no magic.
        let samples = vec![0.0f32; 22050];
        assert!(matches!(
            receiver().decode(samples, DEFAULT_SAMPLE_RATE),
            Err(Error::MagicNotFound { .. })
        ));
    }

    #[test]
    fn verify_empty_capture_fails_with_sync_not_found() {
        assert!(matches!(
            receiver().decode(Vec::new(), DEFAULT_SAMPLE_RATE),
            Err(Error::SyncNotFound)
        ));
    }

    #[test]
    fn verify_zero_length_frame_rejected() {
        // Hand-build a frame claiming a zero-length payload. The receiver
        // must reject it after the header, before reading a body.
        let mut bad_frame = Vec::new();
        bad_frame.extend_from_slice(&frame::MAGIC);
        bad_frame.extend_from_slice(&0u32.to_be_bytes());
        bad_frame.extend_from_slice(&susurrus_core::checksum::crc32(&bad_frame).to_be_bytes());

        let samples = Modulator::new(DEFAULT_SAMPLE_RATE, ModemParams::default())
            .unwrap()
            .modulate(&bad_frame)
            .unwrap();

        assert!(matches!(
            receiver().decode(samples, DEFAULT_SAMPLE_RATE),
            Err(Error::BadLength(0))
        ));
    }

    #[test]
    fn verify_corrupted_crc_field_rejected() {
        let ciphertext = Cipher::default().encrypt(b"hello").unwrap();
        let mut frame_bytes = frame::build(&ciphertext).unwrap();

        // Flip one bit inside the stored CRC itself.
        let last = frame_bytes.len() - 1;
        frame_bytes[last] ^= 0x01;

        let samples = Modulator::new(DEFAULT_SAMPLE_RATE, ModemParams::default())
            .unwrap()
            .modulate(&frame_bytes)
            .unwrap();

        assert!(matches!(
            receiver().decode(samples, DEFAULT_SAMPLE_RATE),
            Err(Error::CrcMismatch { .. })
        ));
    }

    #[test]
    fn verify_truncated_capture_fails_cleanly() {
        let samples = encode(b"hello");

        // Drop the tail of the transmission: everything past the header.
        let params = ModemParams::default();
        let spb = params.samples_per_bit(DEFAULT_SAMPLE_RATE).unwrap();
        let keep = (params.preamble_bits() + 8 * 3 * 9) * spb;
        let truncated = samples[..keep].to_vec();

        assert!(matches!(
            receiver().decode(truncated, DEFAULT_SAMPLE_RATE),
            Err(Error::EndOfStream)
        ));
    }

    #[test]
    fn verify_config_rejected_before_decode() {
        let params = ModemParams { bit_duration: 0.0005, ..Default::default() };
        let receiver = Receiver::new(params, Cipher::default());

        assert!(matches!(
            receiver.decode(vec![0.0f32; 44100], DEFAULT_SAMPLE_RATE),
            Err(Error::ConfigError(_))
        ));
    }
}
