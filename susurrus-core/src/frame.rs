// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `frame` module builds and parses the on-wire byte frame.
//!
//! A frame is laid out as `MAGIC | LEN | CIPHERTEXT | CRC32`, where `LEN` is
//! the big-endian length of the ciphertext and the CRC-32 covers everything
//! before it.

use crate::checksum::Crc32;
use crate::errors::{bad_length_error, crc_mismatch_error, decode_error, Result};

/// The frame delimiter. Doubles as the fine-sync landmark for the receiver.
pub const MAGIC: [u8; 4] = *b"STEG";

/// Length in bytes of the frame header (magic + payload length).
pub const HEADER_LEN: usize = 8;

/// Length in bytes of the trailing checksum.
pub const CRC_LEN: usize = 4;

/// The largest payload length accepted on either end of the link.
pub const LEN_MAX: u32 = 2_000_000;

/// Reject a payload length that is zero or above the limit.
pub fn validate_len(len: u32, len_max: u32) -> Result<()> {
    if len == 0 || len > len_max {
        return bad_length_error(len);
    }
    Ok(())
}

/// Verify the received CRC against one computed over the leading frame bytes.
pub fn verify_crc(frame_without_crc: &[u8], received: u32) -> Result<()> {
    let mut crc = Crc32::new();
    crc.process_buf_bytes(frame_without_crc);

    let computed = crc.crc();
    if computed != received {
        return crc_mismatch_error(computed, received);
    }
    Ok(())
}

/// Build a complete frame around a ciphertext.
pub fn build(ciphertext: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(ciphertext.len()).unwrap_or(u32::MAX);
    validate_len(len, LEN_MAX)?;

    let mut frame = Vec::with_capacity(HEADER_LEN + ciphertext.len() + CRC_LEN);
    frame.extend_from_slice(&MAGIC);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(ciphertext);

    let mut crc = Crc32::new();
    crc.process_buf_bytes(&frame);
    frame.extend_from_slice(&crc.crc().to_be_bytes());

    Ok(frame)
}

/// Parse a complete frame, returning the ciphertext on success.
pub fn parse(frame: &[u8]) -> Result<&[u8]> {
    if frame.len() < HEADER_LEN + CRC_LEN {
        return decode_error("frame truncated");
    }
    if frame[0..4] != MAGIC {
        return decode_error("bad frame magic");
    }

    let len = u32::from_be_bytes([frame[4], frame[5], frame[6], frame[7]]);
    validate_len(len, LEN_MAX)?;

    let body_end = HEADER_LEN + len as usize;
    if frame.len() < body_end + CRC_LEN {
        return decode_error("frame truncated");
    }

    let received = u32::from_be_bytes([
        frame[body_end],
        frame[body_end + 1],
        frame[body_end + 2],
        frame[body_end + 3],
    ]);

    verify_crc(&frame[..body_end], received)?;

    Ok(&frame[HEADER_LEN..body_end])
}
