// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lazy_static::lazy_static;

/// The reversed (reflected) form of the IEEE 802.3 generator polynomial.
const POLYNOMIAL: u32 = 0xedb8_8320;

lazy_static! {
    static ref CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];

        for (i, entry) in table.iter_mut().enumerate() {
            let mut crc = i as u32;

            for _ in 0..8 {
                crc = if crc & 1 != 0 { POLYNOMIAL ^ (crc >> 1) } else { crc >> 1 };
            }

            *entry = crc;
        }

        table
    };
}

/// Standard CRC-32 (IEEE 802.3): reflected input and output, initial value
/// `0xffff_ffff`, final XOR `0xffff_ffff`.
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Crc32 {
        Crc32 { state: 0xffff_ffff }
    }

    #[inline(always)]
    pub fn process_byte(&mut self, byte: u8) {
        self.state = CRC32_TABLE[usize::from((self.state as u8) ^ byte)] ^ (self.state >> 8);
    }

    pub fn process_buf_bytes(&mut self, buf: &[u8]) {
        for &byte in buf {
            self.process_byte(byte);
        }
    }

    /// Get the checksum over all bytes processed so far.
    pub fn crc(&self) -> u32 {
        self.state ^ 0xffff_ffff
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Crc32::new()
    }
}

/// Compute the CRC-32 of a complete buffer in one shot.
pub fn crc32(buf: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.process_buf_bytes(buf);
    crc.crc()
}
