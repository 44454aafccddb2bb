// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `crypt` module is a thin adapter over AES-256 in counter mode.
//!
//! CTR mode is length-preserving and symmetric: encryption and decryption are
//! the same keystream application. The counter is the big-endian 128-bit
//! flavor, so a 16-byte IV is consumed whole as the initial counter block.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;

use crate::errors::{crypto_error, Result};

type Aes256Ctr = Ctr128BE<Aes256>;

/// Length in bytes of the AES-256 key.
pub const KEY_LEN: usize = 32;

/// Length in bytes of the counter-mode IV.
pub const IV_LEN: usize = 16;

/// The fixed demonstration key. A deployment would negotiate its own secret.
pub const DEFAULT_KEY: [u8; KEY_LEN] = *b"01234567890123456789012345678901";

/// The fixed demonstration IV. CTR reuse under one key leaks plaintext XORs,
/// so a deployment would transmit a fresh nonce per message instead.
pub const DEFAULT_IV: [u8; IV_LEN] = *b"0123456789012345";

/// An AES-256-CTR cipher bound to one key and IV pair.
pub struct Cipher {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl Cipher {
    pub fn new(key: [u8; KEY_LEN], iv: [u8; IV_LEN]) -> Cipher {
        Cipher { key, iv }
    }

    /// Encrypt a plaintext. The ciphertext has the same length.
    pub fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>> {
        self.apply_keystream(plain)
    }

    /// Decrypt a ciphertext. The plaintext has the same length.
    pub fn decrypt(&self, cipher: &[u8]) -> Result<Vec<u8>> {
        self.apply_keystream(cipher)
    }

    fn apply_keystream(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut cipher = match Aes256Ctr::new_from_slices(&self.key, &self.iv) {
            Ok(cipher) => cipher,
            Err(_) => return crypto_error("invalid key or iv length"),
        };

        let mut buf = data.to_vec();

        if cipher.try_apply_keystream(&mut buf).is_err() {
            return crypto_error("keystream exhausted");
        }

        Ok(buf)
    }
}

impl Default for Cipher {
    fn default() -> Self {
        Cipher::new(DEFAULT_KEY, DEFAULT_IV)
    }
}
