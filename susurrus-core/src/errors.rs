// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by Susurrus.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading or writing an audio stream.
    IoError(std::io::Error),
    /// The modem parameters are unusable for the given sample rate.
    ConfigError(&'static str),
    /// The stream contained malformed data and could not be decoded.
    DecodeError(&'static str),
    /// The coarse search window admitted no candidate offset.
    SyncNotFound,
    /// Refinement found no frame magic within one symbol of the preamble end.
    MagicNotFound { best_score: u32, preamble_bits: u32 },
    /// The decoded payload length field is zero or exceeds the limit.
    BadLength(u32),
    /// The CRC computed over the decoded frame differs from the received CRC.
    CrcMismatch { computed: u32, received: u32 },
    /// The cipher reported a failure while encrypting or decrypting.
    CryptoError(&'static str),
    /// The waveform ended before the frame was fully decoded.
    EndOfStream,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => {
                write!(f, "io error: {}", err)
            }
            Error::ConfigError(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            Error::DecodeError(msg) => {
                write!(f, "malformed frame: {}", msg)
            }
            Error::SyncNotFound => {
                write!(f, "preamble sync not found")
            }
            Error::MagicNotFound { best_score, preamble_bits } => {
                write!(
                    f,
                    "frame magic not found near sync (best preamble score {}/{})",
                    best_score, preamble_bits
                )
            }
            Error::BadLength(len) => {
                write!(f, "invalid payload length: {}", len)
            }
            Error::CrcMismatch { computed, received } => {
                write!(f, "crc mismatch (computed {:08x}, received {:08x})", computed, received)
            }
            Error::CryptoError(msg) => {
                write!(f, "cipher failure: {}", msg)
            }
            Error::EndOfStream => {
                write!(f, "unexpected end of stream")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a configuration error.
pub fn config_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::ConfigError(msg))
}

/// Convenience function to create a decode error.
pub fn decode_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::DecodeError(msg))
}

/// Convenience function to create a sync-not-found error.
pub fn sync_not_found_error<T>() -> Result<T> {
    Err(Error::SyncNotFound)
}

/// Convenience function to create a magic-not-found error.
pub fn magic_not_found_error<T>(best_score: u32, preamble_bits: u32) -> Result<T> {
    Err(Error::MagicNotFound { best_score, preamble_bits })
}

/// Convenience function to create a bad payload length error.
pub fn bad_length_error<T>(len: u32) -> Result<T> {
    Err(Error::BadLength(len))
}

/// Convenience function to create a CRC mismatch error.
pub fn crc_mismatch_error<T>(computed: u32, received: u32) -> Result<T> {
    Err(Error::CrcMismatch { computed, received })
}

/// Convenience function to create a crypto error.
pub fn crypto_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::CryptoError(msg))
}

/// Convenience function to create an end-of-stream error.
pub fn end_of_stream_error<T>() -> Result<T> {
    Err(Error::EndOfStream)
}
