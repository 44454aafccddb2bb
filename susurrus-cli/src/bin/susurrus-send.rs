// Susurrus
// Copyright (c) 2026 The Project Susurrus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::process;

use clap::{Arg, Command};
use log::{error, info, warn};

use susurrus_bfsk::{ModemParams, Modulator, DEFAULT_SAMPLE_RATE};
use susurrus_cli::wav;
use susurrus_core::crypt::Cipher;
use susurrus_core::errors::Result;
use susurrus_core::frame;

fn main() {
    pretty_env_logger::init();

    let matches = Command::new("susurrus-send")
        .about("Encode an encrypted message into a phone-band BFSK waveform")
        .arg(
            Arg::new("MESSAGE")
                .help("The message to transmit")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("COVER")
                .help("Optional cover WAV to superimpose the signal on")
                .index(2),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .default_value("encoded_signal.wav")
                .help("Output WAV path"),
        )
        .get_matches();

    let message = matches.value_of("MESSAGE").unwrap();
    let cover_path = matches.value_of("COVER");
    let output_path = matches.value_of("output").unwrap();

    if let Err(err) = run(message, cover_path, output_path) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(message: &str, cover_path: Option<&str>, output_path: &str) -> Result<()> {
    let params = ModemParams::default();

    let ciphertext = Cipher::default().encrypt(message.as_bytes())?;
    let frame = frame::build(&ciphertext)?;

    let modulator = Modulator::new(DEFAULT_SAMPLE_RATE, params)?;

    let samples = match cover_path {
        Some(path) => match wav::read_mono(path) {
            Ok((cover, cover_rate)) => {
                if cover_rate != DEFAULT_SAMPLE_RATE {
                    warn!(
                        "cover sample rate is {} Hz, not {} Hz; using its raw samples",
                        cover_rate, DEFAULT_SAMPLE_RATE
                    );
                }
                info!("cover loaded: {} ({} mono samples)", path, cover.len());
                modulator.modulate_over(&frame, &cover)?
            }
            Err(err) => {
                // A broken cover degrades to a pure transmission rather than
                // losing the message.
                warn!("failed to load cover {}: {}; sending pure bfsk", path, err);
                modulator.modulate(&frame)?
            }
        },
        None => modulator.modulate(&frame)?,
    };

    wav::write_mono(output_path, &samples, DEFAULT_SAMPLE_RATE)?;

    println!("wrote {}", output_path);
    println!("duration: {:.1} sec", samples.len() as f64 / f64::from(DEFAULT_SAMPLE_RATE));

    Ok(())
}
