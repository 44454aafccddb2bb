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
use log::{error, info};

use susurrus_bfsk::{ModemParams, Receiver};
use susurrus_cli::wav;
use susurrus_core::crypt::Cipher;
use susurrus_core::errors::Result;

fn main() {
    pretty_env_logger::init();

    let matches = Command::new("susurrus-recv")
        .about("Recover an encrypted message from a captured BFSK waveform")
        .arg(
            Arg::new("INPUT")
                .help("The captured WAV file")
                .required(true)
                .index(1),
        )
        .get_matches();

    let input_path = matches.value_of("INPUT").unwrap();

    if let Err(err) = run(input_path) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(input_path: &str) -> Result<()> {
    let (samples, sample_rate) = wav::read_mono(input_path)?;

    info!("loaded {}: {} mono samples at {} Hz", input_path, samples.len(), sample_rate);

    let receiver = Receiver::new(ModemParams::default(), Cipher::default());
    let decoded = receiver.decode(samples, sample_rate)?;

    info!(
        "sync: offset={} samples (invert={} score={})",
        decoded.coarse.offset, decoded.coarse.invert, decoded.coarse.score
    );
    info!("refined position={} samples (invert={})", decoded.sync.position, decoded.sync.invert);

    println!("{}", String::from_utf8_lossy(&decoded.plaintext));

    Ok(())
}
