//! Runs one BB84 exchange and protects a short payload with the resulting key.
//!
//! `RUST_LOG=debug cargo run --example bb84_xor` shows every protocol stage.
//! Set `EVE_RATIO` (0.0 to 1.0) to put an intercept-resend eavesdropper on the
//! channel.

use bb84_cipher::{
    InterceptResendChannel, NoiselessChannel, Sampler, XorCipher,
    bb84::{self, BB84Config},
    utils::format_bits,
};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const PAYLOAD: &[u8] = b"1001100";

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let eve_ratio = std::env::var("EVE_RATIO")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);

    let config = BB84Config::default();
    let mut sampler = Sampler::new();
    let noiseless = NoiselessChannel::new(rand::rng());
    let mut channel = match InterceptResendChannel::new(noiseless, eve_ratio, rand::rng()) {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!(error = %e, "Invalid EVE_RATIO");
            return ExitCode::FAILURE;
        }
    };

    let result = match bb84::run(&config, &mut sampler, &mut channel) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(
                error = %e,
                intercepted = channel.intercepted_count(),
                "Key distillation aborted"
            );
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        sifted = result.sifted_length,
        remaining = result.remaining_length,
        qber = result.qber,
        key = %format_bits(result.initiator_key.bits()),
        "Shared key established"
    );

    let outcome = XorCipher::from_secret(&result.initiator_key)
        .and_then(|c| c.encrypt_to_hex(PAYLOAD))
        .and_then(|hex| {
            tracing::info!(ciphertext = %hex, "Encrypted payload");
            XorCipher::from_secret(&result.responder_key)?.decrypt_from_hex(&hex)
        });

    match outcome {
        Ok(plaintext) => {
            tracing::info!(plaintext = %String::from_utf8_lossy(&plaintext), "Decrypted payload");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Cipher failed");
            ExitCode::FAILURE
        }
    }
}
