use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Verification samples differ in {mismatches} of {sample_len} positions")]
    SampleMismatch { mismatches: usize, sample_len: usize },

    #[error("Remaining keys differ in {mismatches} of {key_len} positions")]
    KeyMismatch { mismatches: usize, key_len: usize },

    #[error("Key too short: {required} bits required, {available} available")]
    InsufficientKeyLength { required: usize, available: usize },

    #[error("Cannot sample {requested} bits from a key of {available} bits")]
    SampleTooLarge { requested: usize, available: usize },

    #[error("Sequence length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),

    #[error(
        "Transmission length mismatch: {bits} bits, {bases} bases, {measurement_bases} measurement bases"
    )]
    LengthMismatch {
        bits: usize,
        bases: usize,
        measurement_bases: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CipherError {
    #[error("Key must contain at least one bit")]
    EmptyKey,

    #[error("Key of {key_bits} bits is shorter than message of {message_bits} bits")]
    KeyTooShort { key_bits: usize, message_bits: usize },

    #[error("Invalid hex ciphertext: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BitParseError {
    #[error("Invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
}
