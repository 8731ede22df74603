mod core;
pub mod protocols;
mod sampler;

pub use crate::core::{
    Basis, BitFlipChannel, InterceptResendChannel, NoiselessChannel, QuantumChannel, SecretKey,
    errors, utils,
};
pub use crate::protocols::bb84;
pub use crate::protocols::cipher::{KeyPolicy, XorCipher};
pub use crate::sampler::{Party, Sampler};
