mod channels;
pub mod errors;
mod key;
pub mod utils;

pub use channels::{
    Basis, BitFlipChannel, InterceptResendChannel, NoiselessChannel, QuantumChannel,
};
pub use key::SecretKey;
