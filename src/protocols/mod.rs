//! Classical cryptography protocols.
//!
//! This module contains the key distillation protocols and the stream cipher
//! that consumes the keys they produce.

pub mod cipher;
pub mod qkd;
pub use qkd::bb84;
