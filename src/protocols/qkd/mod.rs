//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: basis sifting, sample-based eavesdropper detection and key
//!   truncation over an opaque [`QuantumChannel`](crate::QuantumChannel).

pub mod bb84;
