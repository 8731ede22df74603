//! Classical stand-ins for the quantum channel.
//!
//! The key distillation engine only ever sees a [`QuantumChannel`]: bits and
//! bases go in, one measured bit per position comes out. The implementations
//! here model the channel classically. A position measured in the basis it was
//! prepared in reproduces the sent bit; a position measured in the conjugate
//! basis yields a fair coin.

use crate::core::errors::ChannelError;
use rand::Rng;
use rand::rngs::ThreadRng;

/// Encoding/measurement basis of a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basis {
    /// Rectilinear (computational) basis {|0>, |1>}.
    Z,
    /// Diagonal (Hadamard) basis {|+>, |->}.
    X,
}

impl Basis {
    /// Draws a basis uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Basis {
        Basis::from(rng.random_bool(0.5))
    }

    pub fn is_diagonal(self) -> bool {
        self == Basis::X
    }
}

/// `false` -> Z, `true` -> X
impl From<bool> for Basis {
    fn from(value: bool) -> Self {
        if value { Basis::X } else { Basis::Z }
    }
}

/// Transport of prepared bits from sender to receiver.
///
/// `bits[i]` is prepared in `bases[i]` and measured in `measurement_bases[i]`.
/// Implementations must return exactly one bit per position and, absent noise
/// or interception, return `bits[i]` wherever the two bases agree.
pub trait QuantumChannel {
    fn transmit(
        &mut self,
        bits: &[bool],
        bases: &[Basis],
        measurement_bases: &[Basis],
    ) -> Result<Vec<bool>, ChannelError>;
}

impl<C: QuantumChannel + ?Sized> QuantumChannel for &mut C {
    fn transmit(
        &mut self,
        bits: &[bool],
        bases: &[Basis],
        measurement_bases: &[Basis],
    ) -> Result<Vec<bool>, ChannelError> {
        (**self).transmit(bits, bases, measurement_bases)
    }
}

/// Ideal channel: no noise, no eavesdropper.
#[derive(Debug, Clone)]
pub struct NoiselessChannel<R = ThreadRng> {
    rng: R,
    /// Fixed outcome for mismatched bases instead of a coin flip.
    fallback: Option<bool>,
}

impl<R: Rng> NoiselessChannel<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            fallback: None,
        }
    }

    /// Makes mismatched-basis measurements deterministic.
    pub fn with_fallback(mut self, bit: bool) -> Self {
        self.fallback = Some(bit);
        self
    }
}

impl<R: Rng> QuantumChannel for NoiselessChannel<R> {
    fn transmit(
        &mut self,
        bits: &[bool],
        bases: &[Basis],
        measurement_bases: &[Basis],
    ) -> Result<Vec<bool>, ChannelError> {
        validate_lengths(bits, bases, measurement_bases)?;

        let results = bits
            .iter()
            .zip(bases.iter().zip(measurement_bases))
            .map(|(&bit, (&prepared, &measured))| {
                if prepared == measured {
                    bit
                } else {
                    match self.fallback {
                        Some(fixed) => fixed,
                        None => self.rng.random_bool(0.5),
                    }
                }
            })
            .collect();

        Ok(results)
    }
}

/// Bit Flip Channel: each received bit is flipped with probability `p`.
#[derive(Debug, Clone)]
pub struct BitFlipChannel<C, R = ThreadRng> {
    inner: C,
    p: f64,
    rng: R,
}

impl<C: QuantumChannel, R: Rng> BitFlipChannel<C, R> {
    pub fn new(inner: C, p: f64, rng: R) -> Result<Self, ChannelError> {
        validate_prob(p)?;
        Ok(Self { inner, p, rng })
    }

    pub fn probability(&self) -> f64 {
        self.p
    }
}

impl<C: QuantumChannel, R: Rng> QuantumChannel for BitFlipChannel<C, R> {
    fn transmit(
        &mut self,
        bits: &[bool],
        bases: &[Basis],
        measurement_bases: &[Basis],
    ) -> Result<Vec<bool>, ChannelError> {
        let mut results = self.inner.transmit(bits, bases, measurement_bases)?;

        if self.p > 1e-12 {
            for bit in &mut results {
                if self.rng.random_bool(self.p) {
                    *bit = !*bit;
                }
            }
        }

        Ok(results)
    }
}

/// Intercept-resend eavesdropper in front of another channel.
///
/// Each position is intercepted with probability `ratio`. Eve measures it in a
/// random basis and re-prepares her outcome in that basis, which corrupts
/// roughly a quarter of the intercepted positions that survive sifting.
#[derive(Debug, Clone)]
pub struct InterceptResendChannel<C, R = ThreadRng> {
    inner: C,
    ratio: f64,
    rng: R,
    intercepted_count: usize,
}

impl<C: QuantumChannel, R: Rng> InterceptResendChannel<C, R> {
    pub fn new(inner: C, ratio: f64, rng: R) -> Result<Self, ChannelError> {
        validate_prob(ratio)?;
        Ok(Self {
            inner,
            ratio,
            rng,
            intercepted_count: 0,
        })
    }

    /// Number of positions Eve has measured so far.
    pub fn intercepted_count(&self) -> usize {
        self.intercepted_count
    }
}

impl<C: QuantumChannel, R: Rng> QuantumChannel for InterceptResendChannel<C, R> {
    fn transmit(
        &mut self,
        bits: &[bool],
        bases: &[Basis],
        measurement_bases: &[Basis],
    ) -> Result<Vec<bool>, ChannelError> {
        validate_lengths(bits, bases, measurement_bases)?;

        let mut forwarded_bits = bits.to_vec();
        let mut forwarded_bases = bases.to_vec();

        for i in 0..bits.len() {
            if self.ratio > 1e-12 && self.rng.random_bool(self.ratio) {
                self.intercepted_count += 1;

                let e_basis = Basis::random(&mut self.rng);
                if e_basis != bases[i] {
                    forwarded_bits[i] = self.rng.random_bool(0.5);
                }
                forwarded_bases[i] = e_basis;
            }
        }

        self.inner
            .transmit(&forwarded_bits, &forwarded_bases, measurement_bases)
    }
}

/// Validate probability parameter
fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}

fn validate_lengths(
    bits: &[bool],
    bases: &[Basis],
    measurement_bases: &[Basis],
) -> Result<(), ChannelError> {
    if bits.len() != bases.len() || bits.len() != measurement_bases.len() {
        return Err(ChannelError::LengthMismatch {
            bits: bits.len(),
            bases: bases.len(),
            measurement_bases: measurement_bases.len(),
        });
    }
    Ok(())
}
