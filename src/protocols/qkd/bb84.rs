//! BB84 key distillation.
//!
//! The initiator prepares random bits in random bases, the responder measures
//! in bases of its own choosing, and both keep only the positions where the
//! bases agreed. A random sample of the sifted key is then sacrificed to check
//! for noise or an eavesdropper before the remainder becomes the secret.
//!
//! The individual stages ([`sift`], [`sample_and_remove`], [`verify`],
//! [`verify_keys`], [`finalize`]) are exposed so callers can drive the
//! protocol step by step; [`run`] chains them over a [`QuantumChannel`].

use crate::core::utils::count_mismatches;
use crate::sampler::{Party, Sampler};
use crate::{Basis, QuantumChannel, SecretKey, errors::ProtocolError};
use rand::Rng;
use zeroize::Zeroizing;

/// Number of qubits sent per run by default.
pub const DEFAULT_NUM_QUBITS: usize = 1000;

/// Number of sifted bits sacrificed for verification by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Length of the final secret in bits by default (one cipher byte).
pub const DEFAULT_KEY_LENGTH: usize = 8;

/// Intermediate key material of a run, overwritten when dropped.
type KeyBuffer = Zeroizing<Vec<bool>>;

/// BB84 run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BB84Config {
    /// Qubits sent over the channel.
    pub num_qubits: usize,
    /// Selection indices drawn for the verification sample.
    pub sample_size: usize,
    /// Bits kept in the final secret.
    pub key_length: usize,
    /// Also compare the full remaining keys after the sample check.
    pub verify_full_key: bool,
}

impl Default for BB84Config {
    fn default() -> Self {
        Self {
            num_qubits: DEFAULT_NUM_QUBITS,
            sample_size: DEFAULT_SAMPLE_SIZE,
            key_length: DEFAULT_KEY_LENGTH,
            verify_full_key: true,
        }
    }
}

impl BB84Config {
    pub fn with_num_qubits(mut self, num_qubits: usize) -> Self {
        self.num_qubits = num_qubits;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length = key_length;
        self
    }

    pub fn with_full_key_verification(mut self, enabled: bool) -> Self {
        self.verify_full_key = enabled;
        self
    }

    /// Rejects configurations that can never yield a key of `key_length` bits,
    /// even if every basis choice were to agree.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let required = self.sample_size.saturating_add(self.key_length);
        if required > self.num_qubits {
            return Err(ProtocolError::InsufficientKeyLength {
                required,
                available: self.num_qubits,
            });
        }
        Ok(())
    }
}

/// BB84 results
#[derive(Debug)]
pub struct BB84Result {
    pub raw_length: usize,
    pub sifted_length: usize,
    /// Bits left after the verification sample was removed.
    pub remaining_length: usize,
    pub sample_length: usize,
    /// Error rate of the verification sample, in percent.
    pub qber: f64,
    pub initiator_key: SecretKey,
    pub responder_key: SecretKey,
}

/// Keeps `bits[i]` wherever `initiator_bases[i] == responder_bases[i]`.
///
/// Call once with the initiator's prepared bits and once with the responder's
/// measured bits, passing the same basis sequences both times so the two
/// sifted keys stay positionally aligned.
pub fn sift(
    initiator_bases: &[Basis],
    responder_bases: &[Basis],
    bits: &[bool],
) -> Result<Vec<bool>, ProtocolError> {
    let expected = bits.len();
    for got in [initiator_bases.len(), responder_bases.len()] {
        if got != expected {
            return Err(ProtocolError::LengthMismatch { expected, got });
        }
    }

    let sifted = bits
        .iter()
        .zip(initiator_bases.iter().zip(responder_bases))
        .filter(|(_, (a, b))| a == b)
        .map(|(&bit, _)| bit)
        .collect();

    Ok(sifted)
}

/// Pops one bit per selection index out of `key` and returns them in order.
///
/// Each index is reduced modulo the key's length *at the time of the pop*, so
/// earlier pops shift where later indices land. Both parties must apply the
/// same `selection_indices` in the same order.
///
/// Fails with [`ProtocolError::SampleTooLarge`] without touching `key` when
/// there are more indices than bits.
pub fn sample_and_remove(
    key: &mut Vec<bool>,
    selection_indices: &[usize],
) -> Result<Vec<bool>, ProtocolError> {
    if selection_indices.len() > key.len() {
        return Err(ProtocolError::SampleTooLarge {
            requested: selection_indices.len(),
            available: key.len(),
        });
    }

    let mut sample = Vec::with_capacity(selection_indices.len());
    for &index in selection_indices {
        let position = index % key.len();
        sample.push(key.remove(position));
    }

    Ok(sample)
}

/// Order-sensitive comparison of the two parties' verification samples.
pub fn verify(sample_a: &[bool], sample_b: &[bool]) -> Result<(), ProtocolError> {
    let mismatches = count_mismatches(sample_a, sample_b);
    if mismatches > 0 {
        return Err(ProtocolError::SampleMismatch {
            mismatches,
            sample_len: sample_a.len().max(sample_b.len()),
        });
    }
    Ok(())
}

/// Compares the full remaining keys after sampling.
///
/// Independent of [`verify`]: a clean sample does not prove the rest of the
/// key agrees.
pub fn verify_keys(key_a: &[bool], key_b: &[bool]) -> Result<(), ProtocolError> {
    let mismatches = count_mismatches(key_a, key_b);
    if mismatches > 0 {
        return Err(ProtocolError::KeyMismatch {
            mismatches,
            key_len: key_a.len().max(key_b.len()),
        });
    }
    Ok(())
}

/// Truncates the remaining key to `required_length` bits.
///
/// A shorter key is never padded.
pub fn finalize(key: &[bool], required_length: usize) -> Result<SecretKey, ProtocolError> {
    if key.len() < required_length {
        return Err(ProtocolError::InsufficientKeyLength {
            required: required_length,
            available: key.len(),
        });
    }
    Ok(SecretKey::new(key[..required_length].to_vec()))
}

/// Quantum bit error rate of a verification sample, in percent.
pub fn estimate_qber(sample_a: &[bool], sample_b: &[bool]) -> f64 {
    let len = sample_a.len().max(sample_b.len());
    if len == 0 {
        return 0.0;
    }
    (count_mismatches(sample_a, sample_b) as f64 / len as f64) * 100.0
}

/// Runs BB84 protocol
///
/// Draws fresh bits and bases from `sampler`, sends them through `channel`,
/// then sifts, samples, verifies and truncates. Any failed check aborts the
/// run; there is no partial key. Callers retry with a fresh run.
pub fn run<R: Rng, C: QuantumChannel>(
    config: &BB84Config,
    sampler: &mut Sampler<R>,
    channel: &mut C,
) -> Result<BB84Result, ProtocolError> {
    config.validate()?;
    let n = config.num_qubits;

    // Initiator prepares, responder picks measurement bases
    let Party {
        bits,
        bases: initiator_bases,
    } = sampler.party(n);
    let initiator_bits = KeyBuffer::new(bits);
    let responder_bases = sampler.random_bases(n);

    let responder_bits = KeyBuffer::new(channel.transmit(
        &initiator_bits,
        &initiator_bases,
        &responder_bases,
    )?);
    if responder_bits.len() != n {
        return Err(ProtocolError::LengthMismatch {
            expected: n,
            got: responder_bits.len(),
        });
    }

    // Sifting stage
    let mut initiator_key =
        KeyBuffer::new(sift(&initiator_bases, &responder_bases, &initiator_bits)?);
    let mut responder_key =
        KeyBuffer::new(sift(&initiator_bases, &responder_bases, &responder_bits)?);
    let sifted_length = initiator_key.len();

    tracing::debug!(raw_length = n, sifted_length, "Sifted keys");

    // Sample with the same selection on both sides
    let selection = sampler.selection_indices(config.sample_size, n);
    let initiator_sample = KeyBuffer::new(sample_and_remove(&mut initiator_key, &selection)?);
    let responder_sample = KeyBuffer::new(sample_and_remove(&mut responder_key, &selection)?);
    let qber = estimate_qber(&initiator_sample, &responder_sample);

    tracing::debug!(
        sample_length = selection.len(),
        remaining_length = initiator_key.len(),
        qber,
        "Sampled verification bits"
    );

    verify(&initiator_sample, &responder_sample).inspect_err(|e| {
        tracing::warn!(error = %e, qber, "Noise or eavesdropper detected, aborting run");
    })?;

    if config.verify_full_key {
        verify_keys(&initiator_key, &responder_key).inspect_err(|e| {
            tracing::warn!(error = %e, "Remaining keys disagree, aborting run");
        })?;
    }

    let remaining_length = initiator_key.len();
    let initiator_secret = finalize(&initiator_key, config.key_length)?;
    let responder_secret = finalize(&responder_key, config.key_length)?;

    tracing::debug!(key_length = config.key_length, "Established shared secret");

    Ok(BB84Result {
        raw_length: n,
        sifted_length,
        remaining_length,
        sample_length: selection.len(),
        qber,
        initiator_key: initiator_secret,
        responder_key: responder_secret,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoiselessChannel;
    use crate::utils::{format_bits, parse_bits};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bases(s: &str) -> Vec<Basis> {
        parse_bits(s).unwrap().into_iter().map(Basis::from).collect()
    }

    #[test]
    fn sift_keeps_positions_with_matching_bases() {
        let bits = parse_bits("0110").unwrap();
        let initiator_bases = bases("0011");
        let responder_bases = bases("0111");

        let mut channel = NoiselessChannel::new(StdRng::seed_from_u64(0));
        let received = channel
            .transmit(&bits, &initiator_bases, &responder_bases)
            .unwrap();

        let initiator_key = sift(&initiator_bases, &responder_bases, &bits).unwrap();
        let responder_key = sift(&initiator_bases, &responder_bases, &received).unwrap();

        assert_eq!(format_bits(&initiator_key), "010");
        assert_eq!(initiator_key, responder_key);
    }

    #[test]
    fn sift_rejects_unequal_lengths() {
        let err = sift(&bases("01"), &bases("011"), &parse_bits("01").unwrap()).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::LengthMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn sampling_reduces_modulo_current_length() {
        let mut key = parse_bits("01101100").unwrap();

        let sample = sample_and_remove(&mut key, &[2, 0]).unwrap();

        // 2 % 8 = 2 pops '1' -> "0101100"; 0 % 7 = 0 pops '0' -> "101100"
        assert_eq!(format_bits(&sample), "10");
        assert_eq!(format_bits(&key), "101100");
    }

    #[test]
    fn sampling_order_matters() {
        // 7 % 8 = 7 then 3 % 7 = 3, versus 3 % 8 = 3 then 7 % 7 = 0
        let mut k1 = parse_bits("01101100").unwrap();
        let mut k2 = k1.clone();
        let s1 = sample_and_remove(&mut k1, &[7, 3]).unwrap();
        let s2 = sample_and_remove(&mut k2, &[3, 7]).unwrap();
        assert_eq!(format_bits(&s1), "00");
        assert_eq!(format_bits(&s2), "00");
        assert_eq!(format_bits(&k1), "011110");
        assert_eq!(format_bits(&k2), "111100");
    }

    #[test]
    fn oversized_sample_fails_without_mutation() {
        let mut key = parse_bits("101").unwrap();
        let err = sample_and_remove(&mut key, &[0, 1, 2, 3]).unwrap_err();

        assert_eq!(
            err,
            ProtocolError::SampleTooLarge {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(format_bits(&key), "101");
    }

    #[test]
    fn sampling_the_whole_key_empties_it() {
        let mut key = parse_bits("1011").unwrap();
        let sample = sample_and_remove(&mut key, &[5, 5, 5, 5]).unwrap();

        assert_eq!(sample.len(), 4);
        assert!(key.is_empty());
    }

    #[test]
    fn verify_reports_sample_mismatch() {
        let a = parse_bits("0110").unwrap();
        let b = parse_bits("0111").unwrap();

        assert!(verify(&a, &a).is_ok());
        assert_eq!(
            verify(&a, &b),
            Err(ProtocolError::SampleMismatch {
                mismatches: 1,
                sample_len: 4
            })
        );
    }

    #[test]
    fn verify_keys_reports_key_mismatch() {
        let a = parse_bits("1100").unwrap();
        let b = parse_bits("0011").unwrap();

        assert_eq!(
            verify_keys(&a, &b),
            Err(ProtocolError::KeyMismatch {
                mismatches: 4,
                key_len: 4
            })
        );
    }

    #[test]
    fn finalize_truncates() {
        let key = parse_bits("1101111100").unwrap();
        let secret = finalize(&key, 8).unwrap();
        assert_eq!(format_bits(secret.bits()), "11011111");
    }

    #[test]
    fn finalize_never_pads() {
        let key = parse_bits("110").unwrap();
        assert_eq!(
            finalize(&key, 8).unwrap_err(),
            ProtocolError::InsufficientKeyLength {
                required: 8,
                available: 3
            }
        );
    }

    #[test]
    fn qber_is_a_percentage() {
        let a = parse_bits("0000").unwrap();
        let b = parse_bits("0001").unwrap();
        assert!((estimate_qber(&a, &b) - 25.0).abs() < 1e-9);
        assert_eq!(estimate_qber(&[], &[]), 0.0);
    }

    #[test]
    fn config_validation() {
        assert!(BB84Config::default().validate().is_ok());

        let config = BB84Config::default()
            .with_num_qubits(50)
            .with_sample_size(45)
            .with_key_length(8);
        assert_eq!(
            config.validate(),
            Err(ProtocolError::InsufficientKeyLength {
                required: 53,
                available: 50
            })
        );

        let oversized = BB84Config::default().with_sample_size(usize::MAX);
        assert_eq!(
            oversized.validate(),
            Err(ProtocolError::InsufficientKeyLength {
                required: usize::MAX,
                available: DEFAULT_NUM_QUBITS
            })
        );
    }

    #[test]
    fn key_buffers_clear_on_zeroize() {
        use zeroize::Zeroize;

        let mut buffer = KeyBuffer::new(parse_bits("1011").unwrap());
        buffer.zeroize();
        assert!(buffer.is_empty());
    }

    #[test]
    fn noiseless_run_agrees() {
        let config = BB84Config::default();
        let mut sampler = Sampler::from_seed(2024);
        let mut channel = NoiselessChannel::new(StdRng::seed_from_u64(2025));

        let result = run(&config, &mut sampler, &mut channel).unwrap();

        assert_eq!(result.raw_length, 1000);
        assert_eq!(result.sample_length, 100);
        assert_eq!(result.remaining_length, result.sifted_length - 100);
        assert_eq!(result.qber, 0.0);
        assert_eq!(result.initiator_key.len(), 8);
        assert_eq!(result.initiator_key, result.responder_key);
    }
}
