//! XOR stream cipher keyed by distilled key bits.
//!
//! The key bit pattern is repeated until it fills a whole number of bytes
//! (`lcm(len, 8)` bits), packed MSB first, and XORed against the payload byte
//! by byte, so a key that is not byte aligned still cycles bit for bit. The transform is
//! its own inverse. There is no integrity check: decrypting with the wrong key
//! produces different bytes, not an error. Trust in the key comes from the
//! verification steps of the key distillation protocol.

use crate::core::utils::bits_to_bytes;
use crate::{SecretKey, errors::CipherError};
use zeroize::Zeroize;

/// What to do when the key is shorter than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Repeat the key bit pattern from its first bit.
    #[default]
    Cycle,
    /// Refuse messages longer than the key.
    Strict,
}

/// XOR cipher over a packed key.
#[derive(Clone)]
pub struct XorCipher {
    /// One full key period, packed.
    key: Vec<u8>,
    key_bits: usize,
    policy: KeyPolicy,
}

impl XorCipher {
    /// Creates a cipher from raw key bits.
    pub fn new(key_bits: &[bool]) -> Result<Self, CipherError> {
        if key_bits.is_empty() {
            return Err(CipherError::EmptyKey);
        }
        Ok(Self {
            key: pack_key_period(key_bits),
            key_bits: key_bits.len(),
            policy: KeyPolicy::default(),
        })
    }

    /// Creates a cipher from a distilled secret.
    pub fn from_secret(secret: &SecretKey) -> Result<Self, CipherError> {
        Self::new(secret.bits())
    }

    pub fn with_policy(mut self, policy: KeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Key length in bits, before cycling.
    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    /// Bytes in one full key period.
    pub fn period_len(&self) -> usize {
        self.key.len()
    }

    /// XORs `data` against the key. Output length always equals input length.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let message_bits = data.len().saturating_mul(8);
        if self.policy == KeyPolicy::Strict && message_bits > self.key_bits {
            return Err(CipherError::KeyTooShort {
                key_bits: self.key_bits,
                message_bits,
            });
        }

        Ok(data
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, k)| byte ^ k)
            .collect())
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.apply(plaintext)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.apply(ciphertext)
    }

    /// Encrypts and renders the ciphertext as lowercase hex, two digits per byte.
    pub fn encrypt_to_hex(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        Ok(hex::encode(self.apply(plaintext)?))
    }

    /// Decodes hex ciphertext and decrypts it.
    pub fn decrypt_from_hex(&self, ciphertext: &str) -> Result<Vec<u8>, CipherError> {
        let bytes = hex::decode(ciphertext.trim())?;
        self.apply(&bytes)
    }
}

impl std::fmt::Debug for XorCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XorCipher")
            .field("key_bits", &self.key_bits)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Drop for XorCipher {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Repeats `key_bits` over `lcm(len, 8)` bits and packs them into bytes.
fn pack_key_period(key_bits: &[bool]) -> Vec<u8> {
    let gcd = 1usize << key_bits.len().trailing_zeros().min(3);
    let period = key_bits.len() / gcd * 8;

    let mut cycled: Vec<bool> = key_bits.iter().copied().cycle().take(period).collect();
    let packed = bits_to_bytes(&cycled);
    cycled.zeroize();
    packed
}

/// Encrypts `plaintext` with a cycling key.
pub fn encrypt(plaintext: &[u8], key_bits: &[bool]) -> Result<Vec<u8>, CipherError> {
    XorCipher::new(key_bits)?.encrypt(plaintext)
}

/// Decrypts `ciphertext` with a cycling key. Same transform as [`encrypt`].
pub fn decrypt(ciphertext: &[u8], key_bits: &[bool]) -> Result<Vec<u8>, CipherError> {
    XorCipher::new(key_bits)?.decrypt(ciphertext)
}
