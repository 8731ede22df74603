use crate::core::utils;
use std::fmt;
use zeroize::Zeroize;

/// Final shared secret produced by a protocol run.
///
/// Holds the key bits for exactly one encryption or decryption. The bits are
/// overwritten when the key is dropped, and `Debug` only reports the length.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    bits: Vec<bool>,
}

impl SecretKey {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Key bits packed MSB first, last byte zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        utils::bits_to_bytes(&self.bits)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.bits.len())
            .finish_non_exhaustive()
    }
}

// Implement Drop to zeroize key material
impl Drop for SecretKey {
    fn drop(&mut self) {
        self.bits.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_bits() {
        let key = SecretKey::new(vec![true, false, true]);
        let rendered = format!("{key:?}");
        assert!(rendered.contains("len: 3"));
        assert!(!rendered.contains("true"));
    }

    #[test]
    fn packs_to_bytes() {
        let key = SecretKey::new(utils::parse_bits("11011111").unwrap());
        assert_eq!(key.to_bytes(), vec![0b1101_1111]);
        assert_eq!(key.len(), 8);
        assert!(!key.is_empty());
    }
}
