//! Utility functions for classical bit sequences.
//!
//! This module contains helper functions for:
//! - Parsing and formatting bit strings such as `"01101100"`.
//! - Packing bits into bytes and unpacking them again (MSB first).
//! - Counting positional disagreements between two keys.

use crate::core::errors::BitParseError;

/// Parses a string of `0`/`1` characters into a bit sequence.
///
/// ASCII whitespace and the separators `_` and `,` are skipped, so
/// `"0,1,1,0"` and `"0110"` parse to the same bits.
pub fn parse_bits(input: &str) -> Result<Vec<bool>, BitParseError> {
    let mut bits = Vec::with_capacity(input.len());

    for (position, character) in input.chars().enumerate() {
        match character {
            '0' => bits.push(false),
            '1' => bits.push(true),
            c if c.is_ascii_whitespace() || c == '_' || c == ',' => continue,
            character => {
                return Err(BitParseError::InvalidCharacter {
                    character,
                    position,
                });
            }
        }
    }

    Ok(bits)
}

/// Renders a bit sequence as a string of `0`/`1` characters.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Packs bits into bytes, most significant bit first.
///
/// A trailing partial byte is zero-padded on the right, so `[1, 0, 1]`
/// becomes `0b1010_0000`.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << (7 - i)))
        })
        .collect()
}

/// Unpacks bytes into bits, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .collect()
}

/// Number of positions where `a` and `b` disagree.
///
/// Positions present in only one of the sequences count as disagreements.
pub fn count_mismatches(a: &[bool], b: &[bool]) -> usize {
    let differing = a.iter().zip(b.iter()).filter(|(x, y)| x != y).count();
    differing + a.len().abs_diff(b.len())
}
