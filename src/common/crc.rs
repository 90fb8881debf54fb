// src/common/crc.rs

use super::error::Sps30Error;
use crc::{Algorithm, Crc};

/// Custom CRC algorithm matching the SPS30 datasheet (CRC-8/NRSC-5).
/// Polynomial: 0x31 (x^8 + x^5 + x^4 + 1)
/// Initial Value: 0xFF
/// Input Reflected: false
/// Output Reflected: false
/// Final XOR: 0x00
/// Check Value: 0xF7 (for "123456789") - standard for CRC-8/NRSC-5
/// Residue: 0x00
pub const SPS30_CRC: Algorithm<u8> = Algorithm {
    poly: 0x31,
    init: 0xFF,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xF7,
    width: 8,
    residue: 0x00,
};

// Create a Crc instance for the SPS30 algorithm for reuse.
const CRC_COMPUTER: Crc<u8> = Crc::<u8>::new(&SPS30_CRC);

/// Calculates the SPS30 CRC-8 for the given data.
///
/// Uses the `crc` crate configured for CRC-8/NRSC-5, which matches the
/// checksum described in the SPS30 datasheet. On the wire every check byte
/// protects exactly one 2-byte word, so callers normally pass a 2-byte slice.
#[inline]
pub fn calculate_crc8(data: &[u8]) -> u8 {
    CRC_COMPUTER.checksum(data)
}

/// Verifies the check byte trailing a 2-byte data word.
///
/// # Arguments
///
/// * `word`: The two data bytes as transmitted.
/// * `received`: The check byte that followed them on the wire.
///
/// # Returns
///
/// * `Ok(())` if the CRC matches.
/// * `Err(Sps30Error::Protocol)` on a mismatch.
pub fn verify_word_crc(word: &[u8; 2], received: u8) -> Result<(), Sps30Error> {
    let calculated = calculate_crc8(word);
    if calculated == received {
        Ok(())
    } else {
        log::debug!(
            "CRC error: expected 0x{:02X}, calculated 0x{:02X}",
            received,
            calculated
        );
        Err(Sps30Error::Protocol)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // The canonical CRC-8/NRSC-5 check vector.
        assert_eq!(calculate_crc8(b"123456789"), 0xF7);
    }

    #[test]
    fn test_datasheet_vectors() {
        // From the Sensirion datasheet: CRC of {0xBE, 0xEF} is 0x92.
        assert_eq!(calculate_crc8(&[0xBE, 0xEF]), 0x92);
        // An all-zero word carries check byte 0x81.
        assert_eq!(calculate_crc8(&[0x00, 0x00]), 0x81);
    }

    #[test]
    fn test_verify_word() {
        assert!(verify_word_crc(&[0xBE, 0xEF], 0x92).is_ok());
        assert!(matches!(
            verify_word_crc(&[0xBE, 0xEF], 0x93),
            Err(Sps30Error::Protocol)
        ));
    }

    #[test]
    fn test_round_trip_all_words() {
        // Every possible 2-byte word must verify against its own check byte.
        for w in 0..=u16::MAX {
            let word = w.to_be_bytes();
            let crc = calculate_crc8(&word);
            assert!(verify_word_crc(&word, crc).is_ok());
        }
    }

    #[test]
    fn test_single_bit_corruption_detected() {
        let word = [0x12, 0x34];
        let crc = calculate_crc8(&word);
        // Flip each data bit in turn.
        for byte in 0..2 {
            for bit in 0..8 {
                let mut corrupted = word;
                corrupted[byte] ^= 1 << bit;
                assert!(
                    verify_word_crc(&corrupted, crc).is_err(),
                    "flip of byte {} bit {} went undetected",
                    byte,
                    bit
                );
            }
        }
        // Flip each check-byte bit in turn.
        for bit in 0..8 {
            assert!(verify_word_crc(&word, crc ^ (1 << bit)).is_err());
        }
    }
}
