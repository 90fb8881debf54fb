// src/common/frame.rs

//! Wire-level frame codec.
//!
//! Outgoing frames are the 2-byte register opcode followed by zero or more
//! 2-byte payload words, each word trailed by its CRC-8 check byte. Incoming
//! responses are a stream of (2 data, 1 CRC) triplets; stripping the check
//! bytes yields the logical payload.

use arrayvec::ArrayVec;

use super::command::Command;
use super::crc::{calculate_crc8, verify_word_crc};
use super::error::Sps30Error;

/// Longest outgoing frame: the set-auto-clean-interval write (8 bytes).
pub const MAX_FRAME_LEN: usize = 8;

/// Largest logical payload the engine ever requests (40-byte measurement
/// block, 32-byte serial number).
pub const MAX_PAYLOAD_LEN: usize = 48;

/// Raw byte count corresponding to [`MAX_PAYLOAD_LEN`]: every 2 payload
/// bytes travel with one check byte.
pub const MAX_RAW_LEN: usize = MAX_PAYLOAD_LEN / 2 * 3;

/// Measurement-mode byte sent with `StartMeasurement`: big-endian IEEE-754
/// float output. (0x05 would select the unsigned 16-bit integer format,
/// which this engine does not support.)
const MEASURE_MODE_FLOAT: u8 = 0x03;

/// A decoded response payload with the check bytes stripped.
pub type Payload = ArrayVec<u8, MAX_PAYLOAD_LEN>;

/// Encodes a command into the exact outgoing byte sequence.
///
/// Plain commands are just the two opcode bytes. `StartMeasurement` appends
/// the measurement-mode byte, a reserved zero byte and their CRC.
/// `SetAutoCleaningInterval` is special: the frame head is the *read*
/// opcode 0x8004 re-encoded as the addressed word, followed by the interval
/// as two CRC-protected words. The device expects exactly this layout, so it
/// is preserved bit-for-bit.
pub fn encode(command: &Command) -> ArrayVec<u8, MAX_FRAME_LEN> {
    let mut frame = ArrayVec::new();

    if let Command::SetAutoCleaningInterval { seconds } = command {
        let head = Command::ReadAutoCleaningInterval.opcode().to_be_bytes();
        let val = seconds.to_be_bytes();
        frame.extend(head);
        frame.extend([val[0], val[1], calculate_crc8(&[val[0], val[1]])]);
        frame.extend([val[2], val[3], calculate_crc8(&[val[2], val[3]])]);
        return frame;
    }

    frame.extend(command.opcode().to_be_bytes());

    if let Command::StartMeasurement = command {
        let word = [MEASURE_MODE_FLOAT, 0x00]; // mode + reserved byte
        frame.extend(word);
        frame.push(calculate_crc8(&word));
    }

    frame
}

/// Decodes a raw response into its logical payload.
///
/// Groups `raw` into consecutive (2 data, 1 CRC) triplets, verifies each
/// check byte and collects the data bytes.
///
/// # Arguments
///
/// * `raw`: The bytes as read from the bus.
/// * `expected_count`: The exact payload length the caller expects
///   (fixed mode), or the maximum (NUL-terminated mode).
/// * `nul_terminated`: If true, decoding stops successfully at the first
///   all-zero data word (device name / serial number strings).
///
/// # Returns
///
/// * `Ok(payload)` with the verified data bytes.
/// * `Err(Sps30Error::Protocol)` on a CRC mismatch or an empty result.
/// * `Err(Sps30Error::DataLength)` when a fixed-mode payload does not match
///   `expected_count`.
pub fn decode(
    raw: &[u8],
    expected_count: usize,
    nul_terminated: bool,
) -> Result<Payload, Sps30Error> {
    if raw.len() > MAX_RAW_LEN {
        return Err(Sps30Error::DataLength);
    }

    let mut payload = Payload::new();
    let mut chunks = raw.chunks_exact(3);

    for triplet in &mut chunks {
        let word = [triplet[0], triplet[1]];
        verify_word_crc(&word, triplet[2])?;
        payload.extend(word);

        if nul_terminated && word == [0x00, 0x00] {
            return Ok(payload);
        }
    }

    // A dangling partial triplet is never expected in a well-formed
    // response; copy it through rather than discard it silently.
    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        log::debug!("dangling {} byte(s) in response", remainder.len());
        payload.try_extend_from_slice(remainder).ok();
    }

    if payload.is_empty() {
        log::debug!("received no bytes");
        return Err(Sps30Error::Protocol);
    }

    if !nul_terminated && payload.len() != expected_count {
        log::debug!(
            "expected {} payload bytes, received {}",
            expected_count,
            payload.len()
        );
        return Err(Sps30Error::DataLength);
    }

    Ok(payload)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    // Builds a well-formed triplet stream from logical payload bytes.
    fn raw_from_payload(payload: &[u8]) -> ArrayVec<u8, MAX_RAW_LEN> {
        assert_eq!(payload.len() % 2, 0);
        let mut raw = ArrayVec::new();
        for word in payload.chunks_exact(2) {
            raw.extend([word[0], word[1], calculate_crc8(word)]);
        }
        raw
    }

    #[test]
    fn test_encode_plain_command() {
        assert_eq!(encode(&Command::Reset).as_slice(), &[0xD3, 0x04]);
        assert_eq!(encode(&Command::StopMeasurement).as_slice(), &[0x01, 0x04]);
        assert_eq!(encode(&Command::WakeUp).as_slice(), &[0x11, 0x03]);
    }

    #[test]
    fn test_encode_start_measurement() {
        let frame = encode(&Command::StartMeasurement);
        let crc = calculate_crc8(&[0x03, 0x00]);
        assert_eq!(frame.as_slice(), &[0x00, 0x10, 0x03, 0x00, crc]);
    }

    #[test]
    fn test_encode_set_auto_clean_interval() {
        // 1209600 seconds = 0x00127500. The frame head is the read opcode
        // 0x8004, not 0x8005.
        let frame = encode(&Command::SetAutoCleaningInterval { seconds: 1_209_600 });
        let crc_hi = calculate_crc8(&[0x00, 0x12]);
        let crc_lo = calculate_crc8(&[0x75, 0x00]);
        assert_eq!(
            frame.as_slice(),
            &[0x80, 0x04, 0x00, 0x12, crc_hi, 0x75, 0x00, crc_lo]
        );
    }

    #[test]
    fn test_decode_fixed_length() {
        let raw = raw_from_payload(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let payload = decode(&raw, 4, false).unwrap();
        assert_eq!(payload.as_slice(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_decode_crc_mismatch() {
        let mut raw = raw_from_payload(&[0xDE, 0xAD]);
        raw[2] ^= 0x01;
        assert!(matches!(decode(&raw, 2, false), Err(Sps30Error::Protocol)));
    }

    #[test]
    fn test_decode_length_mismatch() {
        // k verified triplets yield exactly 2k payload bytes; anything else
        // in fixed mode is a DataLength failure.
        let raw = raw_from_payload(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(decode(&raw, 6, false), Err(Sps30Error::DataLength)));
        assert!(matches!(decode(&raw, 2, false), Err(Sps30Error::DataLength)));
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(matches!(decode(&[], 2, false), Err(Sps30Error::Protocol)));
    }

    #[test]
    fn test_decode_nul_terminated_stops_early() {
        // "AB\0\0CD" - decoding must stop at the zero word even though a
        // valid triplet follows.
        let raw = raw_from_payload(&[b'A', b'B', 0x00, 0x00, b'C', b'D']);
        let payload = decode(&raw, 32, true).unwrap();
        assert_eq!(payload.as_slice(), &[b'A', b'B', 0x00, 0x00]);
    }

    #[test]
    fn test_decode_nul_terminated_ignores_trailing_garbage() {
        // Bytes after the terminating word are never CRC-checked.
        let mut raw = raw_from_payload(&[b'X', b'Y', 0x00, 0x00]);
        raw.extend([0xFF, 0xFF, 0xFF]);
        let payload = decode(&raw, 32, true).unwrap();
        assert_eq!(payload.as_slice(), &[b'X', b'Y', 0x00, 0x00]);
    }

    #[test]
    fn test_decode_nul_terminated_no_length_check() {
        // Shorter than the maximum is fine in NUL-terminated mode.
        let raw = raw_from_payload(&[b'A', b'B', 0x00, 0x00]);
        assert!(decode(&raw, 32, true).is_ok());
    }

    #[test]
    fn test_decode_dangling_bytes_copied_through() {
        let mut raw = raw_from_payload(&[0x12, 0x34]);
        raw.extend([0x56, 0x78]);
        // 2 verified payload bytes + 2 dangling bytes = 4.
        let payload = decode(&raw, 4, false).unwrap();
        assert_eq!(payload.as_slice(), &[0x12, 0x34, 0x56, 0x78]);
    }
}
