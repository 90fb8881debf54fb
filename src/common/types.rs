// src/common/types.rs

use core::fmt;

use arrayvec::ArrayVec;

use super::error::Sps30Error;

/// Byte length of the measured-values block: ten big-endian IEEE-754 floats.
pub const MEASUREMENT_LEN: usize = 40;

/// Maximum length of a device-info string (serial number).
pub const DEVICE_INFO_LEN: usize = 32;

/// Debug verbosity of the protocol engine, routed through the `log` crate.
///
/// Matches the original 0/1/2 levels: level 1 dumps raw sent/received
/// frames, level 2 additionally reports protocol progress and fault detail.
/// Debug output never alters control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DebugLevel {
    /// No debug output.
    #[default]
    Off,
    /// Log raw sent and received frames.
    Frames,
    /// Frames plus protocol progress.
    Verbose,
}

/// One full SPS30 sample: mass and number concentrations plus the typical
/// particle size, as big-endian IEEE-754 floats on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// Mass Concentration PM1.0 [µg/m³]
    pub mass_pm1_0: f32,
    /// Mass Concentration PM2.5 [µg/m³]
    pub mass_pm2_5: f32,
    /// Mass Concentration PM4.0 [µg/m³]
    pub mass_pm4_0: f32,
    /// Mass Concentration PM10 [µg/m³]
    pub mass_pm10: f32,
    /// Number Concentration PM0.5 [#/cm³]
    pub number_pm0_5: f32,
    /// Number Concentration PM1.0 [#/cm³]
    pub number_pm1_0: f32,
    /// Number Concentration PM2.5 [#/cm³]
    pub number_pm2_5: f32,
    /// Number Concentration PM4.0 [#/cm³]
    pub number_pm4_0: f32,
    /// Number Concentration PM10 [#/cm³]
    pub number_pm10: f32,
    /// Typical Particle Size [µm]
    pub typical_size: f32,
}

impl Measurement {
    /// Reconstructs a measurement from the fixed 40-byte response payload.
    ///
    /// Each 4-byte group is assembled most-significant-byte first, per the
    /// datasheet.
    pub fn from_payload(payload: &[u8]) -> Result<Self, Sps30Error> {
        if payload.len() != MEASUREMENT_LEN {
            return Err(Sps30Error::DataLength);
        }

        let f = |offset: usize| -> f32 {
            f32::from_be_bytes([
                payload[offset],
                payload[offset + 1],
                payload[offset + 2],
                payload[offset + 3],
            ])
        };

        Ok(Measurement {
            mass_pm1_0: f(0),
            mass_pm2_5: f(4),
            mass_pm4_0: f(8),
            mass_pm10: f(12),
            number_pm0_5: f(16),
            number_pm1_0: f(20),
            number_pm2_5: f(24),
            number_pm4_0: f(28),
            number_pm10: f(32),
            typical_size: f(36),
        })
    }

    /// Returns the value of a single field.
    pub fn get(&self, field: MeasurementField) -> f32 {
        match field {
            MeasurementField::MassPm1_0 => self.mass_pm1_0,
            MeasurementField::MassPm2_5 => self.mass_pm2_5,
            MeasurementField::MassPm4_0 => self.mass_pm4_0,
            MeasurementField::MassPm10 => self.mass_pm10,
            MeasurementField::NumberPm0_5 => self.number_pm0_5,
            MeasurementField::NumberPm1_0 => self.number_pm1_0,
            MeasurementField::NumberPm2_5 => self.number_pm2_5,
            MeasurementField::NumberPm4_0 => self.number_pm4_0,
            MeasurementField::NumberPm10 => self.number_pm10,
            MeasurementField::TypicalSize => self.typical_size,
        }
    }
}

/// Selector for one of the ten canonical measurement fields.
///
/// The discriminants start at 1; slot 0 of the reported-field cache is
/// deliberately unused, mirroring the device protocol's field numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MeasurementField {
    MassPm1_0 = 1,
    MassPm2_5 = 2,
    MassPm4_0 = 3,
    MassPm10 = 4,
    NumberPm0_5 = 5,
    NumberPm1_0 = 6,
    NumberPm2_5 = 7,
    NumberPm4_0 = 8,
    NumberPm10 = 9,
    TypicalSize = 10,
}

impl MeasurementField {
    /// Cache slot index of this field (1..=10).
    #[inline]
    pub const fn slot(&self) -> usize {
        *self as usize
    }
}

/// Firmware version as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl FirmwareVersion {
    /// Whether this version satisfies the given minimum level.
    pub const fn supports(&self, min_major: u8, min_minor: u8) -> bool {
        self.major > min_major || (self.major == min_major && self.minor >= min_minor)
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Decoded device status register (requires firmware >= 2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStatus {
    /// Fan speed out of range (warning).
    pub speed_warning: bool,
    /// Laser failure.
    pub laser_error: bool,
    /// Fan failure (mechanically blocked or broken).
    pub fan_error: bool,
}

impl DeviceStatus {
    /// Decodes the 4 status register bytes.
    ///
    /// Bit layout per the datasheet: bit 21 fan speed, bit 5 laser, bit 4
    /// fan.
    pub fn from_registers(raw: &[u8; 4]) -> Self {
        DeviceStatus {
            speed_warning: raw[1] & 0b0010_0000 != 0,
            laser_error: raw[3] & 0b0010_0000 != 0,
            fan_error: raw[3] & 0b0001_0000 != 0,
        }
    }

    /// True when no fault or warning flag is set.
    pub const fn is_ok(&self) -> bool {
        !self.speed_warning && !self.laser_error && !self.fan_error
    }
}

/// A device-info string (product type or serial number).
///
/// Stores at most 32 ASCII bytes, truncated at the first NUL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo(ArrayVec<u8, DEVICE_INFO_LEN>);

impl DeviceInfo {
    /// Builds a device-info string from a decoded payload, keeping bytes up
    /// to (but excluding) the first NUL.
    pub fn from_payload(payload: &[u8]) -> Self {
        let mut info = ArrayVec::new();
        for &byte in payload.iter().take(DEVICE_INFO_LEN) {
            if byte == 0x00 {
                break;
            }
            info.push(byte);
        }
        DeviceInfo(info)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The info as a string slice, if it is valid UTF-8 (the device only
    /// ever reports ASCII).
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.0.iter() {
            write!(f, "{}", byte as char)?;
        }
        Ok(())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_from_payload() {
        let mut payload = [0u8; MEASUREMENT_LEN];
        payload[0..4].copy_from_slice(&12.5f32.to_be_bytes());
        payload[4..8].copy_from_slice(&20.25f32.to_be_bytes());
        payload[36..40].copy_from_slice(&0.55f32.to_be_bytes());

        let m = Measurement::from_payload(&payload).unwrap();
        assert_eq!(m.mass_pm1_0, 12.5);
        assert_eq!(m.mass_pm2_5, 20.25);
        assert_eq!(m.mass_pm4_0, 0.0);
        assert_eq!(m.typical_size, 0.55);
    }

    #[test]
    fn test_measurement_bad_length() {
        assert!(matches!(
            Measurement::from_payload(&[0u8; 38]),
            Err(Sps30Error::DataLength)
        ));
    }

    #[test]
    fn test_field_slots() {
        assert_eq!(MeasurementField::MassPm1_0.slot(), 1);
        assert_eq!(MeasurementField::TypicalSize.slot(), 10);
    }

    #[test]
    fn test_firmware_supports() {
        let fw = FirmwareVersion { major: 2, minor: 1 };
        assert!(fw.supports(2, 0));
        assert!(fw.supports(2, 1));
        assert!(fw.supports(1, 9));
        assert!(!fw.supports(2, 2));
        assert!(!fw.supports(3, 0));

        // A higher major satisfies any lower minor requirement.
        let fw30 = FirmwareVersion { major: 3, minor: 0 };
        assert!(fw30.supports(2, 2));
    }

    #[test]
    fn test_device_status_bits() {
        assert!(DeviceStatus::from_registers(&[0, 0, 0, 0]).is_ok());

        let speed = DeviceStatus::from_registers(&[0, 0b0010_0000, 0, 0]);
        assert!(speed.speed_warning && !speed.laser_error && !speed.fan_error);

        let laser = DeviceStatus::from_registers(&[0, 0, 0, 0b0010_0000]);
        assert!(laser.laser_error && !laser.speed_warning);

        let fan = DeviceStatus::from_registers(&[0, 0, 0, 0b0001_0000]);
        assert!(fan.fan_error && !fan.is_ok());
    }

    #[test]
    fn test_device_info_truncates_at_nul() {
        let info = DeviceInfo::from_payload(&[b'A', b'B', b'C', 0x00, b'D']);
        assert_eq!(info.as_bytes(), b"ABC");
        assert_eq!(info.as_str(), Some("ABC"));
        assert_eq!(info.len(), 3);
    }

    #[test]
    fn test_device_info_without_nul() {
        let info = DeviceInfo::from_payload(b"00080000");
        assert_eq!(info.as_str(), Some("00080000"));
    }
}
