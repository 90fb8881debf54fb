//! SPS30 command definitions.
//!
//! See the Sensirion SPS30 datasheet (March 2020), section 6 "I2C Interface
//! Description" for the opcode table.

/// Represents an SPS30 instruction.
///
/// Each command maps to a 16-bit register opcode. Most commands are bare
/// pointer writes; `StartMeasurement` carries an implicit measurement-mode
/// payload and `SetAutoCleaningInterval` carries the 32-bit interval value,
/// both appended by the frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin continuous measurement (float output format).
    StartMeasurement,
    /// Return to idle mode.
    StopMeasurement,
    /// Query whether a new sample can be read.
    ReadDataReadyFlag,
    /// Read the ten measured values (40 payload bytes).
    ReadMeasuredValues,
    /// Enter sleep mode. Requires firmware >= 2.0.
    Sleep,
    /// Leave sleep mode. Requires firmware >= 2.0.
    WakeUp,
    /// Start a manual fan cleaning cycle. Only valid while measuring.
    StartFanCleaning,
    /// Read the auto-cleaning interval in seconds.
    ReadAutoCleaningInterval,
    /// Write a new auto-cleaning interval in seconds.
    SetAutoCleaningInterval { seconds: u32 },
    /// Read the product type string (fixed "00080000").
    ReadProductType,
    /// Read the NUL-terminated serial number (max 32 characters).
    ReadSerialNumber,
    /// Read the firmware version (major, minor).
    ReadVersion,
    /// Read the device status register. Requires firmware >= 2.2.
    ReadDeviceStatusRegister,
    /// Clear the device status register. Requires firmware >= 2.2.
    ClearDeviceStatusRegister,
    /// Perform a device soft reset.
    Reset,
}

impl Command {
    /// Returns the 16-bit register opcode for this command.
    pub const fn opcode(&self) -> u16 {
        match self {
            Command::StartMeasurement => 0x0010,
            Command::StopMeasurement => 0x0104,
            Command::ReadDataReadyFlag => 0x0202,
            Command::ReadMeasuredValues => 0x0300,
            Command::Sleep => 0x1001,
            Command::WakeUp => 0x1103,
            Command::StartFanCleaning => 0x5607,
            Command::ReadAutoCleaningInterval => 0x8004,
            // Internal discriminator only: the wire frame for a set re-uses
            // the read opcode 0x8004 as its head (see the frame codec).
            Command::SetAutoCleaningInterval { .. } => 0x8005,
            Command::ReadProductType => 0xD002,
            Command::ReadSerialNumber => 0xD033,
            Command::ReadVersion => 0xD100,
            Command::ReadDeviceStatusRegister => 0xD206,
            Command::ClearDeviceStatusRegister => 0xD210,
            Command::Reset => 0xD304,
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_table() {
        // Values straight from the datasheet opcode table.
        assert_eq!(Command::StartMeasurement.opcode(), 0x0010);
        assert_eq!(Command::StopMeasurement.opcode(), 0x0104);
        assert_eq!(Command::ReadDataReadyFlag.opcode(), 0x0202);
        assert_eq!(Command::ReadMeasuredValues.opcode(), 0x0300);
        assert_eq!(Command::Sleep.opcode(), 0x1001);
        assert_eq!(Command::WakeUp.opcode(), 0x1103);
        assert_eq!(Command::StartFanCleaning.opcode(), 0x5607);
        assert_eq!(Command::ReadAutoCleaningInterval.opcode(), 0x8004);
        assert_eq!(
            Command::SetAutoCleaningInterval { seconds: 0 }.opcode(),
            0x8005
        );
        assert_eq!(Command::ReadProductType.opcode(), 0xD002);
        assert_eq!(Command::ReadSerialNumber.opcode(), 0xD033);
        assert_eq!(Command::ReadVersion.opcode(), 0xD100);
        assert_eq!(Command::ReadDeviceStatusRegister.opcode(), 0xD206);
        assert_eq!(Command::ClearDeviceStatusRegister.opcode(), 0xD210);
        assert_eq!(Command::Reset.opcode(), 0xD304);
    }
}
