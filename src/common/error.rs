// src/common/error.rs

/// Fault reasons reported by the raw bus transport.
///
/// These are the only failure modes the transport boundary is allowed to
/// report; the engine maps every one of them to [`Sps30Error::Protocol`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFault {
    /// The device did not acknowledge the transfer.
    #[error("bus acknowledgement failure")]
    Nack,

    /// Clock stretching by the device exceeded the controller limit.
    #[error("bus clock-stretch failure")]
    ClockStretch,

    /// Fewer bytes were transferred than requested.
    #[error("partial bus data transfer")]
    PartialData,
}

/// Closed SPS30 error taxonomy.
///
/// Mirrors the response codes of the sensor protocol; every operation of the
/// engine returns one of these as an explicit result value. There is no
/// catch-all variant and no generic I/O passthrough: transport faults are
/// folded into [`Sps30Error::Protocol`] at the boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Sps30Error {
    /// Response length did not match what the command requires.
    #[error("wrong data length for this command (too much or little data)")]
    DataLength,

    /// The device did not recognize the command.
    #[error("unknown command")]
    UnknownCommand,

    /// The device refused access for this command.
    #[error("no access right for command")]
    AccessRight,

    /// Illegal command parameter or parameter out of allowed range.
    #[error("illegal command parameter or parameter out of allowed range")]
    Parameter,

    /// The device status register reports a fault condition.
    #[error("internal function argument out of range")]
    OutOfRange,

    /// Operation not allowed in the current device state.
    #[error("command not allowed in current state")]
    CmdState,

    /// No data-ready indication within the bounded poll window.
    #[error("no response received within timeout period")]
    Timeout,

    /// CRC mismatch, transport fault, or malformed frame.
    #[error("protocol error")]
    Protocol,

    /// Operation requires a firmware level the device does not have.
    #[error("not supported on this SPS30 firmware level")]
    Firmware,
}

impl Sps30Error {
    /// Returns the human-readable description for this error code.
    ///
    /// The exhaustive match guarantees that no code can fall through to an
    /// "unknown error" bucket.
    pub fn description(&self) -> &'static str {
        match self {
            Sps30Error::DataLength => {
                "Wrong data length for this command (too much or little data)"
            }
            Sps30Error::UnknownCommand => "Unknown command",
            Sps30Error::AccessRight => "No access right for command",
            Sps30Error::Parameter => {
                "Illegal command parameter or parameter out of allowed range"
            }
            Sps30Error::OutOfRange => "Internal function argument out of range",
            Sps30Error::CmdState => "Command not allowed in current state",
            Sps30Error::Timeout => "No response received within timeout period",
            Sps30Error::Protocol => "Protocol error",
            Sps30Error::Firmware => "Not supported on this SPS30 firmware level",
        }
    }
}

// Transport faults always surface to callers as protocol errors.
impl From<TransportFault> for Sps30Error {
    fn from(fault: TransportFault) -> Self {
        log::debug!("transport fault: {:?}", fault);
        Sps30Error::Protocol
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_fault_mapping() {
        assert_eq!(Sps30Error::from(TransportFault::Nack), Sps30Error::Protocol);
        assert_eq!(
            Sps30Error::from(TransportFault::ClockStretch),
            Sps30Error::Protocol
        );
        assert_eq!(
            Sps30Error::from(TransportFault::PartialData),
            Sps30Error::Protocol
        );
    }

    #[test]
    fn test_descriptions_are_distinct() {
        let all = [
            Sps30Error::DataLength,
            Sps30Error::UnknownCommand,
            Sps30Error::AccessRight,
            Sps30Error::Parameter,
            Sps30Error::OutOfRange,
            Sps30Error::CmdState,
            Sps30Error::Timeout,
            Sps30Error::Protocol,
            Sps30Error::Firmware,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(!a.description().is_empty());
            for b in &all[i + 1..] {
                assert_ne!(a.description(), b.description());
            }
        }
    }
}
