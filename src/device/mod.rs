// src/device/mod.rs

//! The SPS30 session engine.
//!
//! One [`Sps30`] value owns one exclusive bus session and all of its state:
//! the started/sleeping flags, the lazily probed firmware level and the
//! single-value measurement cache. Every operation is synchronous and
//! blocking; failures come back as [`Sps30Error`] values, never as panics.

mod io;

use crate::common::command::Command;
use crate::common::error::Sps30Error;
use crate::common::hal_traits::{Sps30Timer, Sps30Transport};
use crate::common::timing;
use crate::common::types::{
    DebugLevel, DeviceInfo, DeviceStatus, FirmwareVersion, Measurement, MeasurementField,
    MEASUREMENT_LEN,
};

/// Reported-field cache slots: the ten fields plus the unused slot 0.
const REPORTED_SLOTS: usize = 11;

/// Payload length of the product type string ("00080000", no terminator).
const PRODUCT_TYPE_LEN: usize = 8;

/// Maximum payload length of the serial number string.
const SERIAL_NUMBER_LEN: usize = 32;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// When false, every firmware capability check passes unconditionally.
    /// Useful when talking to devices that misreport their version.
    pub firmware_check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            firmware_check: true,
        }
    }
}

/// A session with one SPS30 particulate matter sensor.
///
/// Generic over a single interface value implementing both the transport
/// and timer traits; the interface is exclusively owned for the lifetime of
/// the session.
#[derive(Debug)]
pub struct Sps30<IF>
where
    IF: Sps30Transport + Sps30Timer,
{
    interface: IF,
    config: Config,
    debug: DebugLevel,
    opened: bool,
    started: bool,
    sleeping: bool,
    was_started: bool,
    firmware: Option<FirmwareVersion>,
    reported: [bool; REPORTED_SLOTS],
    values: Measurement,
}

impl<IF> Sps30<IF>
where
    IF: Sps30Transport + Sps30Timer,
{
    /// Creates a session with the default configuration.
    pub fn new(interface: IF) -> Self {
        Self::with_config(interface, Config::default())
    }

    pub fn with_config(interface: IF, config: Config) -> Self {
        Sps30 {
            interface,
            config,
            debug: DebugLevel::Off,
            opened: false,
            started: false,
            sleeping: false,
            was_started: false,
            firmware: None,
            // All-reported primes the cache so the first single-value read
            // pulls a fresh sample.
            reported: [true; REPORTED_SLOTS],
            values: Measurement::default(),
        }
    }

    /// Sets the debug verbosity (0/1/2 in the original protocol tooling).
    pub fn enable_debugging(&mut self, level: DebugLevel) {
        self.debug = level;
    }

    /// Whether the device is currently in measurement mode.
    pub fn is_measuring(&self) -> bool {
        self.started
    }

    /// Whether the device is currently asleep.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Opens the bus and makes the session operational.
    pub fn begin(&mut self) -> Result<(), Sps30Error> {
        self.interface.open()?;
        self.opened = true;
        Ok(())
    }

    /// Releases the bus and zeroes all session state. A later `begin()`
    /// starts an equivalent fresh session.
    pub fn close(&mut self) {
        self.interface.close();
        self.opened = false;
        self.started = false;
        self.sleeping = false;
        self.was_started = false;
        self.firmware = None;
        self.reported = [true; REPORTED_SLOTS];
        self.values = Measurement::default();
    }

    /// Consumes the session and returns the interface.
    pub fn free(self) -> IF {
        self.interface
    }

    // --- Instructions ---

    /// Performs a device soft reset and waits the long settle delay.
    pub fn reset(&mut self) -> Result<(), Sps30Error> {
        self.instruct(Command::Reset)
    }

    /// Starts continuous measurement (float format) and waits the settle
    /// delay before the device may be addressed again.
    pub fn start(&mut self) -> Result<(), Sps30Error> {
        self.instruct(Command::StartMeasurement)
    }

    /// Stops measurement, returning the device to idle.
    pub fn stop(&mut self) -> Result<(), Sps30Error> {
        self.instruct(Command::StopMeasurement)
    }

    /// Starts a manual fan cleaning cycle.
    ///
    /// Only legal while measuring; otherwise fails locally with `CmdState`
    /// without touching the bus.
    pub fn clean(&mut self) -> Result<(), Sps30Error> {
        self.instruct(Command::StartFanCleaning)
    }

    fn instruct(&mut self, command: Command) -> Result<(), Sps30Error> {
        if matches!(command, Command::StartFanCleaning) && !self.started {
            if self.debug >= DebugLevel::Frames {
                log::debug!("sensor is not in measurement mode");
            }
            return Err(Sps30Error::CmdState);
        }

        self.send_frame(&command)?;

        match command {
            Command::StartMeasurement => {
                self.started = true;
                self.interface
                    .delay_ms(timing::START_SETTLE.as_millis() as u32);
            }
            Command::StopMeasurement => self.started = false,
            Command::Reset => {
                self.started = false;
                self.interface
                    .delay_ms(timing::RESET_SETTLE.as_millis() as u32);
            }
            _ => {}
        }

        Ok(())
    }

    // --- Sleep / Wake (firmware >= 2.0, datasheet page 5) ---

    /// Puts the device to sleep. A sleeping device only reacts to wake-up.
    ///
    /// Already asleep is a no-op success. If the device was measuring it is
    /// stopped first and remembered, so a later [`Sps30::wake`] resumes
    /// measurement.
    pub fn sleep(&mut self) -> Result<(), Sps30Error> {
        self.ensure_firmware(2, 0)?;

        if self.sleeping {
            return Ok(());
        }

        if self.started {
            self.stop()?;
            self.was_started = true;
        } else {
            self.was_started = false;
        }

        self.instruct(Command::Sleep)?;
        self.sleeping = true;
        Ok(())
    }

    /// Wakes the device from sleep.
    ///
    /// The wake instruction is sent twice: the first send toggles the
    /// device's interface out of sleep and routinely fails at the bus
    /// acknowledgement level, which is ignored by design. Both sends must
    /// land within the device's 100 ms wake window. If the device was
    /// measuring before sleep, measurement is resumed afterwards.
    pub fn wake(&mut self) -> Result<(), Sps30Error> {
        self.ensure_firmware(2, 0)?;

        if !self.sleeping {
            return Ok(());
        }

        let _ = self.instruct(Command::WakeUp);
        self.interface
            .delay_ms(timing::WAKE_TOGGLE_GAP.as_millis() as u32);
        self.instruct(Command::WakeUp)?;
        self.interface
            .delay_ms(timing::WAKE_SETTLE.as_millis() as u32);

        self.sleeping = false;

        if self.was_started {
            self.start()?;
        }

        Ok(())
    }

    // --- Capability Gate ---

    /// Probes the device by reading its firmware version, caching the
    /// result for later capability checks.
    pub fn probe(&mut self) -> Result<FirmwareVersion, Sps30Error> {
        self.get_version()
    }

    /// Reads the firmware version and refreshes the capability cache.
    pub fn get_version(&mut self) -> Result<FirmwareVersion, Sps30Error> {
        let payload = self.read_payload(&Command::ReadVersion, 2, false)?;
        let version = FirmwareVersion {
            major: payload[0],
            minor: payload[1],
        };
        self.firmware = Some(version);
        Ok(version)
    }

    /// Fails with `Firmware` unless the device firmware reaches the given
    /// minimum level, probing once if the level is still unknown.
    ///
    /// Passes unconditionally when capability checking is disabled in the
    /// configuration.
    fn ensure_firmware(&mut self, min_major: u8, min_minor: u8) -> Result<(), Sps30Error> {
        if !self.config.firmware_check {
            return Ok(());
        }

        let firmware = match self.firmware {
            Some(firmware) => firmware,
            None => self.probe()?,
        };

        if firmware.supports(min_major, min_minor) {
            Ok(())
        } else {
            if self.debug >= DebugLevel::Verbose {
                log::debug!(
                    "firmware {} below required {}.{}",
                    firmware,
                    min_major,
                    min_minor
                );
            }
            Err(Sps30Error::Firmware)
        }
    }

    // --- Device Information ---

    /// Reads the product type string (always "00080000" per datasheet, the
    /// recommended product identifier).
    pub fn get_product_name(&mut self) -> Result<DeviceInfo, Sps30Error> {
        let payload = self.read_payload(&Command::ReadProductType, PRODUCT_TYPE_LEN, false)?;
        Ok(DeviceInfo::from_payload(&payload))
    }

    /// Reads the NUL-terminated serial number (max 32 characters).
    pub fn get_serial_number(&mut self) -> Result<DeviceInfo, Sps30Error> {
        let payload = self.read_payload(&Command::ReadSerialNumber, SERIAL_NUMBER_LEN, true)?;
        Ok(DeviceInfo::from_payload(&payload))
    }

    /// Reads and clears the device status register (firmware >= 2.2,
    /// datasheet page 7).
    ///
    /// Returns the decoded register when no fault flag is set; otherwise
    /// fails with `OutOfRange` after logging the decoded flags. The register
    /// is cleared after reading either way; a failure of the clear
    /// instruction itself is only logged, the status was already obtained.
    pub fn get_status(&mut self) -> Result<DeviceStatus, Sps30Error> {
        self.ensure_firmware(2, 2)?;

        let payload = self.read_payload(&Command::ReadDeviceStatusRegister, 4, false)?;
        let registers = [payload[0], payload[1], payload[2], payload[3]];
        let status = DeviceStatus::from_registers(&registers);

        if self.send_frame(&Command::ClearDeviceStatusRegister).is_err()
            && self.debug >= DebugLevel::Verbose
        {
            log::debug!("clearing status register failed");
        }

        if status.is_ok() {
            Ok(status)
        } else {
            log::warn!("device status fault: {:?}", status);
            Err(Sps30Error::OutOfRange)
        }
    }

    // --- Auto-Clean Interval ---

    /// Reads the auto-cleaning interval in seconds (factory default
    /// 604800, one week; 0 disables automatic cleaning).
    pub fn get_auto_clean_interval(&mut self) -> Result<u32, Sps30Error> {
        let payload = self.read_payload(&Command::ReadAutoCleaningInterval, 4, false)?;
        Ok(u32::from_be_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ]))
    }

    /// Persists a new auto-cleaning interval.
    ///
    /// The device activates a written interval immediately but keeps
    /// reporting the previous value on read-back until the next reset, and
    /// a device reset alone is not enough: the bus has to be released and
    /// re-acquired first (datasheet page 15 plus observed behavior). The
    /// full recovery sequence is therefore: write, close the transport,
    /// settle, reopen, reset, and restart measurement if it was running.
    pub fn set_auto_clean_interval(&mut self, seconds: u32) -> Result<(), Sps30Error> {
        self.send_frame(&Command::SetAutoCleaningInterval { seconds })?;

        let was_started = self.started;

        // Flush and release the lines before resetting the device.
        self.interface.close();
        self.interface
            .delay_ms(timing::INTERVAL_RELEASE_SETTLE.as_millis() as u32);
        self.interface.open().map_err(|_| Sps30Error::Protocol)?;

        self.reset().map_err(|_| Sps30Error::Protocol)?;

        if was_started {
            self.start().map_err(|_| Sps30Error::Protocol)?;
        }

        Ok(())
    }

    // --- Measurement ---

    /// Queries whether a new sample is available.
    pub fn data_ready(&mut self) -> Result<bool, Sps30Error> {
        let payload = self.read_payload(&Command::ReadDataReadyFlag, 2, false)?;
        Ok(payload[1] == 1)
    }

    /// Reads one full sample.
    ///
    /// Starts measurement implicitly when idle (`CmdState` if that start
    /// fails). Polls the data-ready flag a bounded number of times, then
    /// fails with `Timeout`. A full read resets the single-value cache to
    /// "nothing reported".
    pub fn get_values(&mut self) -> Result<Measurement, Sps30Error> {
        if !self.started {
            self.start().map_err(|_| Sps30Error::CmdState)?;
        }

        let mut ready = false;
        for _ in 0..timing::DATA_READY_ATTEMPTS {
            // A transport hiccup during one attempt counts as not-ready and
            // is absorbed by the bounded retry.
            if matches!(self.data_ready(), Ok(true)) {
                ready = true;
                break;
            }
            self.interface
                .delay_ms(timing::DATA_READY_POLL_INTERVAL.as_millis() as u32);
        }
        if !ready {
            return Err(Sps30Error::Timeout);
        }

        let payload = self.read_payload(&Command::ReadMeasuredValues, MEASUREMENT_LEN, false)?;
        let values = Measurement::from_payload(&payload)?;

        self.values = values;
        self.reported = [false; REPORTED_SLOTS];
        Ok(values)
    }

    /// Returns a single measurement field through the demand-driven cache.
    ///
    /// A field is dispensed at most once per underlying sample: asking for
    /// an already-reported field pulls a full fresh sample first. A burst of
    /// different single-field reads therefore stays mutually consistent.
    pub fn get_single(&mut self, field: MeasurementField) -> Result<f32, Sps30Error> {
        if self.reported[field.slot()] {
            self.get_values()?;
        }

        self.reported[field.slot()] = true;
        Ok(self.values.get(field))
    }
}
