// src/device/io.rs

// Low-level write-then-read helpers, kept separate from the operation logic.

use crate::common::command::Command;
use crate::common::error::Sps30Error;
use crate::common::frame::{self, Payload, MAX_RAW_LEN};
use crate::common::hal_traits::{Sps30Timer, Sps30Transport};
use crate::common::timing;
use crate::common::types::DebugLevel;

use super::Sps30;

impl<IF> Sps30<IF>
where
    IF: Sps30Transport + Sps30Timer,
{
    /// Checks that the session may put `command` on the bus right now.
    ///
    /// Before `begin()` (and after `close()`) nothing is legal; while the
    /// device sleeps only the wake instruction is. Both failures are local
    /// and cost no bus traffic.
    pub(super) fn ensure_ready(&self, command: &Command) -> Result<(), Sps30Error> {
        if !self.opened {
            return Err(Sps30Error::CmdState);
        }
        if self.sleeping && !matches!(command, Command::WakeUp) {
            return Err(Sps30Error::CmdState);
        }
        Ok(())
    }

    /// Encodes and writes one command frame, then waits the short post-write
    /// settle the device needs before the next transaction.
    pub(super) fn send_frame(&mut self, command: &Command) -> Result<(), Sps30Error> {
        self.ensure_ready(command)?;

        let bytes = frame::encode(command);
        if self.debug >= DebugLevel::Frames {
            log::debug!("sending: {:02X?}", bytes.as_slice());
        }

        self.interface.write(&bytes).map_err(|fault| {
            if self.debug >= DebugLevel::Verbose {
                log::debug!("write failed: {}", fault);
            }
            Sps30Error::from(fault)
        })?;

        self.interface
            .delay_us(timing::POST_WRITE_SETTLE.as_micros() as u32);
        Ok(())
    }

    /// One write-then-read exchange: sets the register pointer with
    /// `command`, reads the sized raw response and decodes it.
    ///
    /// The raw read length follows from the payload length: every 2 payload
    /// bytes travel with one check byte.
    pub(super) fn read_payload(
        &mut self,
        command: &Command,
        expected_count: usize,
        nul_terminated: bool,
    ) -> Result<Payload, Sps30Error> {
        self.send_frame(command)?;

        let raw_len = (expected_count / 2 * 3).min(MAX_RAW_LEN);
        let mut raw = [0u8; MAX_RAW_LEN];
        self.interface.read(&mut raw[..raw_len]).map_err(|fault| {
            if self.debug >= DebugLevel::Verbose {
                log::debug!("read failed: {}", fault);
            }
            Sps30Error::from(fault)
        })?;

        if self.debug >= DebugLevel::Frames {
            log::debug!("received: {:02X?}", &raw[..raw_len]);
        }

        let result = frame::decode(&raw[..raw_len], expected_count, nul_terminated);
        if let Err(code) = &result {
            if self.debug >= DebugLevel::Verbose {
                log::debug!("response decode failed: {}", code.description());
            }
        }
        result
    }
}
