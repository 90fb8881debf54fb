// src/common/hal_traits.rs

use super::error::TransportFault;

/// Abstraction for timer/delay operations required by the SPS30 protocol.
///
/// The engine blocks on fixed settle delays (after start/reset/interval
/// changes) and on the data-ready poll interval; it never measures time.
pub trait Sps30Timer {
    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Abstraction for the raw byte transport to the sensor.
///
/// One implementation owns exactly one bus session; the engine performs
/// strictly sequenced write-then-read pairs and never pipelines commands.
/// Addressing (the fixed 0x69 device address on I2C) is the transport's
/// concern, not the engine's.
pub trait Sps30Transport {
    /// Opens the bus and claims the lines.
    fn open(&mut self) -> Result<(), TransportFault>;

    /// Releases the bus. Closing an already-closed transport is a no-op.
    fn close(&mut self);

    /// Writes all of `bytes` as a single bus transaction.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportFault>;

    /// Reads exactly `buffer.len()` bytes as a single bus transaction.
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), TransportFault>;
}

/// Adapter making any `embedded_hal::delay::DelayNs` usable as an
/// [`Sps30Timer`] (requires the 'embedded-hal' feature).
///
/// Useful for composing a transport/timer pair out of a HAL's I2C and delay
/// peripherals without writing the timer glue by hand.
#[cfg(feature = "embedded-hal")]
pub struct HalDelay<D>(pub D);

#[cfg(feature = "embedded-hal")]
impl<D: embedded_hal::delay::DelayNs> Sps30Timer for HalDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}
